//! The loadable capability and its failure type.

use std::any::Any;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors a resource's load routine can produce.
///
/// Load failures are fatal to the request that triggered them: the cache
/// propagates them unchanged and stores nothing, so no placeholder object
/// ever masks a broken asset.  The cache itself stays usable afterwards.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed resource `{}`: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl ResourceError {
    /// Convenience for the common read-failed case.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Something the cache can construct from a path.
///
/// `load` is the whole contract: open/decode whatever lives at `path` and
/// return the ready object.  Implementations are plain constructors — the
/// cache layers sharing and eviction on top, so `load` runs exactly once
/// per resident `(path, concrete type)` pair.
pub trait Resource: Any + Send + Sync + Sized {
    fn load(path: &Path) -> Result<Self, ResourceError>;
}
