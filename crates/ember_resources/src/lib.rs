//! Path-keyed resource cache with reference-counted eviction.
//!
//! Loaded resources are shared: asking the cache for the same `(path,
//! type)` twice hands out two handles to one underlying object.  The cache
//! itself always counts as one holder, so an entry becomes evictable
//! exactly when every external handle is gone — and eviction only happens
//! during an explicit [`ResourceCache::unload_unused`] sweep, never behind
//! the caller's back.
//!
//! # Quick start
//! ```rust,ignore
//! use ember_resources::{Resource, ResourceCache, ResourceError};
//! use std::path::Path;
//!
//! struct Mesh { /* ... */ }
//!
//! impl Resource for Mesh {
//!     fn load(path: &Path) -> Result<Self, ResourceError> {
//!         // decode the file; failures abort the load() call below
//!         # todo!()
//!     }
//! }
//!
//! let cache = ResourceCache::new();
//! let a = cache.load::<Mesh>("assets/rock.mesh")?;
//! let b = cache.load::<Mesh>("assets/rock.mesh")?; // same object as `a`
//!
//! drop((a, b));
//! cache.unload_unused(); // now it is reclaimed
//! ```

pub mod cache;
pub mod handle;
pub mod resource;

pub use cache::ResourceCache;
pub use handle::ResourceHandle;
pub use resource::{Resource, ResourceError};
