//! The cache itself: lookup, construction, and the eviction sweep.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, trace};

use crate::handle::ResourceHandle;
use crate::resource::{Resource, ResourceError};

struct CacheEntry {
    path: PathBuf,
    object: Arc<dyn Any + Send + Sync>,
}

/// Path-keyed store of shared resources plus a secondary registry of
/// managed objects tracked for lifetime only.
///
/// Uniqueness is `(path, concrete type)`: two different resource types
/// loaded from one path coexist as two entries, and a lookup only matches
/// an entry whose stored type is the requested one.
///
/// Both sequences sit behind their own mutex, so `load` /
/// `create_managed` / `unload_unused` may be called from any thread.  The
/// entry lock is held across a miss's load routine; concurrent loaders of
/// the same path therefore serialize instead of constructing duplicates.
pub struct ResourceCache {
    entries: Mutex<Vec<CacheEntry>>,
    managed: Mutex<Vec<Arc<dyn Any + Send + Sync>>>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            managed: Mutex::new(Vec::new()),
        }
    }

    /// Return a handle to the resource at `path`, loading it on first use.
    ///
    /// An existing entry is reused only when both the path and the
    /// concrete type match; a same-path entry of another type is skipped.
    /// On a miss the resource's load routine runs once and its failure, if
    /// any, aborts this call — nothing is cached for a failed load.
    pub fn load<T: Resource>(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<ResourceHandle<T>, ResourceError> {
        let path = path.as_ref();
        let mut entries = self.entries.lock().unwrap();

        for entry in entries.iter() {
            if entry.path == path {
                if let Ok(shared) = Arc::clone(&entry.object).downcast::<T>() {
                    trace!("resource cache hit: {}", path.display());
                    return Ok(ResourceHandle::from_arc(shared));
                }
                // same path under a different concrete type; keep scanning
            }
        }

        debug!("loading resource: {}", path.display());
        let shared = Arc::new(T::load(path)?);
        entries.push(CacheEntry {
            path: path.to_path_buf(),
            object: shared.clone(),
        });
        Ok(ResourceHandle::from_arc(shared))
    }

    /// Construct a fresh managed object and register it for lifetime
    /// tracking.  Never deduplicates — every call yields a new instance.
    pub fn create_managed<U>(&self) -> ResourceHandle<U>
    where
        U: Default + Send + Sync + 'static,
    {
        let object = Arc::new(U::default());
        self.managed
            .lock()
            .unwrap()
            .push(object.clone() as Arc<dyn Any + Send + Sync>);
        ResourceHandle::from_arc(object)
    }

    /// Evict every entry the cache is the sole holder of.  Returns how
    /// many objects were reclaimed.
    ///
    /// Each slot is visited exactly once per sweep; removing an entry
    /// never causes its successor to be skipped.  The managed registry is
    /// swept under the same rule.
    pub fn unload_unused(&self) -> usize {
        let mut removed = 0;

        self.entries.lock().unwrap().retain(|entry| {
            let keep = Arc::strong_count(&entry.object) > 1;
            if !keep {
                trace!("evicting resource: {}", entry.path.display());
                removed += 1;
            }
            keep
        });

        self.managed.lock().unwrap().retain(|object| {
            let keep = Arc::strong_count(object) > 1;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            debug!("resource sweep reclaimed {removed} object(s)");
        }
        removed
    }

    /// Number of path-keyed entries currently resident.
    pub fn resident(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Number of managed objects currently registered.
    pub fn managed_count(&self) -> usize {
        self.managed.lock().unwrap().len()
    }
}

impl Default for ResourceCache {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
