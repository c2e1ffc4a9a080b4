//! Shared-ownership handles to cached objects.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A reference-counted handle to a resource owned jointly by the cache and
/// every live handle.
///
/// Cloning is cheap (one count bump, no data copy).  The underlying object
/// is deallocated when the cache has evicted its entry *and* the last
/// handle is gone.
pub struct ResourceHandle<T>(Arc<T>);

impl<T> ResourceHandle<T> {
    pub(crate) fn from_arc(inner: Arc<T>) -> Self {
        Self(inner)
    }

    /// `true` when both handles refer to the same underlying object.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Number of live holders, the cache's own hold included (while the
    /// entry is resident).  Associated fn so it can't shadow a method on
    /// `T`.
    pub fn holder_count(this: &Self) -> usize {
        Arc::strong_count(&this.0)
    }
}

impl<T> Clone for ResourceHandle<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Deref for ResourceHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Debug> fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResourceHandle").field(&*self.0).finish()
    }
}
