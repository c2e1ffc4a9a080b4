//! The per-component-type scheduler.
//!
//! A [`System`] owns its records in one dense `Vec` and splits the update
//! phase into contiguous chunks dispatched to the worker pool.  Chunks
//! never overlap, and every method that touches the sequence first waits
//! for in-flight chunks to finish, so a caller that mutates "too early"
//! blocks instead of racing.

use std::sync::{Arc, Condvar, Mutex};

use ember_tasks::TaskPool;
use log::trace;

use crate::component::Component;
use crate::entity::EntityId;

/// How many records one dispatched chunk covers.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Which per-frame phases a system participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemUsage {
    Update,
    Render,
    Both,
}

impl SystemUsage {
    fn has_update(self) -> bool {
        matches!(self, SystemUsage::Update | SystemUsage::Both)
    }

    fn has_render(self) -> bool {
        matches!(self, SystemUsage::Render | SystemUsage::Both)
    }
}

/// One entity's record for this component type.
pub struct ComponentEntry<C> {
    pub entity: EntityId,
    pub data: C,
}

// ─── Outstanding-chunk tracking ────────────────────────────────────────────

/// Counts chunk tasks still in flight for one system.
///
/// `update` raises the count before dispatch; each chunk task lowers it
/// when it finishes (panicking hooks included, via [`ChunkGuard`]).
/// Everything else in the system waits on it before touching the records.
#[derive(Default)]
struct ChunkTracker {
    outstanding: Mutex<usize>,
    done: Condvar,
}

impl ChunkTracker {
    fn add(&self, n: usize) {
        *self.outstanding.lock().unwrap() += n;
    }

    fn finish_one(&self) {
        let mut outstanding = self.outstanding.lock().unwrap();
        *outstanding -= 1;
        if *outstanding == 0 {
            self.done.notify_all();
        }
    }

    fn wait(&self) {
        let mut outstanding = self.outstanding.lock().unwrap();
        while *outstanding != 0 {
            outstanding = self.done.wait(outstanding).unwrap();
        }
    }
}

/// Lowers the tracker on drop, so a panic inside a hook still releases
/// waiters instead of deadlocking the next phase.
struct ChunkGuard(Arc<ChunkTracker>);

impl Drop for ChunkGuard {
    fn drop(&mut self) {
        self.0.finish_one();
    }
}

/// A raw view over one contiguous chunk of a system's records.
///
/// ## Safety
/// A `ChunkSlice` is only ever built inside [`System::update`], which
/// guarantees:
/// * the pointer and length cover records inside the system's live `Vec`,
/// * no two slices dispatched together overlap,
/// * the `Vec` is neither resized nor dropped while any slice is alive —
///   every other system method (and `Drop`) waits on the chunk tracker
///   first.
struct ChunkSlice<C> {
    ptr: *mut ComponentEntry<C>,
    len: usize,
}

// SAFETY: the slice is handed to exactly one worker, covers records
// disjoint from every other in-flight slice, and `C: Send`.
unsafe impl<C: Send> Send for ChunkSlice<C> {}

// ─── System ────────────────────────────────────────────────────────────────

/// Scheduler for one component type.
///
/// Compose concrete `System<C>` values in application code and drive them
/// explicitly each frame: `update` for every system, one pool barrier,
/// then `render` for every system.
pub struct System<C: Component> {
    entries: Vec<ComponentEntry<C>>,
    usage: SystemUsage,
    threaded: bool,
    chunk_size: usize,
    chunks: Arc<ChunkTracker>,
}

impl<C: Component> System<C> {
    pub fn new(usage: SystemUsage) -> Self {
        Self {
            entries: Vec::new(),
            usage,
            threaded: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunks: Arc::new(ChunkTracker::default()),
        }
    }

    /// Enable or disable chunked dispatch of the update phase.
    pub fn with_threading(mut self, threaded: bool) -> Self {
        self.threaded = threaded;
        self
    }

    /// Records per dispatched chunk.  Values below 1 are clamped to 1.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn usage(&self) -> SystemUsage {
        self.usage
    }

    pub fn is_threaded(&self) -> bool {
        self.threaded
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Wait for any in-flight update chunks before touching the records.
    fn sync(&self) {
        self.chunks.wait();
    }

    // ── Record management ──────────────────────────────────────────────────

    /// Append a record for `entity`.
    ///
    /// Nothing stops the same entity from holding several records of one
    /// component type; [`remove`](Self::remove) then takes the first match
    /// in sequence order.
    pub fn attach(&mut self, entity: EntityId, data: C) {
        self.sync();
        self.entries.push(ComponentEntry { entity, data });
    }

    /// Remove the first record whose entity matches, running its teardown
    /// hook first.  Returns `false` (not an error) when no record matches.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        self.sync();
        match self.entries.iter().position(|e| e.entity == entity) {
            Some(index) => {
                self.entries[index].data.on_remove();
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Run the teardown hook on every record, in sequence order, then drop
    /// them all.
    pub fn clear(&mut self) {
        self.sync();
        for entry in &mut self.entries {
            entry.data.on_remove();
        }
        self.entries.clear();
    }

    // ── Phases ─────────────────────────────────────────────────────────────

    /// Run the update phase.  Returns the number of chunk tasks submitted
    /// (0 when the phase ran inline or was skipped by the usage mode).
    ///
    /// With threading enabled the call only *dispatches*: it captures the
    /// current length, submits `ceil(len / chunk_size)` tasks covering
    /// disjoint index ranges, and returns without waiting.  Place a pool
    /// barrier (`TaskPool::wait_idle`) before anything that reads the
    /// updated records — including this system's own render phase.
    pub fn update(&mut self, pool: &TaskPool) -> usize {
        if !self.usage.has_update() {
            return 0;
        }
        self.sync();

        if !self.threaded || self.entries.is_empty() {
            for entry in &mut self.entries {
                entry.data.on_update();
            }
            return 0;
        }

        let len = self.entries.len();
        let chunk_count = len.div_ceil(self.chunk_size);
        self.chunks.add(chunk_count);

        let base = self.entries.as_mut_ptr();
        for chunk in 0..chunk_count {
            let start = chunk * self.chunk_size;
            let chunk_len = self.chunk_size.min(len - start);
            let slice = ChunkSlice {
                // SAFETY: start < len, so the offset stays inside the
                // allocation.
                ptr: unsafe { base.add(start) },
                len: chunk_len,
            };
            let guard = ChunkGuard(Arc::clone(&self.chunks));
            // fire-and-forget: the chunk tracker is the completion signal,
            // so the task handle itself is dropped
            pool.spawn(move || {
                let _guard = guard;
                // Capture the whole `ChunkSlice` (not just its fields) so the
                // closure's `Send`-ness comes from `ChunkSlice: Send`.
                let slice = slice;
                // SAFETY: see `ChunkSlice` — disjoint range, kept alive by
                // the chunk tracker, sole &mut access.
                let entries = unsafe { std::slice::from_raw_parts_mut(slice.ptr, slice.len) };
                for entry in entries {
                    entry.data.on_update();
                }
            });
        }

        trace!(
            "dispatched {chunk_count} update chunk(s) over {len} record(s) \
             (chunk size {})",
            self.chunk_size
        );
        chunk_count
    }

    /// Run the render phase inline.  Never dispatched to the pool —
    /// rendering is assumed to need one exclusive execution context.
    pub fn render(&mut self) {
        if !self.usage.has_render() {
            return;
        }
        self.sync();
        for entry in &mut self.entries {
            entry.data.on_render();
        }
    }

    // ── Access ─────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.sync();
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.sync();
        self.entries.iter().any(|e| e.entity == entity)
    }

    /// First record for `entity`, if any.
    pub fn get(&self, entity: EntityId) -> Option<&C> {
        self.sync();
        self.entries
            .iter()
            .find(|e| e.entity == entity)
            .map(|e| &e.data)
    }

    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut C> {
        self.sync();
        self.entries
            .iter_mut()
            .find(|e| e.entity == entity)
            .map(|e| &mut e.data)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentEntry<C>> {
        self.sync();
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ComponentEntry<C>> {
        self.sync();
        self.entries.iter_mut()
    }
}

impl<C: Component> Drop for System<C> {
    fn drop(&mut self) {
        // teardown counts as destruction, so the hooks run here too
        self.sync();
        for entry in &mut self.entries {
            entry.data.on_remove();
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        updates: Arc<AtomicUsize>,
        renders: Arc<AtomicUsize>,
    }

    impl Counter {
        fn new(updates: &Arc<AtomicUsize>, renders: &Arc<AtomicUsize>) -> Self {
            Self {
                updates: Arc::clone(updates),
                renders: Arc::clone(renders),
            }
        }
    }

    impl Component for Counter {
        fn on_update(&mut self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }

        fn on_render(&mut self) {
            self.renders.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Component that logs its label on teardown.
    struct Named {
        label: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Component for Named {
        fn on_remove(&mut self) {
            self.log.lock().unwrap().push(self.label);
        }
    }

    fn counter_system(
        usage: SystemUsage,
        n: u64,
    ) -> (System<Counter>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let updates = Arc::new(AtomicUsize::new(0));
        let renders = Arc::new(AtomicUsize::new(0));
        let mut system = System::new(usage);
        for id in 0..n {
            system.attach(EntityId(id), Counter::new(&updates, &renders));
        }
        (system, updates, renders)
    }

    #[test]
    fn inline_update_visits_every_record() {
        let pool = TaskPool::new(2).unwrap();
        let (mut system, updates, _) = counter_system(SystemUsage::Update, 100);

        assert_eq!(system.update(&pool), 0);
        assert_eq!(updates.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn threaded_update_dispatches_ceil_len_over_chunk() {
        let pool = TaskPool::new(4).unwrap();
        let (mut system, updates, _) = counter_system(SystemUsage::Update, 2500);
        system = system.with_threading(true).with_chunk_size(1024);

        // 2500 records, chunk 1024 -> [0,1024), [1024,2048), [2048,2500)
        assert_eq!(system.update(&pool), 3);
        pool.wait_idle();

        assert_eq!(updates.load(Ordering::SeqCst), 2500);
    }

    #[test]
    fn mutation_after_dispatch_waits_for_chunks() {
        let pool = TaskPool::new(2).unwrap();
        let (mut system, updates, _) = counter_system(SystemUsage::Update, 2000);
        system = system.with_threading(true).with_chunk_size(256);

        let dispatched = system.update(&pool);
        assert_eq!(dispatched, 8);

        // no explicit pool barrier: attach blocks on the chunk tracker, so
        // by the time it returns every record was updated exactly once
        let (u, r) = (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)));
        system.attach(EntityId(9999), Counter::new(&u, &r));
        assert_eq!(updates.load(Ordering::SeqCst), 2000);
        assert_eq!(system.len(), 2001);
    }

    #[test]
    fn usage_mode_gates_the_phases() {
        let pool = TaskPool::new(1).unwrap();
        let (mut system, updates, renders) = counter_system(SystemUsage::Render, 10);

        system.update(&pool);
        assert_eq!(updates.load(Ordering::SeqCst), 0);

        system.render();
        assert_eq!(renders.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn render_only_runs_inline() {
        let (mut system, _, renders) = counter_system(SystemUsage::Both, 50);
        system.render();
        assert_eq!(renders.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn remove_takes_the_first_match_only() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut system = System::new(SystemUsage::Update);
        system.attach(
            EntityId(1),
            Named {
                label: "first",
                log: Arc::clone(&log),
            },
        );
        system.attach(
            EntityId(1),
            Named {
                label: "second",
                log: Arc::clone(&log),
            },
        );

        assert!(system.remove(EntityId(1)));
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
        assert_eq!(system.len(), 1);

        // absent entity is a no-op, not an error
        assert!(!system.remove(EntityId(42)));
        drop(system);
    }

    #[test]
    fn clear_runs_teardown_in_sequence_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut system = System::new(SystemUsage::Both);
        for label in ["a", "b", "c"] {
            system.attach(
                EntityId(label.len() as u64),
                Named {
                    label,
                    log: Arc::clone(&log),
                },
            );
        }

        system.clear();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
        assert!(system.is_empty());

        // already-empty clear is a no-op
        system.clear();
        assert_eq!(log.lock().unwrap().len(), 3);
    }

    #[test]
    fn drop_tears_down_remaining_records() {
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let mut system = System::new(SystemUsage::Update);
            system.attach(
                EntityId(7),
                Named {
                    label: "survivor",
                    log: Arc::clone(&log),
                },
            );
        }
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[test]
    fn threaded_update_of_empty_system_is_inline() {
        let pool = TaskPool::new(1).unwrap();
        let mut system: System<Counter> =
            System::new(SystemUsage::Update).with_threading(true);
        assert_eq!(system.update(&pool), 0);
    }
}
