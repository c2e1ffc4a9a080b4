/// Per-component behavior, hooked into the scheduler's phases.
///
/// All hooks default to no-ops, so a plain data component only implements
/// the ones it cares about.  `Send` is required because a threaded
/// [`System`](crate::System) hands disjoint slices of its records to
/// worker threads.
///
/// Hooks receive `&mut self` and nothing else: a hook cannot reach the
/// sequence it lives in, so it cannot resize it mid-dispatch.
pub trait Component: Send + 'static {
    /// Called once per record during the update phase.
    fn on_update(&mut self) {}

    /// Called once per record during the render phase (always on the
    /// thread driving the frame).
    fn on_render(&mut self) {}

    /// Called once when the record is removed, cleared, or the system is
    /// torn down.
    fn on_remove(&mut self) {}
}
