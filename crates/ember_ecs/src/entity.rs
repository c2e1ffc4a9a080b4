/// Opaque identifier tying a component record to an entity.
///
/// Allocation of IDs is the application's business (or that of whatever
/// scene layer sits above); the scheduler only ever compares them for
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u64);
