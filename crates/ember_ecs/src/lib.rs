//! Data-oriented component scheduler for Ember Engine.
//!
//! Each component type gets its own [`System`]: a dense sequence of
//! per-entity records plus the knobs that decide how the per-frame phases
//! run over it (inline or chunked across the worker pool, update and/or
//! render).  There is no base-system trait object and no registry — the
//! application owns one concrete `System<C>` per component type and calls
//! the phases itself, in the order it wants.
//!
//! # Quick start
//! ```rust,ignore
//! use ember_ecs::{Component, EntityId, System, SystemUsage};
//! use ember_tasks::TaskPool;
//!
//! struct Velocity { dx: f32, dy: f32 }
//!
//! impl Component for Velocity {
//!     fn on_update(&mut self) { /* integrate */ }
//! }
//!
//! let pool = TaskPool::new(4)?;
//! let mut velocities = System::<Velocity>::new(SystemUsage::Update)
//!     .with_threading(true);
//!
//! velocities.attach(EntityId(1), Velocity { dx: 1.0, dy: 0.0 });
//!
//! // frame driver: update every system, barrier, then render
//! velocities.update(&pool);
//! pool.wait_idle();
//! ```

pub mod component;
pub mod entity;
pub mod system;

pub use component::Component;
pub use entity::EntityId;
pub use system::{ComponentEntry, System, SystemUsage, DEFAULT_CHUNK_SIZE};
