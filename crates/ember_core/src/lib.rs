//! Ember Engine's core context crate.
//!
//! Ties the worker pool, component scheduler and resource cache together
//! behind one explicit [`EngineContext`], with config loading, logging
//! setup and frame timing on the side.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use ember_core::{EngineConfig, EngineContext, System, SystemUsage};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::from_path("engine.toml")?;
//!     ember_core::logging::init_logging(
//!         ember_core::logging::level_from_str(&config.log_level),
//!     )?;
//!     let mut ctx = EngineContext::new(config)?;
//!
//!     let mut movers = System::<Mover>::new(SystemUsage::Both)
//!         .with_threading(true);
//!
//!     loop {
//!         let time = ctx.begin_frame();
//!         movers.update(&ctx.tasks);
//!         ctx.frame_barrier();
//!         movers.render();
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod logging;
pub mod time;

pub use config::EngineConfig;
pub use context::EngineContext;
pub use time::{FrameClock, FrameTime};

// ── Re-export the most-used Ember primitives ───────────────────────────────
// Applications can `use ember_core::{System, TaskPool, ResourceCache};`
// without depending on the sibling crates directly.
pub use ember_ecs::{Component, ComponentEntry, EntityId, System, SystemUsage, DEFAULT_CHUNK_SIZE};
pub use ember_resources::{Resource, ResourceCache, ResourceError, ResourceHandle};
pub use ember_tasks::{PoolError, TaskError, TaskHandle, TaskPool};
