//! The engine context: one pool, one cache, one clock.
//!
//! Everything that used to be a process-wide global in older engine
//! designs lives here as an owned field.  Construct one `EngineContext`
//! at startup, pass it by reference to whoever needs it, and you can spin
//! up as many isolated contexts as you like in tests.

use anyhow::Context as _;
use ember_resources::ResourceCache;
use ember_tasks::TaskPool;
use log::info;

use crate::config::EngineConfig;
use crate::time::{FrameClock, FrameTime};

/// Owns the engine's shared services for one application (or one test).
///
/// The per-frame driver contract, in order:
/// 1. [`begin_frame`](Self::begin_frame);
/// 2. `update(&ctx.tasks)` on every system;
/// 3. [`frame_barrier`](Self::frame_barrier) — all update chunks must be
///    confirmed complete before any render call;
/// 4. `render()` on every system;
/// 5. every so often, `ctx.resources.unload_unused()`.
pub struct EngineContext {
    pub tasks: TaskPool,
    pub resources: ResourceCache,
    clock: FrameClock,
    config: EngineConfig,
}

impl EngineContext {
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        let workers = config.effective_workers();
        let tasks = TaskPool::new(workers).context("bringing up the worker pool")?;
        info!("engine context up with {workers} worker(s)");
        Ok(Self {
            tasks,
            resources: ResourceCache::new(),
            clock: FrameClock::new(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Advance the frame clock.  Call once at the top of each frame.
    pub fn begin_frame(&mut self) -> FrameTime {
        self.clock.tick()
    }

    /// The update→render phase barrier: returns once every dispatched
    /// update chunk (and any other queued task) has fully completed.
    pub fn frame_barrier(&self) {
        self.tasks.wait_idle();
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────
