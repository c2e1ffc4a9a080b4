//! Fixed-size worker thread pool for Ember Engine.
//!
//! A [`TaskPool`] owns a set of long-lived worker threads that pull from one
//! shared FIFO queue.  Work is submitted as plain closures; the submitter
//! gets back a [`TaskHandle`] from which the closure's return value (or its
//! panic) can be collected later.  Nothing ever runs on the submitting
//! thread.
//!
//! # Quick start
//! ```rust,ignore
//! use ember_tasks::TaskPool;
//!
//! let pool = TaskPool::new(4)?;
//!
//! let handle = pool.spawn(|| expensive_bake());
//! // ... do other frame work ...
//! let baked = handle.wait()?;
//!
//! // barrier before the render phase
//! pool.wait_idle();
//! ```

pub mod handle;
pub mod pool;

pub use handle::{TaskError, TaskHandle};
pub use pool::{PoolError, TaskPool};
