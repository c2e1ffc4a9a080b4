//! The worker pool itself.
//!
//! One mutex-guarded FIFO queue, one condition variable to wake workers,
//! and one more to signal submitters waiting on a barrier.  Tasks are
//! dequeued in submission order; completion order across workers is not
//! guaranteed.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use log::{debug, trace, warn};
use thiserror::Error;

use crate::handle::{TaskError, TaskHandle};

/// Errors raised while constructing a [`TaskPool`].
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool with no workers can never run anything; reject it up front.
    #[error("task pool needs at least one worker")]
    NoWorkers,
    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),
}

type Job = Box<dyn FnOnce() + Send + 'static>;

struct QueueState {
    queue: VecDeque<Job>,
    /// Number of jobs currently executing on a worker.
    active: usize,
    stop: bool,
}

struct PoolShared {
    state: Mutex<QueueState>,
    /// Wakes workers when a job is pushed (or on shutdown).
    task_ready: Condvar,
    /// Wakes barrier waiters when the queue empties or the last active job
    /// finishes.
    quiescent: Condvar,
}

struct Worker {
    /// Informational only — never consulted for scheduling.
    busy: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

/// A fixed set of long-lived worker threads over one shared FIFO queue.
///
/// Dropping the pool drains the queue gracefully: workers finish every job
/// that was submitted before the drop, then exit and are joined.
pub struct TaskPool {
    shared: Arc<PoolShared>,
    workers: Vec<Worker>,
}

impl TaskPool {
    /// Spawn `worker_count` threads.  Zero workers is a configuration
    /// error.
    pub fn new(worker_count: usize) -> Result<Self, PoolError> {
        if worker_count == 0 {
            return Err(PoolError::NoWorkers);
        }

        let shared = Arc::new(PoolShared {
            state: Mutex::new(QueueState {
                queue: VecDeque::new(),
                active: 0,
                stop: false,
            }),
            task_ready: Condvar::new(),
            quiescent: Condvar::new(),
        });

        let workers = (0..worker_count)
            .map(|index| {
                let busy = Arc::new(AtomicBool::new(false));
                let thread = thread::Builder::new()
                    .name(format!("ember-worker-{index}"))
                    .spawn({
                        let shared = Arc::clone(&shared);
                        let busy = Arc::clone(&busy);
                        move || worker_loop(&shared, &busy, index)
                    })?;
                Ok(Worker {
                    busy,
                    thread: Some(thread),
                })
            })
            .collect::<Result<Vec<_>, PoolError>>()?;

        debug!("task pool up with {worker_count} worker(s)");
        Ok(Self { shared, workers })
    }

    /// Submit a closure.  It will run on some worker thread, never
    /// synchronously on the caller's.  The returned [`TaskHandle`] yields
    /// the closure's return value, or [`TaskError::Panicked`] if it
    /// panicked.
    pub fn spawn<F, R>(&self, task: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task))
                .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())));
            if tx.send(outcome).is_err() {
                // handle was dropped; the result (and any failure) is lost
                trace!("task finished with nobody waiting on its result");
            }
        });

        {
            let mut state = self.shared.state.lock().unwrap();
            state.queue.push_back(job);
        }
        self.shared.task_ready.notify_one();
        TaskHandle::new(rx)
    }

    /// Block until the queue observably has no pending entries.
    ///
    /// This is a convenience barrier only: jobs already dequeued may still
    /// be executing when it returns.  Use [`wait_idle`](Self::wait_idle)
    /// when the work itself must be finished.
    pub fn wait_until_empty(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !state.queue.is_empty() {
            state = self.shared.quiescent.wait(state).unwrap();
        }
    }

    /// Block until the queue is empty **and** every worker is idle.
    ///
    /// This is the phase barrier to place between a frame's update
    /// dispatches and its render pass.
    pub fn wait_idle(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while !(state.queue.is_empty() && state.active == 0) {
            state = self.shared.quiescent.wait(state).unwrap();
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers currently executing a job.  Informational; the
    /// value can be stale by the time the caller looks at it.
    pub fn busy_workers(&self) -> usize {
        self.workers
            .iter()
            .filter(|w| w.busy.load(Ordering::Relaxed))
            .count()
    }

    /// Number of jobs waiting in the queue (not counting ones already
    /// executing).
    pub fn pending(&self) -> usize {
        self.shared.state.lock().unwrap().queue.len()
    }

    /// Stop accepting wake-ups, drain the queue, and join every worker.
    ///
    /// Jobs already in the queue still run to completion; submitting new
    /// work concurrently with shutdown is a caller bug and the fate of
    /// such jobs is unspecified.  Called automatically on drop.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.stop {
                return;
            }
            state.stop = true;
        }
        self.shared.task_ready.notify_all();

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    // jobs run under catch_unwind, so this is unexpected
                    warn!("a worker thread terminated abnormally");
                }
            }
        }
        debug!("task pool stopped");
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &PoolShared, busy: &AtomicBool, index: usize) {
    trace!("worker {index} ready");
    loop {
        let job = {
            let mut state = shared.state.lock().unwrap();
            loop {
                if let Some(job) = state.queue.pop_front() {
                    state.active += 1;
                    if state.queue.is_empty() {
                        shared.quiescent.notify_all();
                    }
                    break job;
                }
                // drain first: stop only matters once the queue is empty
                if state.stop {
                    trace!("worker {index} exiting");
                    return;
                }
                state = shared.task_ready.wait(state).unwrap();
            }
        };

        busy.store(true, Ordering::Relaxed);
        job();
        busy.store(false, Ordering::Relaxed);

        let mut state = shared.state.lock().unwrap();
        state.active -= 1;
        if state.active == 0 && state.queue.is_empty() {
            shared.quiescent.notify_all();
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[test]
    fn zero_workers_is_a_config_error() {
        assert!(matches!(TaskPool::new(0), Err(PoolError::NoWorkers)));
    }

    #[test]
    fn every_task_runs_exactly_once() {
        let pool = TaskPool::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..64usize)
            .map(|i| {
                let counter = Arc::clone(&counter);
                pool.spawn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    i * 2
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.wait().unwrap(), i * 2);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 64);
    }

    #[test]
    fn single_worker_runs_in_submission_order() {
        let pool = TaskPool::new(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let order = Arc::clone(&order);
                pool.spawn(move || order.lock().unwrap().push(i))
            })
            .collect();
        for handle in handles {
            handle.wait().unwrap();
        }

        assert_eq!(*order.lock().unwrap(), (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn later_task_can_finish_first() {
        let pool = TaskPool::new(2).unwrap();

        let slow = pool.spawn(|| {
            thread::sleep(Duration::from_millis(200));
            "slow"
        });
        let fast = pool.spawn(|| "fast");

        // the instant task completes while the slow one is still sleeping
        assert_eq!(fast.wait().unwrap(), "fast");
        assert!(slow.try_wait().is_none());
        assert_eq!(slow.wait().unwrap(), "slow");
    }

    #[test]
    fn panic_is_captured_and_pool_survives() {
        let pool = TaskPool::new(2).unwrap();

        let doomed = pool.spawn(|| panic!("boom"));
        match doomed.wait() {
            Err(TaskError::Panicked(msg)) => assert!(msg.contains("boom")),
            other => panic!("expected a captured panic, got {other:?}"),
        }

        // no poisoning of the shared queue
        assert_eq!(pool.spawn(|| 7).wait().unwrap(), 7);
    }

    #[test]
    fn shutdown_drains_the_queue() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut pool = TaskPool::new(1).unwrap();

        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            pool.spawn(move || {
                thread::sleep(Duration::from_millis(5));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn wait_idle_is_a_completion_barrier() {
        let pool = TaskPool::new(3).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..12 {
            let counter = Arc::clone(&counter);
            pool.spawn(move || {
                thread::sleep(Duration::from_millis(3));
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        pool.wait_idle();

        assert_eq!(counter.load(Ordering::SeqCst), 12);
        assert_eq!(pool.pending(), 0);
        assert_eq!(pool.busy_workers(), 0);
    }

    #[test]
    fn wait_until_empty_only_watches_the_queue() {
        let pool = TaskPool::new(2).unwrap();
        for _ in 0..6 {
            pool.spawn(|| thread::sleep(Duration::from_millis(2)));
        }
        pool.wait_until_empty();
        // tasks may still be executing, but nothing is queued
        assert_eq!(pool.pending(), 0);
    }
}
