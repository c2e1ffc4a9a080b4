//! Asynchronous task results.

use std::sync::mpsc;

use thiserror::Error;

/// Why a task produced no value.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The task panicked on its worker thread.  The payload message is
    /// preserved; the panic itself never crosses back to the submitter.
    #[error("task panicked: {0}")]
    Panicked(String),
    /// The pool was torn down before the task could report back.
    #[error("task result was lost")]
    Lost,
}

/// Receiving end of one submitted task.
///
/// A `TaskHandle` delivers the task's outcome exactly once: either via
/// [`wait`](TaskHandle::wait), which consumes the handle, or via a
/// successful [`try_wait`](TaskHandle::try_wait).  Dropping the handle
/// without collecting it silently discards the result — including a
/// captured panic.  That is a deliberate fire-and-forget mode, but it means
/// failures in uncollected tasks go unnoticed; collect the handle anywhere
/// the outcome matters.
pub struct TaskHandle<R> {
    rx: mpsc::Receiver<Result<R, TaskError>>,
}

impl<R> TaskHandle<R> {
    pub(crate) fn new(rx: mpsc::Receiver<Result<R, TaskError>>) -> Self {
        Self { rx }
    }

    /// Block until the task has finished and return its result.
    pub fn wait(self) -> Result<R, TaskError> {
        self.rx.recv().unwrap_or(Err(TaskError::Lost))
    }

    /// Non-blocking poll.  `None` while the task is still queued or
    /// running; `Some` once the outcome is available.  The outcome is
    /// delivered at most once — after a `Some`, further polls report
    /// [`TaskError::Lost`].
    pub fn try_wait(&self) -> Option<Result<R, TaskError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(TaskError::Lost)),
        }
    }
}
