//! Runnable capability and queued task representation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A unit of work with a single entry point.
///
/// The worker calls [`run`](Runnable::run) exactly once per dequeue, on its own
/// thread. What happens inside, including failure handling, is up to the
/// implementor.
pub trait Runnable: Send + Sync {
    /// Execute the work.
    fn run(&self);
}

impl<F> Runnable for F
where
    F: Fn() + Send + Sync + 'static,
{
    fn run(&self) {
        self()
    }
}

/// Shared handle to a runnable. The queue keeps it alive until it runs or is cleared.
pub type TaskHandle = Arc<dyn Runnable>;

/// Wrap a closure into a [`TaskHandle`].
pub fn task<F>(f: F) -> TaskHandle
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Unique identifier for a queued task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Queue entry
pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) handle: TaskHandle,
    pub(crate) enqueued_at: Instant,
}

impl Task {
    pub fn new(handle: TaskHandle) -> Self {
        Task {
            id: TaskId::next(),
            handle,
            enqueued_at: Instant::now(),
        }
    }

    pub fn execute(&self) {
        self.handle.run();
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("enqueued_at", &self.enqueued_at)
            .finish()
    }
}
