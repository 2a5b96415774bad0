//! Task execution infrastructure.
//!
//! This module provides the runnable capability, the background worker that
//! drains a bounded queue of runnables, and the fault barrier around each task.

pub mod panic_handler;
pub mod stats;
pub mod task;
pub mod worker;

pub use panic_handler::{PanicHandler, PanicStrategy, TaskPanic};
pub use stats::{StatsSnapshot, WorkerStats};
pub use task::{task, Runnable, TaskHandle, TaskId};
pub use worker::BackgroundWorker;

use crate::error::Result;
use std::time::Duration;

/// Capability exposed to code that offloads work onto a background worker.
pub trait AsyncWorker: Send + Sync {
    /// Queue a runnable. `false` means it was rejected.
    fn submit(&self, runnable: TaskHandle) -> bool;

    /// Drop every queued runnable that has not started yet.
    fn clear_tasks(&self);

    /// Start consuming the queue. A no-op when already running.
    fn start(&self) -> Result<()>;

    /// Stop consuming after the current task. Does not block.
    fn stop(&self);

    /// Wait for the worker to report exit; `true` if it is no longer running.
    fn wait_to_exit(&self) -> bool;

    /// Bounded form of [`wait_to_exit`](AsyncWorker::wait_to_exit).
    fn wait_to_exit_timeout(&self, timeout: Duration) -> bool;

    /// Whether the consumption loop is running.
    fn is_busy(&self) -> bool;

    /// Maximum number of queued runnables.
    fn queue_capacity(&self) -> usize;

    /// Runnables queued and not yet started.
    fn queue_depth(&self) -> usize;
}
