//! Fault barrier around task execution.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// What to do after a task panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// Abort the whole process.
    Abort,
    /// Swallow the panic silently; the worker moves on to the next task.
    Isolate,
    /// Log the panic and move on to the next task.
    #[default]
    LogAndContinue,
}

/// Runs closures under `catch_unwind` and applies a [`PanicStrategy`].
#[derive(Debug)]
pub struct PanicHandler {
    worker: String,
    strategy: PanicStrategy,
}

impl PanicHandler {
    pub fn new(worker: impl Into<String>, strategy: PanicStrategy) -> Self {
        Self {
            worker: worker.into(),
            strategy,
        }
    }

    pub fn execute<F, R>(&self, f: F) -> Result<R, TaskPanic>
    where
        F: FnOnce() -> R,
    {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => Ok(result),
            Err(payload) => {
                let panic = TaskPanic::from_payload(payload.as_ref());

                match self.strategy {
                    PanicStrategy::Abort => {
                        tracing::error!(
                            worker = %self.worker,
                            message = %panic.message,
                            "task panicked, aborting process"
                        );
                        std::process::abort();
                    }
                    PanicStrategy::Isolate => {}
                    PanicStrategy::LogAndContinue => {
                        tracing::error!(
                            worker = %self.worker,
                            message = %panic.message,
                            "task panicked"
                        );
                    }
                }

                Err(panic)
            }
        }
    }

    pub fn strategy(&self) -> PanicStrategy {
        self.strategy
    }
}

/// Message recovered from a panic payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPanic {
    pub message: String,
}

impl TaskPanic {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        Self { message }
    }
}
