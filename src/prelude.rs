pub use crate::config::{WorkerConfig, WorkerConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{task, AsyncWorker, BackgroundWorker, PanicStrategy, Runnable, TaskHandle};
pub use crate::util::{Gate, WaitResult};
