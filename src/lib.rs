//! bgworker - a single background worker thread
//!
//! Offload work from the calling thread without a full thread pool: tasks go
//! into a bounded FIFO queue and one dedicated thread runs them in order.
//!
//! # Quick Start
//!
//! ```
//! use bgworker::prelude::*;
//! use std::time::Duration;
//!
//! let worker = BackgroundWorker::new("example", 100).unwrap();
//! worker.start().unwrap();
//!
//! for i in 0..10 {
//!     worker.execute(move || println!("task {}", i));
//! }
//!
//! worker.stop();
//! worker.wait_to_exit_timeout(Duration::from_millis(50));
//! ```
//!
//! # Features
//!
//! - **Bounded queue**: submissions beyond capacity are rejected, never blocked
//! - **Cooperative lifecycle**: idempotent `start`, non-blocking `stop`
//! - **Fault barrier**: a panicking task does not take the worker thread down
//! - **Gate**: the blocking signal used for wake-up and exit notification

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod util;

// Re-export key types at crate root
pub use config::{WorkerConfig, WorkerConfigBuilder, DEFAULT_NAME, DEFAULT_QUEUE_CAPACITY};
pub use error::{Error, Result};
pub use executor::{task, AsyncWorker, BackgroundWorker, PanicStrategy, Runnable, TaskHandle};
pub use util::{Gate, WaitResult};

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_basic_worker_roundtrip() {
        let worker = BackgroundWorker::new("lib", 8).unwrap();
        let out = Arc::new(Mutex::new(Vec::new()));

        worker.start().unwrap();
        for i in 0..5 {
            let out = out.clone();
            assert!(worker.execute(move || out.lock().push(i)));
        }

        let deadline = std::time::Instant::now() + Duration::from_secs(1);
        while out.lock().len() < 5 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }

        worker.stop();
        assert!(worker.wait_to_exit_timeout(Duration::from_millis(100)));
        assert_eq!(*out.lock(), vec![0, 1, 2, 3, 4]);
    }
}
