use crate::error::{Error, Result};
use crate::executor::PanicStrategy;
use std::time::Duration;

/// Default queue capacity when none is given.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default worker (and thread) name.
pub const DEFAULT_NAME: &str = "bg-worker";

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub name: String,
    pub queue_capacity: usize,
    /// Upper bound on how long the idle loop sleeps before re-checking the running flag.
    pub poll_interval: Duration,
    pub panic_strategy: PanicStrategy,
    pub stack_size: Option<usize>,
    /// How long `Drop` waits for the loop to finish before detaching it.
    pub shutdown_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            poll_interval: Duration::from_millis(10),
            panic_strategy: PanicStrategy::default(),
            stack_size: Some(2 * 1024 * 1024),
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}

impl WorkerConfig {
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(Error::config("queue_capacity must be > 0"));
        }

        if self.poll_interval.is_zero() {
            return Err(Error::config("poll_interval must be > 0"));
        }

        if self.name.contains('\0') {
            return Err(Error::config("name must not contain NUL bytes"));
        }

        if let Some(size) = self.stack_size {
            if size == 0 {
                return Err(Error::config("stack_size must be > 0"));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: WorkerConfig::default(),
        }
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<WorkerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorkerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
        assert_eq!(config.name, DEFAULT_NAME);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = WorkerConfig::builder().queue_capacity(0).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let result = WorkerConfig::builder().poll_interval(Duration::ZERO).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_nul_in_name_rejected() {
        let result = WorkerConfig::builder().name("bad\0name").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = WorkerConfig::builder()
            .name("io")
            .queue_capacity(8)
            .panic_strategy(PanicStrategy::Isolate)
            .build()
            .unwrap();
        assert_eq!(config.name, "io");
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.panic_strategy, PanicStrategy::Isolate);
    }
}
