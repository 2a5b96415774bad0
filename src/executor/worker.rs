// single background worker: bounded FIFO drained by one thread
use super::panic_handler::PanicHandler;
use super::stats::{StatsSnapshot, WorkerStats};
use super::task::{task, Task, TaskHandle};
use super::AsyncWorker;
use crate::config::WorkerConfig;
use crate::error::{Error, Result};
use crate::util::Gate;
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// State shared between the owning [`BackgroundWorker`] and its loop thread.
#[derive(Debug)]
struct Shared {
    name: String,
    capacity: usize,
    poll_interval: Duration,
    // always equals queue.len() outside the queue lock
    depth: AtomicUsize,
    running: AtomicBool,
    // bumped on every successful start; a loop only consumes for its own generation
    generation: AtomicU64,
    input: Gate,
    exit: Gate,
    queue: Mutex<VecDeque<Task>>,
    // held while a task runs; serializes a lingering loop from an earlier run with the current one
    exec: Mutex<()>,
    panic_handler: PanicHandler,
    stats: WorkerStats,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::Acquire) && self.generation.load(Ordering::Acquire) == generation
    }

    fn next_task(&self, generation: u64) -> Option<(Task, MutexGuard<'_, ()>)> {
        let slot = self.exec.lock();
        let task = self.pop_front(generation)?;
        Some((task, slot))
    }

    fn pop_front(&self, generation: u64) -> Option<Task> {
        let mut queue = self.queue.lock();
        if !self.is_current(generation) {
            return None;
        }

        let task = queue.pop_front()?;
        self.depth.fetch_sub(1, Ordering::AcqRel);
        Some(task)
    }

    fn run_loop(&self, generation: u64) {
        tracing::debug!(worker = %self.name, generation, "worker loop started");

        while self.is_current(generation) {
            // re-arm before draining so a submit racing the drain still wakes us
            self.input.reset();

            while let Some((task, _slot)) = self.next_task(generation) {
                tracing::trace!(
                    worker = %self.name,
                    task = %task.id,
                    queued_for = ?task.enqueued_at.elapsed(),
                    "received task"
                );
                match self.panic_handler.execute(|| task.execute()) {
                    Ok(()) => self.stats.record_executed(),
                    Err(panic) => {
                        self.stats.record_panicked();
                        tracing::debug!(
                            worker = %self.name,
                            task = %task.id,
                            message = %panic.message,
                            "task panicked, moving to next task"
                        );
                    }
                }
            }

            if !self.is_current(generation) {
                break;
            }

            let _ = self.input.wait_timeout(self.poll_interval);
        }

        {
            let _queue = self.queue.lock();
            // a newer run owns the exit gate now
            if self.generation.load(Ordering::Acquire) == generation {
                self.exit.set();
            }
        }

        tracing::debug!(worker = %self.name, generation, "worker loop exited");
    }
}

/// Opens the `finished` gate when the loop thread unwinds, however it unwinds.
struct FinishGuard(Arc<Gate>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.set();
    }
}

#[derive(Debug)]
struct LoopHandle {
    generation: u64,
    thread: JoinHandle<()>,
    finished: Arc<Gate>,
}

/// A bounded FIFO of tasks drained by one dedicated background thread.
///
/// Tasks can be submitted whether or not the worker is running; they only
/// execute between [`start`](BackgroundWorker::start) and
/// [`stop`](BackgroundWorker::stop). A full queue rejects new tasks instead of
/// blocking the caller.
///
/// ```
/// use bgworker::prelude::*;
/// use std::time::Duration;
///
/// let worker = BackgroundWorker::new("docs", 4).unwrap();
/// worker.start().unwrap();
/// assert!(worker.execute(|| println!("hello from the worker")));
/// worker.stop();
/// assert!(worker.wait_to_exit_timeout(Duration::from_secs(1)));
/// ```
#[derive(Debug)]
pub struct BackgroundWorker {
    shared: Arc<Shared>,
    config: WorkerConfig,
    handle: Mutex<Option<LoopHandle>>,
}

impl BackgroundWorker {
    /// Worker with the given name and queue capacity, other settings default.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        let config = WorkerConfig::builder()
            .name(name)
            .queue_capacity(capacity)
            .build()?;
        Ok(Self::from_valid_config(config))
    }

    pub fn with_config(config: WorkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: WorkerConfig) -> Self {
        let shared = Arc::new(Shared {
            name: config.name.clone(),
            capacity: config.queue_capacity,
            poll_interval: config.poll_interval,
            depth: AtomicUsize::new(0),
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            input: Gate::blocked(),
            // not running counts as exited
            exit: Gate::new(false),
            queue: Mutex::new(VecDeque::with_capacity(config.queue_capacity.min(1024))),
            exec: Mutex::new(()),
            panic_handler: PanicHandler::new(config.name.clone(), config.panic_strategy),
            stats: WorkerStats::new(),
        });

        tracing::debug!(worker = %config.name, capacity = config.queue_capacity, "worker created");

        Self {
            shared,
            config,
            handle: Mutex::new(None),
        }
    }

    /// Spawn the background loop. Calling it while already running does nothing.
    pub fn start(&self) -> Result<()> {
        let mut slot = self.handle.lock();

        // generation, exit gate and running flag change together under the queue
        // lock; a loop from an earlier run checks the generation under the same lock
        let generation = {
            let _queue = self.shared.queue.lock();
            if self.shared.running.load(Ordering::Acquire) {
                tracing::debug!(worker = %self.shared.name, "start ignored, already running");
                return Ok(());
            }

            let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
            self.shared.exit.reset();
            self.shared.running.store(true, Ordering::Release);
            generation
        };

        let finished = Arc::new(Gate::blocked());
        let shared = self.shared.clone();
        let guard = FinishGuard(finished.clone());

        let mut builder = thread::Builder::new().name(self.shared.name.clone());
        if let Some(stack_size) = self.config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let thread = match builder.spawn(move || {
            let _guard = guard;
            shared.run_loop(generation);
        }) {
            Ok(thread) => thread,
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                self.shared.exit.set();
                return Err(Error::spawn(e.to_string()));
            }
        };

        let previous = slot.replace(LoopHandle {
            generation,
            thread,
            finished,
        });

        if let Some(old) = previous {
            if old.thread.is_finished() {
                let _ = old.thread.join();
            } else {
                // still inside a task from an earlier run; it exits on its own
                tracing::debug!(
                    worker = %self.shared.name,
                    generation = old.generation,
                    "detaching loop from earlier run"
                );
            }
        }

        tracing::debug!(worker = %self.shared.name, generation, "worker started");
        Ok(())
    }

    /// Request the loop to stop without waiting for it.
    ///
    /// A task already inside `run` finishes normally; no further queued task
    /// starts. Queued tasks stay in the queue.
    pub fn stop(&self) {
        let was_running = {
            let _queue = self.shared.queue.lock();
            self.shared.running.swap(false, Ordering::AcqRel)
        };

        self.shared.input.set();
        self.shared.exit.set();

        if was_running {
            tracing::debug!(worker = %self.shared.name, "worker stop requested");
        }
    }

    /// Block until the exit gate opens, then report whether the worker is idle.
    pub fn wait_to_exit(&self) -> bool {
        self.shared.exit.wait();
        !self.is_busy()
    }

    /// Like [`wait_to_exit`](Self::wait_to_exit), giving up after `timeout`.
    pub fn wait_to_exit_timeout(&self, timeout: Duration) -> bool {
        let _ = self.shared.exit.wait_timeout(timeout);
        !self.is_busy()
    }

    /// Queue a task. Returns `false` if the queue is full.
    pub fn submit(&self, runnable: TaskHandle) -> bool {
        self.try_submit(runnable).is_ok()
    }

    /// Queue a task, reporting a full queue as [`Error::QueueFull`].
    pub fn try_submit(&self, runnable: TaskHandle) -> Result<()> {
        let mut queue = self.shared.queue.lock();

        if self.shared.depth.load(Ordering::Acquire) >= self.shared.capacity {
            drop(queue);
            self.shared.stats.record_rejected();
            tracing::trace!(worker = %self.shared.name, "queue full, task rejected");
            return Err(Error::QueueFull {
                capacity: self.shared.capacity,
            });
        }

        let task = Task::new(runnable);
        let id = task.id;
        queue.push_back(task);
        let depth = self.shared.depth.fetch_add(1, Ordering::AcqRel) + 1;
        drop(queue);

        self.shared.input.set();
        tracing::trace!(worker = %self.shared.name, task = %id, depth, "task queued");
        Ok(())
    }

    /// Queue a closure.
    pub fn execute<F>(&self, f: F) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.submit(task(f))
    }

    /// Discard every queued task and return how many were dropped.
    /// A task already running is unaffected.
    pub fn clear_tasks(&self) -> usize {
        let cleared = {
            let mut queue = self.shared.queue.lock();
            let cleared = std::mem::take(&mut *queue);
            self.shared.depth.store(0, Ordering::Release);
            cleared
        };

        // handles drop outside the lock
        let n = cleared.len();
        drop(cleared);

        self.shared.stats.record_cleared(n);
        if n > 0 {
            tracing::debug!(worker = %self.shared.name, cleared = n, "queue cleared");
        }
        n
    }

    pub fn is_busy(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn queue_capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn queue_depth(&self) -> usize {
        self.shared.depth.load(Ordering::Acquire)
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }
}

impl Default for BackgroundWorker {
    fn default() -> Self {
        Self::from_valid_config(WorkerConfig::default())
    }
}

impl AsyncWorker for BackgroundWorker {
    fn submit(&self, runnable: TaskHandle) -> bool {
        BackgroundWorker::submit(self, runnable)
    }

    fn clear_tasks(&self) {
        BackgroundWorker::clear_tasks(self);
    }

    fn start(&self) -> Result<()> {
        BackgroundWorker::start(self)
    }

    fn stop(&self) {
        BackgroundWorker::stop(self)
    }

    fn wait_to_exit(&self) -> bool {
        BackgroundWorker::wait_to_exit(self)
    }

    fn wait_to_exit_timeout(&self, timeout: Duration) -> bool {
        BackgroundWorker::wait_to_exit_timeout(self, timeout)
    }

    fn is_busy(&self) -> bool {
        BackgroundWorker::is_busy(self)
    }

    fn queue_capacity(&self) -> usize {
        BackgroundWorker::queue_capacity(self)
    }

    fn queue_depth(&self) -> usize {
        BackgroundWorker::queue_depth(self)
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        self.stop();

        if let Some(handle) = self.handle.get_mut().take() {
            if handle.thread.thread().id() == thread::current().id() {
                // dropped from one of our own tasks; the loop exits after it returns
            } else if handle
                .finished
                .wait_timeout(self.config.shutdown_timeout)
                .is_signaled()
            {
                let _ = handle.thread.join();
            } else {
                tracing::warn!(
                    worker = %self.shared.name,
                    timeout = ?self.config.shutdown_timeout,
                    "worker loop still busy at drop, detaching thread"
                );
            }
        }

        tracing::debug!(worker = %self.shared.name, "worker dropped");
    }
}
