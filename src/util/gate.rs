//! Single-slot blocking signal.
//!
//! A [`Gate`] is either *blocked* or *open*. [`Gate::set`] opens it and wakes
//! one waiter; it stays open until [`Gate::reset`] is called. Waiting on an
//! open gate never blocks and never closes it again.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Outcome of a bounded wait on a [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum WaitResult {
    /// The gate was open when the waiter woke up.
    Signaled,
    /// The timeout elapsed while the gate was still blocked.
    TimedOut,
}

impl WaitResult {
    /// Returns `true` for [`WaitResult::Signaled`].
    pub fn is_signaled(self) -> bool {
        matches!(self, WaitResult::Signaled)
    }

    /// Returns `true` for [`WaitResult::TimedOut`].
    pub fn timed_out(self) -> bool {
        matches!(self, WaitResult::TimedOut)
    }
}

/// Binary signal with explicit re-arm.
///
/// `N` calls to [`set`](Gate::set) with nobody waiting collapse into a single
/// open state; they are not counted like semaphore permits.
#[derive(Debug)]
pub struct Gate {
    // true = wait() blocks
    blocked: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    /// Create a gate, initially blocked or open.
    pub fn new(blocked: bool) -> Self {
        Self {
            blocked: Mutex::new(blocked),
            cond: Condvar::new(),
        }
    }

    /// Create a gate that blocks until the first [`set`](Gate::set).
    pub fn blocked() -> Self {
        Self::new(true)
    }

    /// Open the gate and wake one blocked waiter, if any.
    pub fn set(&self) {
        let mut blocked = self.blocked.lock();
        *blocked = false;
        self.cond.notify_one();
    }

    /// Put the gate back into the blocking state.
    pub fn reset(&self) {
        *self.blocked.lock() = true;
    }

    /// Current state without waiting.
    pub fn is_blocked(&self) -> bool {
        *self.blocked.lock()
    }

    /// Block until the gate is open.
    pub fn wait(&self) {
        let mut blocked = self.blocked.lock();
        while *blocked {
            self.cond.wait(&mut blocked);
        }
    }

    /// Block until the gate is open or `timeout` elapses.
    ///
    /// A zero timeout only polls the current state; use [`wait`](Gate::wait)
    /// to block with no limit. Spurious wake-ups re-check the state against
    /// the original deadline.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitResult {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return WaitResult::Signaled;
        };

        let mut blocked = self.blocked.lock();
        while *blocked {
            if self.cond.wait_until(&mut blocked, deadline).timed_out() {
                break;
            }
        }

        if *blocked {
            WaitResult::TimedOut
        } else {
            WaitResult::Signaled
        }
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::blocked()
    }
}
