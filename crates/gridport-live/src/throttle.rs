#![forbid(unsafe_code)]

//! Trailing-edge request coalescing.
//!
//! # Design
//!
//! The first `schedule` of a burst arms a deadline one window ahead.
//! Later schedules replace the pending value without moving the
//! deadline, so a continuous stream of schedules still fires once per
//! window instead of starving. Polling at or past the deadline yields
//! the latest value exactly once.
//!
//! The throttle is driven entirely by explicit `now` instants: owners
//! embed it in whatever tick loop they already run, and tests never
//! sleep.
//!
//! # Invariants
//!
//! 1. At most one pending invocation exists at a time.
//! 2. The latest scheduled value always wins.
//! 3. A scheduled value is eventually yielded unless canceled, flushed,
//!    or replaced.
//! 4. Non-overlapping windows never coalesce.

use web_time::{Duration, Instant};

/// Default coalescing window for viewport updates.
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(150);

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Coalesces a burst of values into the latest one per window.
#[derive(Debug)]
pub struct Throttle<T> {
    window: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Default for Throttle<T> {
    fn default() -> Self {
        Self::new(DEFAULT_THROTTLE_WINDOW)
    }
}

impl<T> Throttle<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Queues `value`. Starts a new window if none is open; otherwise
    /// replaces the pending value and keeps the open window's deadline.
    pub fn schedule(&mut self, now: Instant, value: T) {
        match &mut self.pending {
            Some(pending) => pending.value = value,
            None => {
                self.pending = Some(Pending {
                    value,
                    deadline: now + self.window,
                });
            }
        }
    }

    /// Yields the pending value if its window has elapsed.
    #[must_use]
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(pending) if now >= pending.deadline => {
                self.pending.take().map(|pending| pending.value)
            }
            _ => None,
        }
    }

    /// Yields the pending value immediately, regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|pending| pending.value)
    }

    /// Discards any pending value without yielding it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the open window, if one is open.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}
