//! Single-deadline timers
//!
//! Each timer owns at most one pending deadline. Arming always replaces the
//! previous deadline, so two overlapping timers for the same purpose cannot
//! exist. Deadlines are polled: callers pass the current instant and consume
//! elapsed deadlines with [`DeadlineTimer::fire_if_due`].

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeadlineTimer {
    deadline: Option<Instant>,
}

impl DeadlineTimer {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Cancel any pending deadline and arm a new one `delay` after `now`
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True while armed and `now` is before the deadline
    pub fn is_pending(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now < deadline)
    }

    /// Consume the deadline if it has elapsed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Leading-edge rate limiter.
///
/// A call is accepted when no call was accepted within the last `interval`;
/// rejected calls are dropped, not deferred.
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    interval: Duration,
    window: DeadlineTimer,
}

impl Throttle {
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            window: DeadlineTimer::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `f` if the throttle is open at `now`
    pub fn call<R>(&mut self, now: Instant, f: impl FnOnce() -> R) -> Option<R> {
        if self.window.is_pending(now) {
            return None;
        }
        self.window.arm(now, self.interval);
        Some(f())
    }

    pub fn reset(&mut self) {
        self.window.cancel();
    }
}

/// Trailing-edge debounce holding the latest value until `delay` passes
/// without a newer one.
#[derive(Debug, Clone)]
pub struct Debounce<T> {
    delay: Duration,
    timer: DeadlineTimer,
    pending: Option<T>,
}

impl<T> Debounce<T> {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: DeadlineTimer::new(),
            pending: None,
        }
    }

    /// Replace the pending value and restart the delay
    pub fn push(&mut self, now: Instant, value: T) {
        self.pending = Some(value);
        self.timer.arm(now, self.delay);
    }

    /// Take the pending value once its delay has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.timer.fire_if_due(now) {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.timer.cancel();
        self.pending.take()
    }
}
