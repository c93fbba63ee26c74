//! Trailing-edge debounce gate.
//!
//! The gate never reads the clock itself: callers pass `now` to [`Debouncer::arm`]
//! and [`Debouncer::fire`], so the event loop drives it and tests stay deterministic.

use std::fmt;
use std::time::{Duration, Instant};

/// Default debounce window for search input.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// A value waiting for its debounce window to elapse.
#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: Instant,
}

/// Delays propagation of a changing value until it has been stable for `delay`.
///
/// Every [`arm`](Self::arm) restarts the window. There is no leading-edge
/// fire and no max-wait cap. The pending value is owned by the gate, so
/// dropping the gate cancels it.
#[derive(Debug)]
pub struct Debouncer<T> {
    /// Quiet period required before a pending value settles.
    delay: Duration,
    /// Last value that made it through the gate.
    settled: T,
    /// Value waiting for its window to elapse.
    pending: Option<Pending<T>>,
}

impl<T: Clone + PartialEq + fmt::Debug> Debouncer<T> {
    /// Creates a gate whose settled value starts as `initial`.
    pub const fn new(delay: Duration, initial: T) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
        }
    }

    /// Returns the debounce window.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the last settled value.
    #[must_use]
    pub const fn settled(&self) -> &T {
        &self.settled
    }

    /// Returns `true` while a value is waiting to fire.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns when the pending value will fire, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Returns how long until the pending value fires (zero if overdue).
    #[must_use]
    pub fn time_until_fire(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Records `value` as pending and restarts the window at `now`.
    pub fn arm(&mut self, value: T, now: Instant) {
        let deadline = now.checked_add(self.delay).unwrap_or(now);
        self.pending = Some(Pending { value, deadline });
    }

    /// Drops the pending value without firing. Returns it, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Settles the pending value once its window has elapsed.
    ///
    /// Returns the new settled value only when it differs from the previous
    /// one; a window that elapses on an unchanged value is consumed silently.
    pub fn fire(&mut self, now: Instant) -> Option<&T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;

        if pending.value == self.settled {
            tracing::trace!(value = ?pending.value, "debounced value unchanged");
            return None;
        }

        self.settled = pending.value;
        tracing::debug!(value = ?self.settled, "debounced value settled");
        Some(&self.settled)
    }
}
