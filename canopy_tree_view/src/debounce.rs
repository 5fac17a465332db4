// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coalescing of rapid updates into one after a quiet period.

/// Holds the latest pushed value until no new value has arrived for `delay_ms`.
///
/// Time is supplied by the caller as milliseconds from any monotonic origin,
/// the same way pointer events carry their timestamps. The debouncer never
/// reads a clock itself.
///
/// ```rust
/// use canopy_tree_view::Debouncer;
///
/// let mut search = Debouncer::new(150);
/// search.push("m", 1_000);
/// search.push("mo", 1_080);
/// assert_eq!(search.poll(1_200), None);
/// assert_eq!(search.poll(1_230), Some("mo"));
/// assert!(!search.is_pending());
/// ```
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    /// Creates an idle debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// The quiet period in milliseconds.
    #[must_use]
    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Stores `value`, replacing any pending one, and restarts the quiet period at `now`.
    pub fn push(&mut self, value: T, now: u64) {
        self.pending = Some((value, now.saturating_add(self.delay_ms)));
    }

    /// Takes the pending value if its quiet period has elapsed by `now`.
    pub fn poll(&mut self, now: u64) -> Option<T> {
        if self.deadline().is_some_and(|deadline| now >= deadline) {
            self.cancel()
        } else {
            None
        }
    }

    /// Drops the pending value. Returns it, if there was one.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Returns `true` if a value is waiting.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time at which the pending value becomes available.
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::Debouncer;

    #[test]
    fn newer_push_supersedes_and_restarts() {
        let mut d = Debouncer::new(100);
        d.push(1, 0);
        assert_eq!(d.deadline(), Some(100));
        d.push(2, 90);
        assert_eq!(d.deadline(), Some(190));
        assert_eq!(d.poll(150), None);
        assert_eq!(d.poll(190), Some(2));
        assert_eq!(d.poll(500), None);
    }

    #[test]
    fn cancel_drops_pending() {
        let mut d = Debouncer::new(100);
        d.push("x", 0);
        assert_eq!(d.cancel(), Some("x"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(1_000), None);
    }

    #[test]
    fn zero_delay_is_ready_immediately() {
        let mut d = Debouncer::new(0);
        d.push('a', 42);
        assert_eq!(d.poll(42), Some('a'));
    }

    #[test]
    fn deadline_saturates() {
        let mut d = Debouncer::new(10);
        d.push((), u64::MAX - 1);
        assert_eq!(d.deadline(), Some(u64::MAX));
    }
}
