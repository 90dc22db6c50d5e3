#![forbid(unsafe_code)]

//! Host-driven time: a deterministic clock and a cancellable timer queue.
//!
//! Nothing here sleeps. The host advances the clock and asks the queue for
//! due timers; it learns when to wake next from [`TimerQueue::next_deadline`].

use web_time::Duration;

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Time never moves backwards.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Handle for one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    id: TimerId,
    due: Duration,
    period: Option<Duration>,
}

/// One-shot and periodic timers keyed by [`TimerId`].
///
/// Timers fire in deadline order; ties fire in scheduling order. A periodic
/// timer is rescheduled from its previous deadline, so a host that wakes
/// late catches up one period at a time.
#[derive(Debug, Default, Clone)]
pub struct TimerQueue {
    next_id: u64,
    entries: Vec<TimerEntry>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Duration, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimerEntry { id, due, period });
        id
    }

    /// Fire once, `delay` after `now`.
    pub fn schedule_once(&mut self, now: Duration, delay: Duration) -> TimerId {
        self.push(now.saturating_add(delay), None)
    }

    /// Fire every `period` starting one period after `now`.
    ///
    /// A zero period is bumped to one millisecond so the queue cannot spin.
    pub fn schedule_every(&mut self, now: Duration, period: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.push(now.saturating_add(period), Some(period))
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest pending deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|entry| entry.due).min()
    }

    /// Remove and return the earliest timer due at or before `now`.
    ///
    /// Periodic timers stay queued with their next deadline.
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerId> {
        let (index, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| (entry.due, entry.id))?;
        let entry = self.entries[index];
        match entry.period {
            Some(period) => self.entries[index].due = entry.due.saturating_add(period),
            None => {
                self.entries.remove(index);
            }
        }
        Some(entry.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn deterministic_clock_is_monotonic() {
        let mut c = DeterministicClock::new();
        assert_eq!(c.now(), Duration::ZERO);

        c.advance(ms(10));
        c.set(ms(5));
        assert_eq!(c.now(), ms(10));

        c.set(Duration::MAX);
        c.advance(ms(1));
        assert_eq!(c.now(), Duration::MAX);
    }

    #[test]
    fn one_shot_fires_once() {
        let mut q = TimerQueue::new();
        let id = q.schedule_once(ms(0), ms(250));
        assert_eq!(q.pop_due(ms(249)), None);
        assert_eq!(q.pop_due(ms(250)), Some(id));
        assert_eq!(q.pop_due(ms(10_000)), None);
        assert!(q.is_empty());
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut q = TimerQueue::new();
        let late = q.schedule_once(ms(0), ms(300));
        let a = q.schedule_once(ms(0), ms(100));
        let b = q.schedule_once(ms(0), ms(100));
        assert_eq!(q.next_deadline(), Some(ms(100)));
        assert_eq!(q.pop_due(ms(500)), Some(a));
        assert_eq!(q.pop_due(ms(500)), Some(b));
        assert_eq!(q.pop_due(ms(500)), Some(late));
    }

    #[test]
    fn periodic_catches_up_one_period_at_a_time() {
        let mut q = TimerQueue::new();
        let id = q.schedule_every(ms(0), ms(5000));
        let mut fired = 0;
        while q.pop_due(ms(15_500)).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert!(q.is_pending(id));
        assert_eq!(q.next_deadline(), Some(ms(20_000)));
    }

    #[test]
    fn cancel_reports_whether_pending() {
        let mut q = TimerQueue::new();
        let id = q.schedule_once(ms(0), ms(1));
        assert!(q.cancel(id));
        assert!(!q.cancel(id));
        assert_eq!(q.pop_due(ms(5)), None);
    }

    #[test]
    fn zero_period_does_not_spin() {
        let mut q = TimerQueue::new();
        q.schedule_every(ms(0), Duration::ZERO);
        assert_eq!(q.next_deadline(), Some(ms(1)));
    }
}
