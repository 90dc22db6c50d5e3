#![forbid(unsafe_code)]

//! Trailing-edge debounce over a [`TimerQueue`].
//!
//! Each [`Debounce::call`] cancels the pending timer and schedules a new one
//! carrying the latest arguments. When the timer fires, the owner hands the
//! id to [`Debounce::fire`] and gets back the arguments of the last call.

use web_time::Duration;

use crate::timer::{TimerId, TimerQueue};

#[derive(Debug, Clone)]
pub struct Debounce<A> {
    wait: Duration,
    pending: Option<(TimerId, A)>,
}

impl<A> Debounce<A> {
    #[must_use]
    pub const fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }

    /// Record a call at `now`, superseding any pending one.
    pub fn call(&mut self, timers: &mut TimerQueue, now: Duration, args: A) {
        if let Some((stale, _)) = self.pending.take() {
            timers.cancel(stale);
        }
        let id = timers.schedule_once(now, self.wait);
        self.pending = Some((id, args));
    }

    /// Consume the pending call if `id` is its timer.
    pub fn fire(&mut self, id: TimerId) -> Option<A> {
        match &self.pending {
            Some((pending, _)) if *pending == id => self.pending.take().map(|(_, args)| args),
            _ => None,
        }
    }

    /// Drop the pending call without running it.
    pub fn cancel(&mut self, timers: &mut TimerQueue) {
        if let Some((id, _)) = self.pending.take() {
            timers.cancel(id);
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
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
    fn burst_collapses_to_last_call() {
        let mut timers = TimerQueue::new();
        let mut d = Debounce::new(ms(250));
        d.call(&mut timers, ms(0), 1);
        d.call(&mut timers, ms(100), 2);
        d.call(&mut timers, ms(200), 3);
        assert_eq!(timers.len(), 1);

        assert_eq!(timers.pop_due(ms(449)), None);
        let id = timers.pop_due(ms(450)).unwrap();
        assert_eq!(d.fire(id), Some(3));
        assert_eq!(d.fire(id), None);
        assert!(!d.is_pending());
    }

    #[test]
    fn foreign_timer_is_ignored() {
        let mut timers = TimerQueue::new();
        let other = timers.schedule_once(ms(0), ms(1));
        let mut d = Debounce::new(ms(10));
        d.call(&mut timers, ms(0), "x");
        assert_eq!(d.fire(other), None);
        assert!(d.is_pending());
    }

    #[test]
    fn cancel_clears_timer() {
        let mut timers = TimerQueue::new();
        let mut d = Debounce::new(ms(10));
        d.call(&mut timers, ms(0), ());
        d.cancel(&mut timers);
        assert!(timers.is_empty());
        assert!(!d.is_pending());
    }
}
