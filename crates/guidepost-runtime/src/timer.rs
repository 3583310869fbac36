#![forbid(unsafe_code)]

//! Virtual-clock timer queue for scheduled continuations.
//!
//! The engine never blocks. A settle delay is a payload parked in this queue
//! until the host advances the clock past its deadline. Because the queue is
//! owned by the state machine, cancelling a continuation is a synchronous
//! removal: once [`TimerQueue::cancel`] returns, the payload can never fire.
//!
//! # Ordering
//!
//! Timers fire in deadline order; ties fire in scheduling order. While
//! draining with [`TimerQueue::pop_due`], the clock steps to each fired
//! timer's deadline, so a continuation that schedules another timer sees the
//! correct "now" and the new timer fires within the same drain if its
//! deadline falls inside the window.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// A timer that reached its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub deadline: Duration,
    pub payload: T,
}

/// Deterministic timer queue driven by explicit clock advances.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<(Duration, u64), T>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            pending: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `payload` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        let deadline = self.now.saturating_add(delay);
        self.pending.insert((deadline, id), payload);
        tracing::trace!(timer = id, deadline_ms = deadline.as_millis() as u64, "timer scheduled");
        TimerId(id)
    }

    /// Cancel a pending timer, returning its payload.
    ///
    /// Returns `None` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let key = self.key_of(id)?;
        let payload = self.pending.remove(&key);
        if payload.is_some() {
            tracing::trace!(timer = id.0, "timer cancelled");
        }
        payload
    }

    /// Cancel everything.
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.key_of(id).is_some()
    }

    /// Pop the earliest timer whose deadline is at or before `until`.
    ///
    /// Moves the clock to that timer's deadline. Call [`settle_at`](Self::settle_at)
    /// after draining to move the clock the rest of the way.
    pub fn pop_due(&mut self, until: Duration) -> Option<Fired<T>> {
        let (&(deadline, id), _) = self.pending.iter().next()?;
        if deadline > until {
            return None;
        }
        let payload = self.pending.remove(&(deadline, id))?;
        if deadline > self.now {
            self.now = deadline;
        }
        Some(Fired {
            id: TimerId(id),
            deadline,
            payload,
        })
    }

    /// Move the clock forward to `time` (never backwards).
    pub fn settle_at(&mut self, time: Duration) {
        if time > self.now {
            self.now = time;
        }
    }

    /// Advance the clock by `delta`, returning every timer that came due, in order.
    pub fn advance(&mut self, delta: Duration) -> Vec<Fired<T>> {
        let until = self.now.saturating_add(delta);
        let mut fired = Vec::new();
        while let Some(timer) = self.pop_due(until) {
            fired.push(timer);
        }
        self.settle_at(until);
        fired
    }

    fn key_of(&self, id: TimerId) -> Option<(Duration, u64)> {
        self.pending
            .keys()
            .find(|(_, raw)| *raw == id.0)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(ms(300), "scroll");
        q.schedule(ms(100), "first");
        q.schedule(ms(300), "tie");

        let fired: Vec<_> = q.advance(ms(500)).into_iter().map(|f| f.payload).collect();
        assert_eq!(fired, vec!["first", "scroll", "tie"]);
        assert_eq!(q.now(), ms(500));
        assert!(q.is_empty());
    }

    #[test]
    fn not_due_stays_pending() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(400), ());
        assert!(q.advance(ms(399)).is_empty());
        assert!(q.is_pending(id));
        assert_eq!(q.advance(ms(1)).len(), 1);
        assert!(!q.is_pending(id));
    }

    #[test]
    fn cancel_prevents_fire() {
        let mut q = TimerQueue::new();
        let id = q.schedule(ms(10), 7);
        assert_eq!(q.cancel(id), Some(7));
        assert_eq!(q.cancel(id), None);
        assert!(q.advance(ms(100)).is_empty());
    }

    #[test]
    fn clear_drops_everything() {
        let mut q = TimerQueue::new();
        q.schedule(ms(10), 1);
        q.schedule(ms(20), 2);
        assert_eq!(q.clear(), 2);
        assert!(q.is_empty());
        assert!(q.advance(ms(100)).is_empty());
    }

    #[test]
    fn pop_due_steps_clock_to_deadline() {
        let mut q = TimerQueue::new();
        q.schedule(ms(100), "a");
        let fired = q.pop_due(ms(1000)).unwrap();
        assert_eq!(fired.deadline, ms(100));
        assert_eq!(q.now(), ms(100));
        // A chained timer scheduled now is relative to the fired deadline.
        q.schedule(ms(50), "b");
        assert!(q.pop_due(ms(149)).is_none());
        assert_eq!(q.pop_due(ms(150)).unwrap().payload, "b");
        q.settle_at(ms(1000));
        assert_eq!(q.now(), ms(1000));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut q: TimerQueue<()> = TimerQueue::new();
        q.settle_at(ms(10));
        q.settle_at(ms(5));
        assert_eq!(q.now(), ms(10));
    }
}
