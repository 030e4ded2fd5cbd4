//! Virtual-time timer queue and clock sources
//!
//! Timers carry a typed payload instead of a callback. The owner drains due
//! timers with [`TimerQueue::pop_due`] and dispatches on the payload, which keeps
//! every delayed action inspectable and lets tests drive time by hand.

use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds on the presentation clock
pub type Millis = u64;

/// Source of the current presentation time
pub trait Clock {
    fn now_ms(&self) -> Millis;
}

/// Wall clock measured from the moment it was created
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: Millis) {
        self.now.set(self.now.get().saturating_add(delta));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Handle of a scheduled timer, stable across repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    payload: T,
    every: Option<Millis>,
}

/// A timer that came due
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    /// Scheduled due time (the queue's clock is set to this while dispatching)
    pub at: Millis,
    pub payload: T,
}

/// Ordered queue of one-shot and repeating timers
///
/// Timers fire by due time; timers due at the same instant fire in the order
/// they were (re)armed.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    now: Millis,
    next_id: u64,
    next_seq: u64,
    pending: BTreeMap<(Millis, u64), Timer<T>>,
    index: HashMap<TimerId, (Millis, u64)>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: 0,
            next_id: 0,
            next_seq: 0,
            pending: BTreeMap::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Clone> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current queue time: the due time of the timer being dispatched, or the
    /// latest time passed to [`TimerQueue::advance_to`]
    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<Millis> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Fire once, `delay` after the current queue time
    pub fn after(&mut self, delay: Millis, payload: T) -> TimerId {
        let due = self.now.saturating_add(delay);
        self.insert(due, payload, None)
    }

    /// Fire every `interval`, first one interval from now
    pub fn every(&mut self, interval: Millis, payload: T) -> TimerId {
        let interval = interval.max(1);
        let due = self.now.saturating_add(interval);
        self.insert(due, payload, Some(interval))
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.pending.clear();
        self.index.clear();
    }

    /// Pop the earliest timer due at or before `until`
    ///
    /// Repeating timers are re-armed one interval after their due time before
    /// being returned, so cancelling the returned id stops the repeat.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired<T>> {
        let (&key, _) = self.pending.iter().next()?;
        if key.0 > until {
            return None;
        }
        let timer = self.pending.remove(&key)?;
        self.index.remove(&timer.id);
        let at = key.0;
        self.now = self.now.max(at);

        if let Some(interval) = timer.every {
            let seq = self.bump_seq();
            let next_key = (at.saturating_add(interval), seq);
            self.index.insert(timer.id, next_key);
            self.pending.insert(next_key, timer.clone());
        }

        Some(Fired {
            id: timer.id,
            at,
            payload: timer.payload,
        })
    }

    /// Move the queue clock forward without firing anything
    pub fn advance_to(&mut self, now: Millis) {
        self.now = self.now.max(now);
    }

    fn insert(&mut self, due: Millis, payload: T, every: Option<Millis>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let key = (due, self.bump_seq());
        self.index.insert(id, key);
        self.pending.insert(key, Timer { id, payload, every });
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(queue: &mut TimerQueue<&'static str>, until: Millis) -> Vec<(Millis, &'static str)> {
        let mut fired = Vec::new();
        while let Some(f) = queue.pop_due(until) {
            fired.push((f.at, f.payload));
        }
        queue.advance_to(until);
        fired
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.after(300, "c");
        queue.after(100, "a");
        queue.after(200, "b");

        assert_eq!(drain(&mut queue, 1000), vec![(100, "a"), (200, "b"), (300, "c")]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_due_times_keep_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.after(500, "first");
        queue.after(500, "second");
        queue.after(500, "third");

        let order: Vec<_> = drain(&mut queue, 500).into_iter().map(|(_, p)| p).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_not_due_yet() {
        let mut queue = TimerQueue::new();
        queue.after(100, "later");
        assert!(queue.pop_due(99).is_none());
        assert_eq!(queue.next_due(), Some(100));
        assert!(queue.pop_due(100).is_some());
    }

    #[test]
    fn test_repeating_timer_rearms() {
        let mut queue = TimerQueue::new();
        queue.every(100, "tick");

        let fired = drain(&mut queue, 350);
        assert_eq!(fired, vec![(100, "tick"), (200, "tick"), (300, "tick")]);
        assert_eq!(queue.next_due(), Some(400));
    }

    #[test]
    fn test_cancel_repeating_from_fired_id() {
        let mut queue = TimerQueue::new();
        let id = queue.every(100, "tick");

        let fired = queue.pop_due(100).unwrap();
        assert_eq!(fired.id, id);
        assert!(queue.cancel(fired.id));
        assert!(queue.pop_due(10_000).is_none());
        assert!(!queue.cancel(id));
    }

    #[test]
    fn test_clock_follows_dispatch() {
        let mut queue = TimerQueue::new();
        queue.after(1000, "outer");

        let fired = queue.pop_due(5000).unwrap();
        assert_eq!(queue.now(), 1000);
        // Scheduling from inside a dispatch is relative to the fired time
        queue.after(500, "inner");
        assert_eq!(fired.payload, "outer");
        assert_eq!(queue.pop_due(5000).map(|f| f.at), Some(1500));
    }

    #[test]
    fn test_stop_wins_tie_with_repeat() {
        let mut queue = TimerQueue::new();
        let stop = queue.after(300, "stop");
        queue.every(100, "emit");

        let fired = drain(&mut queue, 300);
        assert_eq!(
            fired,
            vec![(100, "emit"), (200, "emit"), (300, "stop"), (300, "emit")]
        );
        assert!(!queue.contains(stop));
    }

    #[test]
    fn test_clear() {
        let mut queue = TimerQueue::new();
        queue.after(10, "a");
        queue.every(10, "b");
        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop_due(u64::MAX).is_none());
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(250);
        clock.advance(250);
        assert_eq!(view.now_ms(), 500);
        view.set(42);
        assert_eq!(clock.now_ms(), 42);
    }
}
