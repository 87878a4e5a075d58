use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

use log::debug;

/// Handle to one scheduled timer. Cancelling it guarantees it never fires.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TimerId(u64);

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum TimerEvent {
    Tick,
    BonusAppear,
    BonusExpire,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct Scheduled {
    due: Duration,
    id: TimerId,
    event: TimerEvent,
}

/// Session-time clock with a single ordered timer queue.
///
/// Every timer, the fixed tick included, lives in one queue ordered by
/// deadline and then by scheduling order, so callers drain events strictly
/// one at a time.
#[derive(Debug, Clone, Default)]
pub struct SimulationClock {
    now: Duration,
    queue: BinaryHeap<Reverse<Scheduled>>,
    live: HashSet<TimerId>,
    next_id: u64,
}

impl SimulationClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Session time elapsed so far.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedules `event` to fire `delay` after the current time.
    pub fn schedule_in(&mut self, delay: Duration, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let due = self.now + delay;
        self.queue.push(Reverse(Scheduled { due, id, event }));
        self.live.insert(id);
        debug!("scheduled {event:?} at {}ms", due.as_millis());

        id
    }

    /// Cancels a pending timer. Returns false when it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.live.remove(&id)
    }

    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.live.contains(&id)
    }

    /// Number of timers that can still fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.live.len()
    }

    /// Deadline of a pending timer.
    #[must_use]
    pub fn due_at(&self, id: TimerId) -> Option<Duration> {
        if !self.is_pending(id) {
            return None;
        }

        self.queue
            .iter()
            .find(|Reverse(entry)| entry.id == id)
            .map(|Reverse(entry)| entry.due)
    }

    /// Pops the earliest live timer due at or before `until`, moving the
    /// clock to its deadline. Cancelled entries are discarded on the way.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, TimerEvent)> {
        while let Some(Reverse(next)) = self.queue.peek().copied() {
            if next.due > until {
                return None;
            }

            self.queue.pop();
            if self.live.remove(&next.id) {
                self.now = self.now.max(next.due);
                return Some((next.id, next.event));
            }
        }

        None
    }

    /// Moves the clock forward to `until` once every due timer is drained.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
