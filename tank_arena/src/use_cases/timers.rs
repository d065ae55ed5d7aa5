// One-shot timers on the simulation clock.

use crate::domain::state::{BulletId, TankId};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// Retire a bullet that never hit anything.
    BulletExpiry(BulletId),
    /// Put a tank part back to its style color after a hit flash.
    RestoreFill { tank: TankId, part: usize },
}

/// Cancellable timers ordered by deadline, then by scheduling order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: BTreeMap<(Duration, TimerId), TimerTask>,
    deadlines: HashMap<TimerId, Duration>,
}

impl TimerQueue {
    pub fn schedule(&mut self, now: Duration, after: Duration, task: TimerTask) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let deadline = now + after;
        self.pending.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Returns false when the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.pending.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Pops the earliest timer due at `now`.
    ///
    /// One at a time, so a task that cancels a later timer takes effect before that timer is seen.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, TimerTask)> {
        let (&(deadline, id), _) = self.pending.first_key_value()?;
        if deadline > now {
            return None;
        }
        let task = self.pending.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        Some((id, task))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
