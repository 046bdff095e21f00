//! Cooperative timer queue for a single match.
//!
//! Nothing here runs on its own: the owner calls [`Scheduler::pop_due`] with
//! the current time and dispatches whatever comes out. Every timer remembers
//! the epoch it was scheduled in; [`Scheduler::cancel_all`] moves to a new
//! epoch, so a timer from before the cancel can never fire.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    /// Shop time is up, start the fight
    ShopTimeout,
    /// Advance the running combat
    CombatTick,
    /// Fight time is up, force the verdict
    FightTimeout,
    /// Result display is over, next round or end
    ResultTimeout,
}

/// Identity of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub(crate) struct TimerHandle {
    epoch: u32,
    seq: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
struct Timer {
    at: u64,
    trigger: Trigger,
    handle: TimerHandle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct Scheduler {
    epoch: u32,
    next_seq: u64,
    /// Kept sorted by (at, seq)
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `trigger` to fire at `at` (milliseconds)
    pub(crate) fn schedule(&mut self, at: u64, trigger: Trigger) -> TimerHandle {
        let handle = TimerHandle {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        let pos = self
            .timers
            .iter()
            .position(|t| t.at > at)
            .unwrap_or(self.timers.len());
        self.timers.insert(
            pos,
            Timer {
                at,
                trigger,
                handle,
            },
        );
        handle
    }

    /// Invalidate every pending timer
    pub fn cancel_all(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.timers.clear();
    }

    /// Whether `handle` can still fire
    #[cfg(test)]
    fn is_pending(&self, handle: TimerHandle) -> bool {
        handle.epoch == self.epoch && self.timers.iter().any(|t| t.handle == handle)
    }

    /// Take the earliest timer due at or before `now`, with its due time
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, Trigger)> {
        loop {
            let first = self.timers.first()?;
            if first.at > now {
                return None;
            }
            let timer = self.timers.remove(0);
            if timer.handle.epoch == self.epoch {
                return Some((timer.at, timer.trigger));
            }
        }
    }

    /// Due time of the next live timer
    pub fn next_due(&self) -> Option<u64> {
        self.timers
            .iter()
            .find(|t| t.handle.epoch == self.epoch)
            .map(|t| t.at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(300, Trigger::ResultTimeout);
        scheduler.schedule(100, Trigger::ShopTimeout);
        scheduler.schedule(100, Trigger::CombatTick);

        assert_eq!(scheduler.pop_due(50), None);
        assert_eq!(scheduler.pop_due(100), Some((100, Trigger::ShopTimeout)));
        assert_eq!(scheduler.pop_due(100), Some((100, Trigger::CombatTick)));
        assert_eq!(scheduler.pop_due(299), None);
        assert_eq!(scheduler.next_due(), Some(300));
        assert_eq!(
            scheduler.pop_due(1_000),
            Some((300, Trigger::ResultTimeout))
        );
        assert_eq!(scheduler.next_due(), None);
    }

    #[test]
    fn test_cancel_all_invalidates_handles() {
        let mut scheduler = Scheduler::new();
        let stale = scheduler.schedule(10, Trigger::FightTimeout);
        assert!(scheduler.is_pending(stale));

        scheduler.cancel_all();
        assert!(!scheduler.is_pending(stale));
        assert_eq!(scheduler.pop_due(u64::MAX), None);

        let fresh = scheduler.schedule(20, Trigger::ShopTimeout);
        assert!(scheduler.is_pending(fresh));
        assert_ne!(stale, fresh);
    }
}
