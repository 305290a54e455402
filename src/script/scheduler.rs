//! Pending script continuations.
//!
//! A `wait` (or a loop or casting deferral) parks the running instance and
//! hands the scheduler a [`Continuation`]. The engine pops due
//! continuations on each pulse and resumes the instance at the saved
//! cursor.
//!
//! Cancelling is lazy: a cancelled entry stays in the heap but no longer
//! has a record, so [`WaitQueue::pop_due`] skips it.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::core::{Handle, Uid};

/// Identifies one scheduled continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WaitId(pub u64);

impl WaitId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WaitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "W{}", self.0)
    }
}

/// Why a run was suspended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitKind {
    /// `wait` command or loop deferral.
    Wait,
    /// The owner was busy casting; retry the current line.
    Casting,
}

/// Where and how to resume a suspended run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Continuation {
    pub trigger: Handle,
    pub owner: Uid,
    /// Line index to resume at.
    pub resume_at: usize,
    pub kind: WaitKind,
}

/// Continuations ordered by due pulse, ties broken by scheduling order.
#[derive(Debug, Default)]
pub struct WaitQueue {
    heap: BinaryHeap<Reverse<(u64, u64)>>,
    pending: FxHashMap<WaitId, (u64, Continuation)>,
    next_id: u64,
}

impl WaitQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `cont` to fire `delay` pulses after `now`. A zero delay is
    /// bumped to one pulse.
    pub fn schedule(&mut self, now: u64, delay: u64, cont: Continuation) -> WaitId {
        let due = now.saturating_add(delay.max(1));
        let id = WaitId(self.next_id);
        self.next_id += 1;
        self.heap.push(Reverse((due, id.0)));
        self.pending.insert(id, (due, cont));
        id
    }

    /// Drop a continuation. Returns it if it was still pending.
    pub fn cancel(&mut self, id: WaitId) -> Option<Continuation> {
        self.pending.remove(&id).map(|(_, cont)| cont)
    }

    /// Drop every continuation belonging to `owner`. Returns how many.
    pub fn cancel_owner(&mut self, owner: Uid) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, (_, cont)| cont.owner != owner);
        before - self.pending.len()
    }

    /// The pulse a pending continuation is due at.
    #[must_use]
    pub fn due_at(&self, id: WaitId) -> Option<u64> {
        self.pending.get(&id).map(|&(due, _)| due)
    }

    #[must_use]
    pub fn get(&self, id: WaitId) -> Option<&Continuation> {
        self.pending.get(&id).map(|(_, cont)| cont)
    }

    /// Pop the earliest continuation due at or before `now`.
    pub fn pop_due(&mut self, now: u64) -> Option<(WaitId, Continuation)> {
        while let Some(&Reverse((due, raw))) = self.heap.peek() {
            if due > now {
                return None;
            }
            self.heap.pop();
            let id = WaitId(raw);
            if let Some((_, cont)) = self.pending.remove(&id) {
                return Some((id, cont));
            }
        }
        None
    }

    /// Number of live continuations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Arena;

    fn cont(owner: u64) -> Continuation {
        let mut arena = Arena::new();
        Continuation {
            trigger: arena.insert(()),
            owner: Uid::new(owner),
            resume_at: 3,
            kind: WaitKind::Wait,
        }
    }

    #[test]
    fn test_due_order() {
        let mut queue = WaitQueue::new();
        let late = queue.schedule(0, 20, cont(1));
        let early = queue.schedule(0, 5, cont(2));

        assert!(queue.pop_due(4).is_none());
        assert_eq!(queue.pop_due(5).map(|(id, _)| id), Some(early));
        assert!(queue.pop_due(19).is_none());
        assert_eq!(queue.pop_due(25).map(|(id, _)| id), Some(late));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let mut queue = WaitQueue::new();
        let a = queue.schedule(10, 1, cont(1));
        let b = queue.schedule(10, 1, cont(2));
        assert_eq!(queue.pop_due(11).map(|(id, _)| id), Some(a));
        assert_eq!(queue.pop_due(11).map(|(id, _)| id), Some(b));
    }

    #[test]
    fn test_zero_delay_is_one_pulse() {
        let mut queue = WaitQueue::new();
        let id = queue.schedule(7, 0, cont(1));
        assert_eq!(queue.due_at(id), Some(8));
    }

    #[test]
    fn test_cancel() {
        let mut queue = WaitQueue::new();
        let id = queue.schedule(0, 1, cont(1));
        assert!(queue.cancel(id).is_some());
        assert!(queue.cancel(id).is_none());
        assert!(queue.pop_due(100).is_none());
    }

    #[test]
    fn test_cancel_owner() {
        let mut queue = WaitQueue::new();
        queue.schedule(0, 1, cont(1));
        queue.schedule(0, 2, cont(1));
        let kept = queue.schedule(0, 3, cont(2));

        assert_eq!(queue.cancel_owner(Uid::new(1)), 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop_due(10).map(|(id, _)| id), Some(kept));
    }
}
