//! Time-ordered queue of delayed effects.
//!
//! Events reference their targets by node ID only. A target that has been
//! removed by the time the event fires turns the event into a no-op.

use glam::Vec2;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// A delayed effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduledEvent {
    /// End a split sling: the piece slows to its steady speed along `heading`.
    SettleSplit { piece: u32, heading: Vec2 },
    /// Fold a split-off piece back into its sibling.
    Merge { piece: u32, sibling: u32 },
    /// Remove an unabsorbed pellet.
    ExpirePellet { pellet: u32 },
    /// Spawn a special enemy near the player; reschedules itself.
    SpawnSpecial,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due_ms: u64,
    seq: u64,
    event: ScheduledEvent,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due_ms, self.seq).cmp(&(other.due_ms, other.seq))
    }
}

/// Min-queue of events keyed by due time; equal due times fire in scheduling order.
#[derive(Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `event` to fire at `due_ms`.
    pub fn schedule(&mut self, due_ms: u64, event: ScheduledEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Entry { due_ms, seq, event }));
    }

    /// Pop the next event due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, ScheduledEvent)> {
        match self.queue.peek() {
            Some(Reverse(entry)) if entry.due_ms <= now_ms => {
                let Reverse(entry) = self.queue.pop()?;
                Some((entry.due_ms, entry.event))
            }
            _ => None,
        }
    }

    /// Due time of the earliest pending event.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.peek().map(|Reverse(e)| e.due_ms)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
