//! Deferred actions.
//!
//! Nothing in the engine sleeps: "do this in 300ms" is an entry in a
//! [`TimerQueue`], and the owner drains whatever has come due each time it
//! ticks. Entries with the same due time come out in the order they were
//! scheduled.

use std::{cmp::Ordering, collections::BinaryHeap};

struct Entry<A> {
    due: u64,
    seq: u64,
    action: A,
}

impl<A> PartialEq for Entry<A> {
    fn eq(&self, other: &Self) -> bool {
        (self.due, self.seq) == (other.due, other.seq)
    }
}

impl<A> Eq for Entry<A> {}

impl<A> PartialOrd for Entry<A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A> Ord for Entry<A> {
    // BinaryHeap is a max-heap; reverse so the earliest entry is on top.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

/// Min-ordered queue of `(fire_at, action)` pairs.
pub struct TimerQueue<A> {
    heap: BinaryHeap<Entry<A>>,
    next_seq: u64,
}

impl<A> TimerQueue<A> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Run `action` once the clock reaches `due` (milliseconds).
    pub fn schedule(&mut self, due: u64, action: A) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry { due, seq, action });
    }

    /// Take the earliest action whose time has come.
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, A)> {
        if self.heap.peek()?.due > now {
            return None;
        }
        self.heap.pop().map(|e| (e.due, e.action))
    }

    /// When the next action comes due, if any is pending.
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|e| e.due)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<A> Default for TimerQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}
