//! # Virtual-time scheduling for deterministic tests.
//!
//! [`VirtualScheduler`] holds enqueued work until an explicit
//! [`flush`](VirtualScheduler::flush) drains all due items in
//! (due-time, enqueue-order) order, advancing the logical clock to each
//! item's due time as it runs. Nothing executes before the flush, which is
//! what makes time-dependent behavior verifiable: subscribe, assert
//! silence, flush, assert the full delivery.
//!
//! ## Rules
//! - **Ordering**: non-decreasing due time; ties break by enqueue order.
//! - **Cancellation**: an entry whose owning subscription was released is
//!   skipped, never run.
//! - **Reschedule**: a work item that calls `reschedule(delay)` is pushed
//!   back as a fresh entry due at `now + delay`, owned by the same
//!   subscription.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex};

use crate::core::{lock, Subscription};
use crate::scheduler::{Scheduler, Work, WorkContext};

struct Entry {
    due: u64,
    seq: u64,
    work: Work,
    owner: Arc<Subscription>,
}

// BinaryHeap is a max-heap; compare reversed so the earliest (due, seq)
// pops first.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        (other.due, other.seq).cmp(&(self.due, self.seq))
    }
}

struct State {
    now: u64,
    seq: u64,
    queue: BinaryHeap<Entry>,
}

/// Scheduler over a simulated clock advanced only by explicit flush.
pub struct VirtualScheduler {
    state: Mutex<State>,
}

impl Default for VirtualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualScheduler {
    /// Creates a scheduler with an empty queue and the clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State { now: 0, seq: 0, queue: BinaryHeap::new() }),
        }
    }

    /// Number of queued (not yet flushed) work items, cancelled ones
    /// included.
    pub fn pending(&self) -> usize {
        lock(&self.state).queue.len()
    }

    /// Drains the queue in (due, seq) order, advancing the clock to each
    /// entry's due time before running it.
    ///
    /// Work scheduled *during* the flush (including reschedules) joins the
    /// same drain. Entries whose owner was released are skipped.
    pub fn flush(&self) {
        loop {
            let entry = {
                let mut state = lock(&self.state);
                match state.queue.pop() {
                    Some(entry) => {
                        state.now = entry.due;
                        Some(entry)
                    }
                    None => None,
                }
            };
            let Some(mut entry) = entry else { break };
            if entry.owner.is_released() {
                continue;
            }

            let mut ctx = WorkContext::new(entry.due);
            (entry.work)(&mut ctx);

            if let Some(delay) = ctx.take_requeue() {
                let mut state = lock(&self.state);
                let seq = state.seq;
                state.seq += 1;
                state.queue.push(Entry {
                    due: entry.due.saturating_add(delay),
                    seq,
                    work: entry.work,
                    owner: entry.owner,
                });
            }
        }
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> u64 {
        lock(&self.state).now
    }

    fn schedule(&self, delay: u64, work: Work) -> Arc<Subscription> {
        let owner = Subscription::new();
        let mut state = lock(&self.state);
        let seq = state.seq;
        state.seq += 1;
        let due = state.now.saturating_add(delay);
        state.queue.push(Entry { due, seq, work, owner: Arc::clone(&owner) });
        owner
    }
}
