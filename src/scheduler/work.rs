//! # Scheduler contract and work items.
//!
//! A work item is a boxed `FnMut` driven by the scheduler. Multi-step,
//! cancellable-at-any-step emission is expressed by *rescheduling*: the
//! work calls [`WorkContext::reschedule`] and the scheduler re-enqueues the
//! same closure as a fresh queue entry, carrying its progress state in the
//! closure's captures. Releasing the [`Subscription`] returned by
//! [`Scheduler::schedule`] cancels the item and every future step of its
//! reschedule chain.
//!
//! ## Example
//! ```rust
//! use rivulet::{Scheduler, VirtualScheduler};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! let scheduler = VirtualScheduler::new();
//! let steps = Arc::new(AtomicU64::new(0));
//! let counted = Arc::clone(&steps);
//!
//! scheduler.schedule(10, Box::new(move |ctx| {
//!     if counted.fetch_add(1, Ordering::SeqCst) < 2 {
//!         ctx.reschedule(5); // two more steps at +5 ticks each
//!     }
//! }));
//!
//! assert_eq!(steps.load(Ordering::SeqCst), 0); // nothing ran yet
//! scheduler.flush();
//! assert_eq!(steps.load(Ordering::SeqCst), 3);
//! assert_eq!(scheduler.now(), 20);
//! ```

use std::sync::Arc;

use crate::core::Subscription;

/// A schedulable unit of work.
pub type Work = Box<dyn FnMut(&mut WorkContext) + Send>;

/// Execution context handed to a running work item.
pub struct WorkContext {
    now: u64,
    requeue: Option<u64>,
}

impl WorkContext {
    pub(crate) fn new(now: u64) -> Self {
        Self { now, requeue: None }
    }

    /// Logical time at which this step runs.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Requests that this work item run again after `delay` logical-time
    /// units, as a fresh queue entry owned by the same subscription.
    ///
    /// The last call wins if invoked more than once in a single step.
    pub fn reschedule(&mut self, delay: u64) {
        self.requeue = Some(delay);
    }

    pub(crate) fn take_requeue(&mut self) -> Option<u64> {
        self.requeue.take()
    }
}

/// Logical clock plus work queue.
///
/// `schedule` enqueues `work` to run after `delay` logical-time units and
/// returns a [`Subscription`] that, if released before execution, prevents
/// the work (and any rescheduled step of it) from running. Work items
/// execute in non-decreasing due-time order with enqueue order as
/// tie-break.
pub trait Scheduler: Send + Sync {
    /// Current logical time.
    fn now(&self) -> u64;

    /// Enqueues a work item; the returned subscription cancels it.
    fn schedule(&self, delay: u64, work: Work) -> Arc<Subscription>;
}
