//! # Immediate (synchronous) scheduling.
//!
//! [`ImmediateScheduler`] runs work inline, within the call to
//! [`schedule`](crate::Scheduler::schedule). Delays are consumed as logical
//! time: the clock advances by the requested delay and the work runs right
//! away, so a reschedule chain executes as a synchronous loop. Observable
//! behavior is identical to the virtual-time mode after a flush; only the
//! *when* differs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::core::Subscription;
use crate::scheduler::{Scheduler, Work, WorkContext};

/// Scheduler that executes work synchronously at schedule time.
#[derive(Debug, Default)]
pub struct ImmediateScheduler {
    clock: AtomicU64,
}

impl ImmediateScheduler {
    /// Creates a scheduler with the logical clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self { clock: AtomicU64::new(0) }
    }
}

impl Scheduler for ImmediateScheduler {
    fn now(&self) -> u64 {
        self.clock.load(Ordering::SeqCst)
    }

    fn schedule(&self, delay: u64, mut work: Work) -> Arc<Subscription> {
        let owner = Subscription::new();
        let mut delay = delay;
        loop {
            if owner.is_released() {
                break;
            }
            let now = self.clock.fetch_add(delay, Ordering::SeqCst).saturating_add(delay);
            let mut ctx = WorkContext::new(now);
            work(&mut ctx);
            match ctx.take_requeue() {
                Some(next_delay) => delay = next_delay,
                None => break,
            }
        }
        owner
    }
}
