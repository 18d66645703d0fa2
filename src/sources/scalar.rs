//! # Scalar adapter: one value, then completion.
//!
//! Without a scheduler the value and the completion are delivered
//! synchronously inline. With a scheduler, emission is a two-phase
//! self-rescheduled work item: phase one delivers the value and checks the
//! subscriber before scheduling phase two, which delivers the completion.
//! The split exists so an unsubscription occurring between the phases
//! suppresses the completion notification.

use std::sync::Arc;

use crate::core::{Observable, Teardown};
use crate::scheduler::Scheduler;

/// Progress of one scheduled scalar emission.
enum ScalarPhase {
    Value,
    Done,
}

/// Observable emitting exactly one value, then completing.
pub fn scalar<T>(value: T, scheduler: Option<Arc<dyn Scheduler>>) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    Observable::create(move |subscriber| {
        match &scheduler {
            None => {
                subscriber.next(value.clone());
                if !subscriber.is_unsubscribed() {
                    subscriber.complete();
                }
                Ok(Teardown::None)
            }
            Some(scheduler) => {
                let mut phase = ScalarPhase::Value;
                let mut slot = Some(value.clone());
                let handle = scheduler.schedule(0, Box::new(move |ctx| match phase {
                    ScalarPhase::Value => {
                        if let Some(value) = slot.take() {
                            subscriber.next(value);
                        }
                        if subscriber.is_unsubscribed() {
                            return;
                        }
                        phase = ScalarPhase::Done;
                        ctx.reschedule(0);
                    }
                    ScalarPhase::Done => subscriber.complete(),
                }));
                Ok(Teardown::Subscription(handle))
            }
        }
    })
}
