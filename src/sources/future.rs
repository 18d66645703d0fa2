//! # Promise bridge: one asynchronous settlement as an observable.
//!
//! Wraps a future settling to `Result<T, FlowError>`. On fulfillment the
//! value is emitted and the observable completes; on rejection the error is
//! emitted. If the subscription is released before settlement, nothing is
//! ever delivered.
//!
//! The future is made [`Shared`] at construction: like a promise, it is a
//! single settlement observed by every subscription rather than re-run per
//! subscriber. Each subscription spawns a task racing that shared
//! settlement against the subscription's cancellation token.
//!
//! Subscribing requires a running tokio runtime.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::core::{Observable, Subscriber, Teardown};
use crate::error::FlowError;
use crate::scheduler::Scheduler;

/// Observable bridging one asynchronous result.
pub fn future<T>(
    future: BoxFuture<'static, Result<T, FlowError>>,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    let settlement: Shared<BoxFuture<'static, Result<T, FlowError>>> = future.shared();
    Observable::create(move |subscriber| {
        let settlement = settlement.clone();
        let scheduler = scheduler.clone();
        let token = subscriber.subscription().cancellation_token();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                outcome = settlement => deliver(subscriber, outcome, scheduler),
            }
        });
        Ok(Teardown::None)
    })
}

/// Routes the settlement to the subscriber, through the scheduler if one
/// was supplied.
fn deliver<T: Send + 'static>(
    subscriber: Subscriber<T>,
    outcome: Result<T, FlowError>,
    scheduler: Option<Arc<dyn Scheduler>>,
) {
    match scheduler {
        None => deliver_now(&subscriber, outcome),
        Some(scheduler) => {
            let mut slot = Some(outcome);
            scheduler.schedule(0, Box::new(move |_| {
                if let Some(outcome) = slot.take() {
                    deliver_now(&subscriber, outcome);
                }
            }));
        }
    }
}

fn deliver_now<T>(subscriber: &Subscriber<T>, outcome: Result<T, FlowError>) {
    match outcome {
        Ok(value) => {
            subscriber.next(value);
            if !subscriber.is_unsubscribed() {
                subscriber.complete();
            }
        }
        Err(err) => subscriber.error(err),
    }
}
