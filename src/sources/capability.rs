//! # Generic capability bridge.
//!
//! Delegates to a source that already exposes the observable capability (a
//! zero-argument method returning an observable). Without a scheduler the
//! inner observable is subscribed directly through the outer subscriber;
//! with one, every notification is re-emitted through a time-shifting
//! forwarding stage scheduled at delay zero, so delivery order follows the
//! scheduler's queue instead of the inner producer's call stack.

use std::sync::Arc;

use crate::core::{Observable, Observer, Subscriber, Teardown};
use crate::error::FlowError;
use crate::scheduler::Scheduler;
use crate::sources::IntoObservable;

/// Forwarding observer that re-emits each notification via the scheduler.
struct ScheduledForward<T> {
    dest: Subscriber<T>,
    scheduler: Arc<dyn Scheduler>,
}

impl<T: Send + 'static> Observer<T> for ScheduledForward<T> {
    fn on_next(&mut self, value: T) {
        let dest = self.dest.clone();
        let mut slot = Some(value);
        self.scheduler.schedule(0, Box::new(move |_| {
            if let Some(value) = slot.take() {
                dest.next(value);
            }
        }));
    }

    fn on_error(&mut self, error: FlowError) {
        let dest = self.dest.clone();
        let mut slot = Some(error);
        self.scheduler.schedule(0, Box::new(move |_| {
            if let Some(error) = slot.take() {
                dest.error(error);
            }
        }));
    }

    fn on_complete(&mut self) {
        let dest = self.dest.clone();
        self.scheduler.schedule(0, Box::new(move |_| {
            dest.complete();
        }));
    }
}

/// Subscribes `inner` through `subscriber`, inserting the scheduled
/// forwarding stage when a scheduler is present.
///
/// The forwarding stage owns a *child* subscription of the destination:
/// releasing the destination cancels the inner producer, while the inner
/// producer completing tears down only its own stage — notifications
/// already queued on the scheduler still reach the destination.
pub(crate) fn subscribe_via<T>(
    inner: &Observable<T>,
    subscriber: Subscriber<T>,
    scheduler: &Option<Arc<dyn Scheduler>>,
) -> Result<(), FlowError>
where
    T: Send + 'static,
{
    match scheduler {
        None => inner.subscribe_subscriber(subscriber),
        Some(scheduler) => {
            let forward = Subscriber::new(ScheduledForward {
                dest: subscriber.clone(),
                scheduler: Arc::clone(scheduler),
            });
            subscriber
                .subscription()
                .add(Teardown::Subscription(Arc::clone(forward.subscription())));
            inner.subscribe_subscriber(forward)
        }
    }
}

/// Observable delegating to a source exposing the observable capability.
pub fn capability<T>(
    source: Arc<dyn IntoObservable<T>>,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    Observable::create(move |subscriber| {
        let inner = source.observable();
        subscribe_via(&inner, subscriber, &scheduler)?;
        Ok(Teardown::None)
    })
}

/// Re-emits an existing observable through a scheduler.
///
/// Used by the dispatch resolver when an observable input arrives together
/// with a scheduler, where the identity short-circuit does not apply.
pub fn observe_on<T>(inner: Observable<T>, scheduler: Arc<dyn Scheduler>) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let scheduler = Some(scheduler);
    Observable::create(move |subscriber| {
        subscribe_via(&inner, subscriber, &scheduler)?;
        Ok(Teardown::None)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;
    use crate::sources::scalar::scalar;
    use crate::testing::{notes, recorder, Note};

    struct Wrapped(i32);
    impl IntoObservable<i32> for Wrapped {
        fn observable(&self) -> Observable<i32> {
            scalar(self.0, None)
        }
    }

    #[test]
    fn test_delegates_to_inner_observable() {
        let source = capability(Arc::new(Wrapped(4)), None);
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert_eq!(notes(&log), vec![Note::Next(4), Note::Complete]);
    }

    #[test]
    fn test_scheduler_time_shifts_every_notification() {
        let scheduler = Arc::new(VirtualScheduler::new());
        let source = capability(
            Arc::new(Wrapped(4)),
            Some(scheduler.clone() as Arc<dyn Scheduler>),
        );
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();

        // The inner producer emitted synchronously, but delivery is queued.
        assert!(notes(&log).is_empty());
        scheduler.flush();
        assert_eq!(notes(&log), vec![Note::Next(4), Note::Complete]);
    }

    #[test]
    fn test_observe_on_defers_an_existing_observable() {
        let scheduler = Arc::new(VirtualScheduler::new());
        let source = observe_on(scalar(1, None), scheduler.clone() as Arc<dyn Scheduler>);
        let (rec, log) = recorder();
        let subscription = source.subscribe(rec).unwrap();

        subscription.unsubscribe().unwrap();
        scheduler.flush();
        assert!(notes(&log).is_empty());
    }
}
