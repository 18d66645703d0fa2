//! # Iterator bridge: pull-based sequences behind the push contract.
//!
//! Pulls successive values until the iterator is exhausted, respecting
//! cancellation between pulls. The adapter holds a *factory* rather than an
//! iterator: each subscription pulls a fresh instance, which is what keeps
//! the source cold. Text is bridged as a character sequence via
//! [`Source::text`](crate::Source::text).

use std::sync::Arc;

use crate::core::{Observable, Teardown};
use crate::scheduler::Scheduler;
use crate::sources::IterFactory;

/// Observable draining a fresh iterator per subscription.
pub fn iter<T>(factory: IterFactory<T>, scheduler: Option<Arc<dyn Scheduler>>) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    Observable::create(move |subscriber| {
        let mut iterator = (*factory)();
        match &scheduler {
            None => {
                loop {
                    if subscriber.is_unsubscribed() {
                        return Ok(Teardown::None);
                    }
                    match iterator.next() {
                        Some(value) => subscriber.next(value),
                        None => break,
                    }
                }
                if !subscriber.is_unsubscribed() {
                    subscriber.complete();
                }
                Ok(Teardown::None)
            }
            Some(scheduler) => {
                let handle = scheduler.schedule(0, Box::new(move |ctx| {
                    match iterator.next() {
                        Some(value) => {
                            subscriber.next(value);
                            if !subscriber.is_unsubscribed() {
                                ctx.reschedule(0);
                            }
                        }
                        None => subscriber.complete(),
                    }
                }));
                Ok(Teardown::Subscription(handle))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;
    use crate::sources::Source;
    use crate::testing::{notes, recorder, Note};

    fn counting_factory() -> IterFactory<i32> {
        Arc::new(|| Box::new(1..=3))
    }

    #[test]
    fn test_drains_iterator_then_completes() {
        let source = iter(counting_factory(), None);
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert_eq!(
            notes(&log),
            vec![Note::Next(1), Note::Next(2), Note::Next(3), Note::Complete]
        );
    }

    #[test]
    fn test_factory_keeps_the_source_cold() {
        let source = iter(counting_factory(), None);
        let (rec1, log1) = recorder();
        let (rec2, log2) = recorder();
        source.subscribe(rec1).unwrap();
        source.subscribe(rec2).unwrap();
        // A second subscription drains a fresh iterator, not leftovers.
        assert_eq!(notes(&log1), notes(&log2));
    }

    #[test]
    fn test_text_is_a_character_sequence() {
        let source = match Source::text("hi") {
            Source::Iter(factory) => iter(factory, None),
            _ => panic!("text must map to the iterator bridge"),
        };
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert_eq!(
            notes(&log),
            vec![Note::Next('h'), Note::Next('i'), Note::Complete]
        );
    }

    #[test]
    fn test_scheduled_pulls_respect_cancellation() {
        let scheduler = Arc::new(VirtualScheduler::new());
        let source = iter(counting_factory(), Some(scheduler.clone() as Arc<dyn Scheduler>));
        let (rec, log) = recorder();
        let subscription = source.subscribe(rec).unwrap();
        subscription.unsubscribe().unwrap();

        scheduler.flush();
        assert!(notes(&log).is_empty());
    }
}
