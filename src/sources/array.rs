//! # Sequence-from-array adapter.
//!
//! Emits each element in index order, then completes. Cancellation is
//! checked between elements, never mid-delivery: releasing the
//! subscription stops the sequence at the next boundary.

use std::sync::Arc;

use crate::core::{Observable, Teardown};
use crate::scheduler::Scheduler;

/// Observable emitting the elements of `values` in order, then completing.
pub fn array<T>(values: Vec<T>, scheduler: Option<Arc<dyn Scheduler>>) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    let values = Arc::new(values);
    Observable::create(move |subscriber| match &scheduler {
        None => {
            for value in values.iter() {
                if subscriber.is_unsubscribed() {
                    return Ok(Teardown::None);
                }
                subscriber.next(value.clone());
            }
            if !subscriber.is_unsubscribed() {
                subscriber.complete();
            }
            Ok(Teardown::None)
        }
        Some(scheduler) => {
            let values = Arc::clone(&values);
            let mut index = 0usize;
            let handle = scheduler.schedule(0, Box::new(move |ctx| {
                match values.get(index) {
                    Some(value) => {
                        subscriber.next(value.clone());
                        index += 1;
                        if !subscriber.is_unsubscribed() {
                            ctx.reschedule(0);
                        }
                    }
                    None => subscriber.complete(),
                }
            }));
            Ok(Teardown::Subscription(handle))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;
    use crate::testing::{notes, recorder, Note};

    #[test]
    fn test_emits_in_index_order_then_completes() {
        let source = array(vec![1, 2, 3], None);
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert_eq!(
            notes(&log),
            vec![Note::Next(1), Note::Next(2), Note::Next(3), Note::Complete]
        );
    }

    #[test]
    fn test_empty_array_completes_immediately() {
        let source: Observable<i32> = array(vec![], None);
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert_eq!(notes(&log), vec![Note::Complete]);
    }

    #[test]
    fn test_scheduled_emission_waits_for_flush() {
        let scheduler = Arc::new(VirtualScheduler::new());
        let source = array(vec![1, 2], Some(scheduler.clone() as Arc<dyn Scheduler>));
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert!(notes(&log).is_empty());

        scheduler.flush();
        assert_eq!(notes(&log), vec![Note::Next(1), Note::Next(2), Note::Complete]);
    }

    #[test]
    fn test_unsubscribe_stops_scheduled_sequence() {
        let scheduler = Arc::new(VirtualScheduler::new());
        let source = array(vec![1, 2, 3], Some(scheduler.clone() as Arc<dyn Scheduler>));
        let (rec, log) = recorder();
        let subscription = source.subscribe(rec).unwrap();
        subscription.unsubscribe().unwrap();

        scheduler.flush();
        assert!(notes(&log).is_empty());
    }

    #[test]
    fn test_each_subscription_replays_from_the_start() {
        let source = array(vec![9, 8], None);
        let (rec1, log1) = recorder();
        let (rec2, log2) = recorder();
        source.subscribe(rec1).unwrap();
        source.subscribe(rec2).unwrap();
        assert_eq!(notes(&log1), notes(&log2));
        assert_eq!(notes(&log1), vec![Note::Next(9), Note::Next(8), Note::Complete]);
    }
}
