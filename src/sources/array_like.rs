//! # Array-like adapter: numeric length plus index access.
//!
//! Emits `source.get(0) .. source.get(len - 1)` in order, optionally
//! through a per-element transform, then completes. A `get` returning
//! `None` inside the declared range is a producer failure. Cancellation is
//! checked between elements when scheduled.

use std::sync::Arc;

use crate::core::{Observable, Subscriber, Teardown};
use crate::error::FlowError;
use crate::scheduler::Scheduler;
use crate::sources::{ArrayLike, MapFn};

/// One element step: `true` to keep going, `false` when a missing element
/// terminated the sequence with a producer error.
fn emit_at<T>(
    source: &Arc<dyn ArrayLike<T>>,
    map: &Option<MapFn<T>>,
    subscriber: &Subscriber<T>,
    index: usize,
) -> bool
where
    T: Send + 'static,
{
    match source.get(index) {
        Some(raw) => {
            let value = match map {
                Some(map) => (**map)(raw, index),
                None => raw,
            };
            subscriber.next(value);
            true
        }
        None => {
            subscriber.error(FlowError::producer(format!(
                "array-like source has length {} but no element at index {index}",
                source.len()
            )));
            false
        }
    }
}

/// Observable over an array-like source, with an optional per-element
/// transform.
pub fn array_like<T>(
    source: Arc<dyn ArrayLike<T>>,
    map: Option<MapFn<T>>,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    Observable::create(move |subscriber| match &scheduler {
        None => {
            let len = source.len();
            for index in 0..len {
                if subscriber.is_unsubscribed() {
                    return Ok(Teardown::None);
                }
                if !emit_at(&source, &map, &subscriber, index) {
                    return Ok(Teardown::None);
                }
            }
            if !subscriber.is_unsubscribed() {
                subscriber.complete();
            }
            Ok(Teardown::None)
        }
        Some(scheduler) => {
            let source = Arc::clone(&source);
            let map = map.clone();
            let mut index = 0usize;
            let handle = scheduler.schedule(0, Box::new(move |ctx| {
                if index >= source.len() {
                    subscriber.complete();
                    return;
                }
                if emit_at(&source, &map, &subscriber, index) {
                    index += 1;
                    if !subscriber.is_unsubscribed() {
                        ctx.reschedule(0);
                    }
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

    /// Array-like without being a `Vec`: a half-open integer range.
    struct Span {
        start: i32,
        count: usize,
    }
    impl ArrayLike<i32> for Span {
        fn len(&self) -> usize {
            self.count
        }
        fn get(&self, index: usize) -> Option<i32> {
            (index < self.count).then(|| self.start + index as i32)
        }
    }

    #[test]
    fn test_emits_indexed_elements_then_completes() {
        let source = array_like(Arc::new(Span { start: 10, count: 3 }), None, None);
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert_eq!(
            notes(&log),
            vec![Note::Next(10), Note::Next(11), Note::Next(12), Note::Complete]
        );
    }

    #[test]
    fn test_transform_receives_element_and_index() {
        let map: MapFn<i32> = Arc::new(|value, index| value * 10 + index as i32);
        let source = array_like(Arc::new(vec![1, 2]), Some(map), None);
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        assert_eq!(notes(&log), vec![Note::Next(10), Note::Next(21), Note::Complete]);
    }

    #[test]
    fn test_missing_element_is_a_producer_error() {
        /// Lies about its length.
        struct Short;
        impl ArrayLike<i32> for Short {
            fn len(&self) -> usize {
                2
            }
            fn get(&self, index: usize) -> Option<i32> {
                (index == 0).then_some(1)
            }
        }

        let source = array_like(Arc::new(Short), None, None);
        let (rec, log) = recorder();
        source.subscribe(rec).unwrap();
        let log = notes(&log);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], Note::Next(1));
        assert!(matches!(log[1], Note::Error(FlowError::Producer { .. })));
    }

    #[test]
    fn test_scheduled_emission_is_cancellable_between_elements() {
        let scheduler = Arc::new(VirtualScheduler::new());
        let source = array_like(
            Arc::new(vec![1, 2, 3]),
            None,
            Some(scheduler.clone() as Arc<dyn Scheduler>),
        );
        let (rec, log) = recorder();
        let subscription = source.subscribe(rec).unwrap();
        subscription.unsubscribe().unwrap();

        scheduler.flush();
        assert!(notes(&log).is_empty());
    }
}
