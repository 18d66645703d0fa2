//! # Dispatch resolver: one adapter per source shape.
//!
//! [`from`] inspects a [`Source`] and selects exactly one adapter, matching
//! the variants in this precedence order, first match wins:
//!
//! 1. already observable — returned unchanged when no scheduler was
//!    requested (identity short-circuit), otherwise re-emitted through the
//!    scheduler;
//! 2. observable capability — generic capability bridge;
//! 3. native ordered sequence — array adapter;
//! 4. promise-like — future bridge;
//! 5. pull-based iteration (text included) — iterator bridge;
//! 6. numeric length plus index access — array-like adapter, the only arm
//!    the optional per-element transform applies to;
//! 7. anything else — rejected synchronously with
//!    [`EngineError::NotObservable`] naming the value's runtime type.
//!
//! ## Example
//! ```rust
//! use rivulet::{from, Source};
//!
//! let ok = from(Source::array(vec![1, 2, 3]), None);
//! assert!(ok.is_ok());
//!
//! let err = from(Source::<i32>::unsupported::<std::time::Duration>(), None).unwrap_err();
//! assert_eq!(err.as_label(), "dispatch_not_observable");
//! assert!(err.to_string().contains("Duration"));
//! ```

use std::sync::Arc;

use crate::core::Observable;
use crate::error::EngineError;
use crate::scheduler::Scheduler;
use crate::sources::{array, array_like, capability, future, iter, MapFn, Source};

/// Normalizes a source into an observable, without a transform.
pub fn from<T>(
    source: Source<T>,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> Result<Observable<T>, EngineError>
where
    T: Clone + Send + Sync + 'static,
{
    resolve(source, None, scheduler)
}

/// Normalizes a source into an observable with a per-element transform.
///
/// The transform applies to the array-like arm, mirroring the original
/// dispatch; other arms ignore it.
pub fn from_mapped<T>(
    source: Source<T>,
    map: impl Fn(T, usize) -> T + Send + Sync + 'static,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> Result<Observable<T>, EngineError>
where
    T: Clone + Send + Sync + 'static,
{
    resolve(source, Some(Arc::new(map)), scheduler)
}

fn resolve<T>(
    source: Source<T>,
    map: Option<MapFn<T>>,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> Result<Observable<T>, EngineError>
where
    T: Clone + Send + Sync + 'static,
{
    // Ordered to preserve the documented capability precedence.
    match source {
        Source::Observable(observable) => Ok(match scheduler {
            None => observable,
            Some(scheduler) => capability::observe_on(observable, scheduler),
        }),
        Source::Capability(source) => Ok(capability::capability(source, scheduler)),
        Source::Array(values) => Ok(array::array(values, scheduler)),
        Source::Future(settlement) => Ok(future::future(settlement, scheduler)),
        Source::Iter(factory) => Ok(iter::iter(factory, scheduler)),
        Source::ArrayLike(source) => Ok(array_like::array_like(source, map, scheduler)),
        Source::Unsupported { type_name } => Err(EngineError::NotObservable { type_name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::VirtualScheduler;
    use crate::sources::{IntoObservable, Source};
    use crate::testing::{notes, recorder, Note};

    #[test]
    fn test_observable_identity_short_circuit_without_scheduler() {
        let original = crate::sources::scalar::scalar(1, None);
        let resolved = from(Source::observable(original.clone()), None).unwrap();
        assert!(resolved.same_producer(&original));
    }

    #[test]
    fn test_observable_with_scheduler_is_wrapped_not_identity() {
        let scheduler = Arc::new(VirtualScheduler::new());
        let original = crate::sources::scalar::scalar(1, None);
        let resolved = from(
            Source::observable(original.clone()),
            Some(scheduler.clone() as Arc<dyn Scheduler>),
        )
        .unwrap();
        assert!(!resolved.same_producer(&original));

        let (rec, log) = recorder();
        resolved.subscribe(rec).unwrap();
        assert!(notes(&log).is_empty());
        scheduler.flush();
        assert_eq!(notes(&log), vec![Note::Next(1), Note::Complete]);
    }

    #[test]
    fn test_capability_arm_delegates() {
        struct Pair;
        impl IntoObservable<i32> for Pair {
            fn observable(&self) -> Observable<i32> {
                crate::sources::array::array(vec![1, 2], None)
            }
        }

        let resolved = from(Source::capability(Pair), None).unwrap();
        let (rec, log) = recorder();
        resolved.subscribe(rec).unwrap();
        assert_eq!(notes(&log), vec![Note::Next(1), Note::Next(2), Note::Complete]);
    }

    #[test]
    fn test_array_arm_emits_in_order() {
        let resolved = from(Source::array(vec![10, 20]), None).unwrap();
        let (rec, log) = recorder();
        resolved.subscribe(rec).unwrap();
        assert_eq!(notes(&log), vec![Note::Next(10), Note::Next(20), Note::Complete]);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_future_arm_bridges_settlement() {
        let resolved = from(Source::future(async { Ok(5) }), None).unwrap();
        let (rec, log) = recorder();
        resolved.subscribe(rec).unwrap();

        crate::testing::settled(|| notes(&log).len() == 2).await;
        assert_eq!(notes(&log), vec![Note::Next(5), Note::Complete]);
    }

    #[test]
    fn test_text_arm_emits_characters() {
        let resolved = from(Source::text("ok"), None).unwrap();
        let (rec, log) = recorder();
        resolved.subscribe(rec).unwrap();
        assert_eq!(notes(&log), vec![Note::Next('o'), Note::Next('k'), Note::Complete]);
    }

    #[test]
    fn test_array_like_arm_applies_transform() {
        let resolved = from_mapped(
            Source::array_like(vec![1, 2, 3]),
            |value, index| value + index as i32,
            None,
        )
        .unwrap();
        let (rec, log) = recorder();
        resolved.subscribe(rec).unwrap();
        assert_eq!(
            notes(&log),
            vec![Note::Next(1), Note::Next(3), Note::Next(5), Note::Complete]
        );
    }

    #[test]
    fn test_unsupported_is_rejected_with_type_name() {
        let err = from(Source::<i32>::unsupported::<std::net::TcpListener>(), None)
            .expect_err("must reject");
        match err {
            EngineError::NotObservable { type_name } => {
                assert!(type_name.contains("TcpListener"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
