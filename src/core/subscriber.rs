//! # Consumer-side wrapper enforcing terminal-notification discipline.
//!
//! [`Subscriber`] wraps a caller-supplied [`Observer`] and guarantees the
//! core delivery contract:
//!
//! - `next` is delivered only while the subscriber is not terminal;
//! - `error` and `complete` are mutually exclusive and delivered at most
//!   once, after which every further notification is inert;
//! - the linked [`Subscription`] is torn down exactly once on the terminal
//!   notification.
//!
//! ## Panic handling
//! Observer callbacks are caller code. A panic in `on_next` / `on_error` /
//! `on_complete` is caught with `catch_unwind`, reported through `tracing`,
//! and never corrupts the subscriber's state or re-enters the error
//! channel.
//!
//! ## Cloning
//! `Subscriber` is a cheap handle (`Arc` inner): producers move clones into
//! scheduled work items and spawned tasks. All clones share one terminal
//! flag and one subscription.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::core::{lock, Subscription};
use crate::error::FlowError;

/// Contract for notification consumers.
///
/// All methods default to no-ops so implementors only write the hooks they
/// care about. Called synchronously on the producer's control flow; avoid
/// blocking.
pub trait Observer<T>: Send {
    /// Handles the next produced value.
    fn on_next(&mut self, _value: T) {}

    /// Handles the terminal error notification.
    fn on_error(&mut self, _error: FlowError) {}

    /// Handles the terminal completion notification.
    fn on_complete(&mut self) {}
}

/// Closure-backed observer for the three-callback subscribe form.
///
/// ## Example
/// ```rust
/// use rivulet::{FnObserver, Observable, Teardown};
///
/// let source = Observable::create(|subscriber| {
///     subscriber.next(7);
///     subscriber.complete();
///     Ok(Teardown::None)
/// });
///
/// source
///     .subscribe(
///         FnObserver::new()
///             .next(|value: i32| assert_eq!(value, 7))
///             .complete(|| {}),
///     )
///     .unwrap();
/// ```
#[derive(Default)]
pub struct FnObserver<T> {
    next: Option<Box<dyn FnMut(T) + Send>>,
    error: Option<Box<dyn FnMut(FlowError) + Send>>,
    complete: Option<Box<dyn FnMut() + Send>>,
}

impl<T> FnObserver<T> {
    /// Creates an observer with no callbacks attached.
    #[must_use]
    pub fn new() -> Self {
        Self { next: None, error: None, complete: None }
    }

    /// Sets the value callback.
    #[must_use]
    pub fn next(mut self, f: impl FnMut(T) + Send + 'static) -> Self {
        self.next = Some(Box::new(f));
        self
    }

    /// Sets the error callback.
    #[must_use]
    pub fn error(mut self, f: impl FnMut(FlowError) + Send + 'static) -> Self {
        self.error = Some(Box::new(f));
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.complete = Some(Box::new(f));
        self
    }
}

impl<T: Send> Observer<T> for FnObserver<T> {
    fn on_next(&mut self, value: T) {
        if let Some(f) = self.next.as_mut() {
            f(value);
        }
    }

    fn on_error(&mut self, error: FlowError) {
        if let Some(f) = self.error.as_mut() {
            f(error);
        }
    }

    fn on_complete(&mut self) {
        if let Some(f) = self.complete.as_mut() {
            f();
        }
    }
}

struct Inner<T> {
    stopped: AtomicBool,
    subscription: Arc<Subscription>,
    observer: Mutex<Box<dyn Observer<T> + Send>>,
}

/// Observer wrapper owning the at-most-one-terminal contract.
///
/// Ownership-linked to exactly one [`Subscription`] for its lifetime.
/// Producers check [`is_unsubscribed`](Subscriber::is_unsubscribed) before
/// doing further work: cancellation is cooperative, not preemptive.
pub struct Subscriber<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Subscriber<T> {
    /// Wraps an observer with a fresh subscription.
    pub fn new(observer: impl Observer<T> + 'static) -> Self {
        Self::with_subscription(observer, Subscription::new())
    }

    /// Wraps an observer chained onto an existing subscription.
    ///
    /// Used by adapters that forward through a destination subscriber: the
    /// forwarding stage shares the destination's cancellation lifetime.
    pub fn with_subscription(
        observer: impl Observer<T> + 'static,
        subscription: Arc<Subscription>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                stopped: AtomicBool::new(false),
                subscription,
                observer: Mutex::new(Box::new(observer)),
            }),
        }
    }

    /// The subscription this subscriber tears down on its terminal
    /// notification.
    pub fn subscription(&self) -> &Arc<Subscription> {
        &self.inner.subscription
    }

    /// `true` once the subscriber went terminal or its subscription was
    /// released externally. Producers must stop pushing when this is set.
    pub fn is_unsubscribed(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst) || self.inner.subscription.is_released()
    }

    /// Delivers a value unless the subscriber is terminal or released.
    pub fn next(&self, value: T) {
        if self.is_unsubscribed() {
            return;
        }
        let mut observer = lock(&self.inner.observer);
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.on_next(value))) {
            tracing::error!(panic = %panic_message(&*payload), "observer on_next panicked");
        }
    }

    /// Delivers the terminal error, then tears down the subscription.
    ///
    /// At most one terminal notification is ever delivered; later calls
    /// (and calls after an external release) are inert.
    pub fn error(&self, error: FlowError) {
        if self.inner.subscription.is_released() {
            self.inner.stopped.store(true, Ordering::SeqCst);
            return;
        }
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        {
            let mut observer = lock(&self.inner.observer);
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.on_error(error))) {
                tracing::error!(panic = %panic_message(&*payload), "observer on_error panicked");
            }
        }
        self.teardown();
    }

    /// Delivers the terminal completion, then tears down the subscription.
    pub fn complete(&self) {
        if self.inner.subscription.is_released() {
            self.inner.stopped.store(true, Ordering::SeqCst);
            return;
        }
        if self.inner.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        {
            let mut observer = lock(&self.inner.observer);
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| observer.on_complete())) {
                tracing::error!(panic = %panic_message(&*payload), "observer on_complete panicked");
            }
        }
        self.teardown();
    }

    fn teardown(&self) {
        if let Err(err) = self.inner.subscription.unsubscribe() {
            // Terminal notifications have no caller to return this to.
            tracing::error!(error = %err, "teardown failed after terminal notification");
        }
    }
}

/// A subscriber forwards notifications it receives as an observer, which is
/// how adapters chain a transforming stage onto a destination subscriber.
impl<T: Send> Observer<T> for Subscriber<T> {
    fn on_next(&mut self, value: T) {
        self.next(value);
    }

    fn on_error(&mut self, error: FlowError) {
        self.error(error);
    }

    fn on_complete(&mut self) {
        self.complete();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{notes, recorder, Note};

    #[test]
    fn test_next_then_complete_in_order() {
        let (rec, log) = recorder::<i32>();
        let subscriber = Subscriber::new(rec);
        subscriber.next(1);
        subscriber.next(2);
        subscriber.complete();

        assert_eq!(notes(&log), vec![Note::Next(1), Note::Next(2), Note::Complete]);
    }

    #[test]
    fn test_nothing_delivered_after_complete() {
        let (rec, log) = recorder::<i32>();
        let subscriber = Subscriber::new(rec);
        subscriber.complete();
        subscriber.next(1);
        subscriber.error(FlowError::producer("late"));
        subscriber.complete();

        assert_eq!(notes(&log), vec![Note::Complete]);
    }

    #[test]
    fn test_nothing_delivered_after_error() {
        let (rec, log) = recorder::<i32>();
        let subscriber = Subscriber::new(rec);
        subscriber.error(FlowError::producer("boom"));
        subscriber.next(1);
        subscriber.complete();

        assert_eq!(notes(&log), vec![Note::Error(FlowError::producer("boom"))]);
    }

    #[test]
    fn test_terminal_notification_tears_down_subscription_once() {
        let (rec, _log) = recorder::<i32>();
        let subscriber = Subscriber::new(rec);
        assert!(!subscriber.subscription().is_released());

        subscriber.complete();
        assert!(subscriber.subscription().is_released());
        assert!(subscriber.is_unsubscribed());
    }

    #[test]
    fn test_external_release_makes_delivery_inert() {
        let (rec, log) = recorder::<i32>();
        let subscriber = Subscriber::new(rec);
        subscriber.subscription().unsubscribe().unwrap();

        subscriber.next(1);
        subscriber.error(FlowError::producer("boom"));
        subscriber.complete();
        assert!(notes(&log).is_empty());
    }

    #[test]
    fn test_panicking_on_next_does_not_corrupt_state() {
        let (rec, log) = recorder::<i32>();
        let panicked = std::sync::atomic::AtomicBool::new(false);

        struct Panicky<T> {
            inner: crate::testing::Recorder<T>,
            armed: std::sync::atomic::AtomicBool,
        }
        impl Observer<i32> for Panicky<i32> {
            fn on_next(&mut self, value: i32) {
                if !self.armed.swap(true, Ordering::SeqCst) {
                    panic!("first value rejected");
                }
                self.inner.on_next(value);
            }
            fn on_complete(&mut self) {
                self.inner.on_complete();
            }
        }

        let subscriber = Subscriber::new(Panicky { inner: rec, armed: panicked });
        subscriber.next(1); // panics inside the observer, caught
        subscriber.next(2);
        subscriber.complete();

        assert_eq!(notes(&log), vec![Note::Next(2), Note::Complete]);
    }
}
