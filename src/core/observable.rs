//! # The lazy producer abstraction.
//!
//! An [`Observable`] is an immutable description of how to produce a
//! sequence of values: it holds a subscribe-time function and nothing else.
//! Production starts only when [`subscribe`](Observable::subscribe) runs
//! that function — strictly lazy, cold by default. Every subscription is an
//! independent execution; nothing is shared unless an adapter explicitly
//! caches (see [`bind_callback`](crate::bind_callback)).
//!
//! ## Error asymmetry
//! If the subscribe-time function fails, the failure is delivered as an
//! error notification to the new subscriber — unless the subscriber is
//! already terminal, in which case there is no channel left and the error
//! returns to the caller of `subscribe`. Tests rely on this asymmetry.
//!
//! ## Example
//! ```rust
//! use rivulet::{FnObserver, Observable, Teardown};
//!
//! let source = Observable::create(|subscriber| {
//!     for i in 0..3 {
//!         subscriber.next(i);
//!     }
//!     subscriber.complete();
//!     Ok(Teardown::None)
//! });
//!
//! // Each subscription runs the producer from scratch.
//! source
//!     .subscribe(
//!         FnObserver::new()
//!             .next(|v: i32| println!("got {v}"))
//!             .complete(|| println!("done")),
//!     )
//!     .unwrap();
//! source.subscribe_next(|v: i32| assert!(v < 3)).unwrap();
//! ```

use std::sync::Arc;

use crate::core::{Observer, Subscriber, Subscription, Teardown};
use crate::error::FlowError;

/// Subscribe-time side-effect function of an [`Observable`].
pub type SubscribeFn<T> =
    dyn Fn(Subscriber<T>) -> Result<Teardown, FlowError> + Send + Sync;

/// Lazy, cold description of a producible sequence of `T`.
pub struct Observable<T> {
    subscribe_fn: Arc<SubscribeFn<T>>,
}

impl<T> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self { subscribe_fn: Arc::clone(&self.subscribe_fn) }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// The sole generic constructor for bespoke producers.
    ///
    /// The function runs once per subscription with a fresh [`Subscriber`].
    /// Its returned [`Teardown`] is attached to the subscriber's
    /// subscription; return [`Teardown::None`] when there is nothing to
    /// release.
    pub fn create(
        subscribe_fn: impl Fn(Subscriber<T>) -> Result<Teardown, FlowError> + Send + Sync + 'static,
    ) -> Self {
        Self { subscribe_fn: Arc::new(subscribe_fn) }
    }

    /// Subscribes an observer, starting an independent execution.
    ///
    /// Returns the [`Subscription`] as the cancellation handle. The only
    /// `Err` case is a subscribe-time failure occurring after the
    /// subscriber already went terminal (see the module docs).
    pub fn subscribe(
        &self,
        observer: impl Observer<T> + 'static,
    ) -> Result<Arc<Subscription>, FlowError> {
        let subscriber = Subscriber::new(observer);
        let subscription = Arc::clone(subscriber.subscription());
        self.subscribe_subscriber(subscriber)?;
        Ok(subscription)
    }

    /// Shorthand for subscribing with only a value callback.
    pub fn subscribe_next(
        &self,
        on_next: impl FnMut(T) + Send + 'static,
    ) -> Result<Arc<Subscription>, FlowError> {
        self.subscribe(crate::core::FnObserver::new().next(on_next))
    }

    /// Runs the producer against an existing subscriber.
    ///
    /// Adapters use this to chain a forwarding stage through a destination
    /// subscriber without allocating a second subscription.
    pub(crate) fn subscribe_subscriber(&self, subscriber: Subscriber<T>) -> Result<(), FlowError> {
        match (*self.subscribe_fn)(subscriber.clone()) {
            Ok(teardown) => {
                subscriber.subscription().add(teardown);
                Ok(())
            }
            Err(err) => {
                if subscriber.is_unsubscribed() {
                    Err(err)
                } else {
                    subscriber.error(err);
                    Ok(())
                }
            }
        }
    }

    /// `true` when both handles describe the same producer.
    ///
    /// The dispatch resolver returns its input unchanged when no scheduler
    /// is requested; this is how that identity is observable.
    pub fn same_producer(&self, other: &Observable<T>) -> bool {
        Arc::ptr_eq(&self.subscribe_fn, &other.subscribe_fn)
    }
}
