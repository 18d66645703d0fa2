//! # Callback bridge (`bind_callback`).
//!
//! Converts a callback-accepting function into a *factory*: each factory
//! call returns an observable that, on first subscription, invokes the
//! wrapped function with the factory's arguments plus an injected
//! completion callback ([`Done`]). The single result is emitted, then the
//! observable completes.
//!
//! ## Rules
//! - **Lazy**: the wrapped function runs on first subscription, not when
//!   the factory is called.
//! - **Cached per factory call**: later subscriptions to the *same*
//!   returned observable replay the settled outcome (or join the in-flight
//!   invocation); the wrapped function is invoked at most once per factory
//!   call. Separate factory calls are independent.
//! - **Shared in-flight invocation**: a subscriber arriving after an
//!   earlier subscriber unsubscribed joins the pending invocation and
//!   receives the eventual outcome. An unsubscribed subscriber receives
//!   nothing, ever.
//! - **Argument aggregation**: one reported argument is emitted as-is
//!   ([`CallbackValue::Single`]); several are emitted as one ordered
//!   sequence ([`CallbackValue::Sequence`]).
//! - **Errors**: an `Err` returned by the wrapped function, or by the
//!   selector, is delivered as an error notification — and cached, so late
//!   subscribers replay it instead of re-invoking.
//! - **Scheduling**: with a scheduler, every delivery is routed through
//!   `schedule(0, ..)`; without one, delivery is synchronous within the
//!   completion callback's invocation.
//!
//! ## Example
//! ```rust
//! use rivulet::{bind_callback, CallbackValue, Done, FnObserver};
//!
//! let bound = bind_callback(
//!     |datum: i32, done: Done<i32>| {
//!         done.resolve(datum);
//!         Ok(())
//!     },
//!     None,
//! );
//!
//! let source = bound(42);
//! source
//!     .subscribe(
//!         FnObserver::new()
//!             .next(|value| assert_eq!(value, CallbackValue::Single(42)))
//!             .complete(|| {}),
//!     )
//!     .unwrap();
//! ```

use std::sync::{Arc, Mutex};

use crate::core::{lock, Observable, Subscriber, Teardown};
use crate::error::FlowError;
use crate::scheduler::Scheduler;

/// Value delivered by a bridged callback invocation.
///
/// A callback reporting exactly one argument maps to `Single`; a callback
/// reporting several maps to `Sequence`, preserving order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackValue<T> {
    /// The callback reported exactly one argument.
    Single(T),
    /// The callback reported zero or several arguments.
    Sequence(Vec<T>),
}

/// Injected completion callback handed to the wrapped function.
///
/// Resolution is at-most-once: the first `resolve`/`resolve_all` settles
/// the invocation, later calls (and later clones) are ignored. `Done` is
/// `Send`, so the wrapped function may stash it and fire it from another
/// task.
pub struct Done<T> {
    settle: Arc<Mutex<Option<Box<dyn FnOnce(Vec<T>) + Send>>>>,
}

impl<T> Clone for Done<T> {
    fn clone(&self) -> Self {
        Self { settle: Arc::clone(&self.settle) }
    }
}

impl<T> Done<T> {
    fn new(settle: impl FnOnce(Vec<T>) + Send + 'static) -> Self {
        Self { settle: Arc::new(Mutex::new(Some(Box::new(settle)))) }
    }

    /// Reports a single result argument.
    pub fn resolve(self, value: T) {
        self.resolve_all(vec![value]);
    }

    /// Reports all result arguments in order.
    pub fn resolve_all(self, values: Vec<T>) {
        let settle = lock(&self.settle).take();
        if let Some(settle) = settle {
            settle(values);
        }
    }
}

/// Selector projecting the collected callback arguments into the emitted
/// value.
type Project<T, U> = Arc<dyn Fn(Vec<T>) -> Result<U, FlowError> + Send + Sync>;

/// Per-factory-call cache slot.
enum Slot<U> {
    Idle,
    Pending { waiters: Vec<Subscriber<U>> },
    Settled(Result<U, FlowError>),
}

struct CallState<U> {
    slot: Mutex<Slot<U>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

/// Binds a callback-accepting function into an observable factory.
///
/// The wrapped function receives the factory's argument bundle plus a
/// [`Done`]; an `Err` return is delivered as an error notification.
/// Collected callback arguments are aggregated per [`CallbackValue`].
pub fn bind_callback<A, T, F>(
    function: F,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> impl Fn(A) -> Observable<CallbackValue<T>>
where
    A: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    F: Fn(A, Done<T>) -> Result<(), FlowError> + Send + Sync + 'static,
{
    let function = Arc::new(function);
    move |args: A| {
        let aggregate: Project<T, CallbackValue<T>> = Arc::new(|mut values: Vec<T>| {
            if values.len() == 1 {
                if let Some(value) = values.pop() {
                    return Ok(CallbackValue::Single(value));
                }
            }
            Ok(CallbackValue::Sequence(values))
        });
        bound(Arc::clone(&function), args, aggregate, scheduler.clone())
    }
}

/// Like [`bind_callback`], but projects the collected arguments through a
/// selector; the selector's `Err` is delivered as an error notification.
pub fn bind_callback_select<A, T, U, F, S>(
    function: F,
    selector: S,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> impl Fn(A) -> Observable<U>
where
    A: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    F: Fn(A, Done<T>) -> Result<(), FlowError> + Send + Sync + 'static,
    S: Fn(Vec<T>) -> Result<U, FlowError> + Send + Sync + 'static,
{
    let function = Arc::new(function);
    let selector: Project<T, U> = Arc::new(selector);
    move |args: A| {
        bound(
            Arc::clone(&function),
            args,
            Arc::clone(&selector),
            scheduler.clone(),
        )
    }
}

/// One factory call: an observable with its own cache slot.
fn bound<A, T, U, F>(
    function: Arc<F>,
    args: A,
    project: Project<T, U>,
    scheduler: Option<Arc<dyn Scheduler>>,
) -> Observable<U>
where
    A: Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
    U: Clone + Send + Sync + 'static,
    F: Fn(A, Done<T>) -> Result<(), FlowError> + Send + Sync + 'static,
{
    let state = Arc::new(CallState { slot: Mutex::new(Slot::Idle), scheduler });

    Observable::create(move |subscriber| {
        enum Step<U> {
            Replay(Result<U, FlowError>),
            Joined,
            Invoke,
        }

        let step = {
            let mut slot = lock(&state.slot);
            match &mut *slot {
                Slot::Settled(outcome) => Step::Replay(outcome.clone()),
                Slot::Pending { waiters } => {
                    waiters.push(subscriber.clone());
                    Step::Joined
                }
                Slot::Idle => {
                    *slot = Slot::Pending { waiters: vec![subscriber.clone()] };
                    Step::Invoke
                }
            }
        };

        match step {
            Step::Replay(outcome) => deliver(&state.scheduler, &subscriber, outcome),
            Step::Joined => {}
            Step::Invoke => {
                let settle_state = Arc::clone(&state);
                let settle_project = Arc::clone(&project);
                let done = Done::new(move |values: Vec<T>| {
                    let outcome = (*settle_project)(values);
                    settle(&settle_state, outcome);
                });
                if let Err(err) = (*function)(args.clone(), done) {
                    settle(&state, Err(err));
                }
            }
        }
        Ok(Teardown::None)
    })
}

/// Settles the cache slot once and fans the outcome out to every waiter.
///
/// A second settlement attempt (function erred after resolving, or a
/// duplicate `Done` clone fired) leaves the first outcome in place.
fn settle<U: Clone + Send + 'static>(state: &Arc<CallState<U>>, outcome: Result<U, FlowError>) {
    let waiters = {
        let mut slot = lock(&state.slot);
        if matches!(*slot, Slot::Settled(_)) {
            return;
        }
        match std::mem::replace(&mut *slot, Slot::Settled(outcome.clone())) {
            Slot::Pending { waiters } => waiters,
            _ => Vec::new(),
        }
    };
    for waiter in waiters {
        deliver(&state.scheduler, &waiter, outcome.clone());
    }
}

/// Delivers one outcome to one subscriber, through the scheduler if any.
fn deliver<U: Clone + Send + 'static>(
    scheduler: &Option<Arc<dyn Scheduler>>,
    subscriber: &Subscriber<U>,
    outcome: Result<U, FlowError>,
) {
    match scheduler {
        None => deliver_now(subscriber, outcome),
        Some(scheduler) => {
            let subscriber = subscriber.clone();
            let mut slot = Some(outcome);
            scheduler.schedule(0, Box::new(move |_| {
                if let Some(outcome) = slot.take() {
                    deliver_now(&subscriber, outcome);
                }
            }));
        }
    }
}

fn deliver_now<U>(subscriber: &Subscriber<U>, outcome: Result<U, FlowError>) {
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
