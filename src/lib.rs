//! # rivulet
//!
//! **Rivulet** is a push-based reactive engine for Rust.
//!
//! It provides primitives to describe lazy value streams, consume them
//! through a disciplined notification contract, cancel them compositionally,
//! and control delivery timing through pluggable schedulers. The crate is
//! designed as a building block for higher-level stream operators and
//! event-driven components.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  ┌────────────┐ ┌──────────┐ ┌────────┐ ┌──────────┐ ┌────────────┐
//!  │ Observable │ │ Array /  │ │ Future │ │ Iterator │ │ Callback   │
//!  │ capability │ │ArrayLike │ │        │ │ / text   │ │ function   │
//!  └─────┬──────┘ └────┬─────┘ └───┬────┘ └────┬─────┘ └─────┬──────┘
//!        ▼             ▼           ▼           ▼             ▼
//! ┌───────────────────────────────────────────────────┐ ┌─────────────┐
//! │  from / from_mapped (capability-precedence over   │ │bind_callback│
//! │  the closed Source union)                         │ │ (cached)    │
//! └─────────────────────────┬─────────────────────────┘ └──────┬──────┘
//!                           ▼                                  │
//!                    ┌─────────────┐                           │
//!                    │ Observable  │◄──────────────────────────┘
//!                    │ (lazy/cold) │
//!                    └──────┬──────┘
//!                           │ subscribe()
//!                           ▼
//!                    ┌─────────────┐      ┌──────────────────────┐
//!                    │ Subscriber  │─────►│ Subscription         │
//!                    │ (at most    │      │ (idempotent release, │
//!                    │  one        │      │  child teardowns,    │
//!                    │  terminal)  │      │  CancellationToken)  │
//!                    └──────┬──────┘      └──────────────────────┘
//!                           │ on_next / on_error / on_complete
//!                           ▼
//!                    ┌─────────────┐
//!                    │  Observer   │
//!                    │ (user code) │
//!                    └─────────────┘
//!
//! Delivery timing is decided by the optional Scheduler handed to each
//! adapter:
//!
//!   ImmediateScheduler ── work runs inline, inside schedule()
//!   VirtualScheduler   ── work queues until flush() advances logical time
//! ```
//!
//! ### Subscription lifecycle
//! ```text
//! Observable::subscribe(observer)
//!   ├─► wrap observer in Subscriber (fresh Subscription)
//!   ├─► run the producer function
//!   │     ├─ Ok(teardown) ──► attach teardown to the subscription
//!   │     └─ Err(e) ────────► subscriber.error(e)   (producer throw)
//!   │                         (already terminal ─► Err returned to caller)
//!   └─► Ok(Arc<Subscription>)
//!
//! terminal notification (error | complete)
//!   ├─► deliver to observer (panics caught, reported via tracing)
//!   └─► subscription.unsubscribe()
//!         ├─ already released ─► no-op
//!         └─ drain children, cancel token, run teardowns once
//! ```
//!
//! ## Features
//! | Area           | Description                                                       | Key types / traits                          |
//! |----------------|-------------------------------------------------------------------|---------------------------------------------|
//! | **Core**       | Lazy producers, disciplined consumers, composable cancellation.   | [`Observable`], [`Subscriber`], [`Subscription`] |
//! | **Scheduling** | Inline or flush-driven logical-time delivery.                     | [`Scheduler`], [`ImmediateScheduler`], [`VirtualScheduler`] |
//! | **Sources**    | Normalize scalars, arrays, futures, iterators into observables.   | [`from`], [`Source`], [`ArrayLike`], [`IntoObservable`] |
//! | **Callbacks**  | Bridge callback-accepting functions, with per-call result cache.  | [`bind_callback`], [`Done`], [`CallbackValue`] |
//! | **Errors**     | Typed errors for flow notifications and engine operations.        | [`FlowError`], [`EngineError`]              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use rivulet::{from, FnObserver, Scheduler, Source, VirtualScheduler};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let scheduler = Arc::new(VirtualScheduler::new());
//!
//!     // Nothing runs at construction; the producer is lazy.
//!     let numbers = from(
//!         Source::array(vec![1, 2, 3]),
//!         Some(scheduler.clone() as Arc<dyn Scheduler>),
//!     )?;
//!
//!     numbers.subscribe(
//!         FnObserver::new()
//!             .next(|value: i32| println!("next: {value}"))
//!             .complete(|| println!("complete")),
//!     )?;
//!
//!     // Deliveries were queued on the virtual clock; flush drains them.
//!     scheduler.flush();
//!     Ok(())
//! }
//! ```
mod callback;
mod core;
mod error;
mod scheduler;
pub mod sources;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use callback::{bind_callback, bind_callback_select, CallbackValue, Done};
pub use core::{FnObserver, Observable, Observer, Subscriber, Subscription, Teardown, TeardownHandle};
pub use error::{EngineError, FlowError};
pub use scheduler::{ImmediateScheduler, Scheduler, VirtualScheduler, Work, WorkContext};
pub use sources::{from, from_mapped, ArrayLike, IntoObservable, IterFactory, MapFn, Source};
