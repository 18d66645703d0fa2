//! Source adapters: normalizing heterogeneous shapes into observables.
//!
//! Each adapter wraps one external source shape behind the
//! [`Observable`](crate::Observable) contract, with an optional
//! [`Scheduler`](crate::Scheduler) deciding when notifications are
//! delivered:
//! - [`scalar`]: exactly one value then completion (two-phase when
//!   scheduled);
//! - [`array`] / [`array_like`]: index-ordered element emission;
//! - [`future`]: settlement of an asynchronous result;
//! - [`iter`]: pull-based sequences, including text as characters;
//! - [`capability`]: sources already exposing the observable capability.
//!
//! [`from`] is the dispatch resolver selecting among them by
//! capability-precedence over the closed [`Source`] union.

pub mod array;
pub mod array_like;
pub mod capability;
mod from;
pub mod future;
pub mod iter;
pub mod scalar;
mod source;

pub use from::{from, from_mapped};
pub use source::{ArrayLike, IntoObservable, IterFactory, MapFn, Source};
