//! Execution core: the producer/consumer contract.
//!
//! This module contains the three primitives every other part of the crate
//! composes with:
//! - [`subscription`]: composable cancellation node with idempotent release;
//! - [`subscriber`]: observer wrapper enforcing the terminal-notification
//!   contract;
//! - [`observable`]: the lazy producer abstraction.

mod observable;
mod subscriber;
mod subscription;

pub use observable::Observable;
pub use subscriber::{FnObserver, Observer, Subscriber};
pub use subscription::{Subscription, Teardown, TeardownHandle};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the guard if a panicking observer poisoned it.
///
/// Observer callbacks are caller-supplied and may panic while a lock is
/// held; the lock data stays valid because every mutation in this crate
/// completes before user code runs.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
