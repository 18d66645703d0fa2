//! # Composable cancellation node.
//!
//! [`Subscription`] tracks the teardown actions of one execution: plain
//! actions, nested subscriptions, or nothing. Releasing a subscription runs
//! every attached teardown exactly once and cancels its
//! [`CancellationToken`], the seam async adapters select on to abandon
//! in-flight work.
//!
//! ## Rules
//! - **Idempotent release**: the second and later `unsubscribe` calls are
//!   no-ops.
//! - **No leak window**: a teardown added after release runs immediately.
//! - **Drain before run**: entries are removed from the owned set before
//!   they execute, so a teardown that re-enters `unsubscribe` (on this node
//!   or a parent) neither recurses unboundedly nor runs anything twice.
//! - **All teardowns run**: a failing teardown does not stop the rest;
//!   failures are aggregated into a single [`EngineError::Teardown`]
//!   returned after every entry ran.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use rivulet::{Subscription, Teardown};
//!
//! let ran = Arc::new(AtomicUsize::new(0));
//! let subscription = Subscription::new();
//!
//! let counter = Arc::clone(&ran);
//! subscription.add(Teardown::action(move || {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! }));
//!
//! subscription.unsubscribe().unwrap();
//! subscription.unsubscribe().unwrap(); // no-op
//! assert_eq!(ran.load(Ordering::SeqCst), 1);
//! assert!(subscription.is_released());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use crate::core::lock;
use crate::error::EngineError;

/// A fallible teardown action.
pub type TeardownFn = Box<dyn FnOnce() -> Result<(), EngineError> + Send>;

/// One teardown entry owned by a [`Subscription`] until executed.
pub enum Teardown {
    /// Nothing to release. Attaching this is a no-op.
    None,
    /// A one-shot action run at release time.
    Action(TeardownFn),
    /// A nested subscription released together with its parent.
    Subscription(Arc<Subscription>),
}

impl Teardown {
    /// Wraps an infallible action.
    pub fn action(f: impl FnOnce() + Send + 'static) -> Self {
        Teardown::Action(Box::new(move || {
            f();
            Ok(())
        }))
    }

    /// Wraps an action that may fail; the failure is aggregated into the
    /// releasing subscription's [`EngineError::Teardown`].
    pub fn fallible(f: impl FnOnce() -> Result<(), EngineError> + Send + 'static) -> Self {
        Teardown::Action(Box::new(f))
    }

    /// Executes the teardown, pushing any failure messages onto `failures`.
    fn run(self, failures: &mut Vec<String>) {
        match self {
            Teardown::None => {}
            Teardown::Action(f) => {
                if let Err(err) = f() {
                    failures.push(err.as_message());
                }
            }
            Teardown::Subscription(child) => match child.unsubscribe() {
                Ok(()) => {}
                Err(EngineError::Teardown { failures: nested }) => failures.extend(nested),
                Err(other) => failures.push(other.as_message()),
            },
        }
    }
}

/// Handle returned by [`Subscription::add`], usable with
/// [`Subscription::remove`] to detach a teardown without executing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeardownHandle(u64);

impl TeardownHandle {
    /// Handle for a teardown that already ran (attached after release) or
    /// was empty. Removing it is a no-op.
    pub const SPENT: TeardownHandle = TeardownHandle(0);

    /// Returns `true` if this handle refers to no live entry.
    pub fn is_spent(&self) -> bool {
        self.0 == 0
    }
}

/// Composable cancellation node with idempotent release.
///
/// Child teardowns are owned exclusively by this node until they execute.
/// Release order among children is registration order; it is deterministic
/// but not part of the contract.
pub struct Subscription {
    released: AtomicBool,
    entries: Mutex<Vec<(u64, Teardown)>>,
    next_id: AtomicU64,
    token: CancellationToken,
}

impl Subscription {
    /// Creates a fresh, unreleased subscription.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            released: AtomicBool::new(false),
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            token: CancellationToken::new(),
        })
    }

    /// Returns `true` once [`unsubscribe`](Subscription::unsubscribe) has
    /// been called.
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Returns a token cancelled when this subscription is released.
    ///
    /// Async producers select on it to abandon in-flight work instead of
    /// delivering to a dead subscriber.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Attaches a teardown, returning a handle for later
    /// [`remove`](Subscription::remove).
    ///
    /// If the subscription is already released the teardown runs
    /// immediately (there is no window in which it could leak) and the
    /// returned handle is [`TeardownHandle::SPENT`]. A failure of such an
    /// immediate run is reported through `tracing` because there is no
    /// release call to return it from.
    pub fn add(&self, teardown: Teardown) -> TeardownHandle {
        if matches!(teardown, Teardown::None) {
            return TeardownHandle::SPENT;
        }
        {
            let mut entries = lock(&self.entries);
            if !self.released.load(Ordering::SeqCst) {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                entries.push((id, teardown));
                return TeardownHandle(id);
            }
        }
        let mut failures = Vec::new();
        teardown.run(&mut failures);
        if !failures.is_empty() {
            tracing::error!(
                failures = ?failures,
                "teardown attached after release failed"
            );
        }
        TeardownHandle::SPENT
    }

    /// Detaches a teardown without executing it.
    ///
    /// Unknown or spent handles are ignored.
    pub fn remove(&self, handle: TeardownHandle) {
        if handle.is_spent() {
            return;
        }
        let mut entries = lock(&self.entries);
        entries.retain(|(id, _)| *id != handle.0);
    }

    /// Releases the node: cancels the token, then executes and detaches
    /// every attached teardown exactly once.
    ///
    /// Idempotent; later calls return `Ok(())` without side effects.
    /// Failing teardowns do not stop the remaining ones; their messages are
    /// aggregated into [`EngineError::Teardown`] returned after all ran.
    pub fn unsubscribe(&self) -> Result<(), EngineError> {
        let drained = {
            let mut entries = lock(&self.entries);
            if self.released.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            std::mem::take(&mut *entries)
        };
        self.token.cancel();

        let mut failures = Vec::new();
        for (_, teardown) in drained {
            teardown.run(&mut failures);
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Teardown { failures })
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.is_released())
            .field("entries", &lock(&self.entries).len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter_teardown(hits: &Arc<AtomicUsize>) -> Teardown {
        let hits = Arc::clone(hits);
        Teardown::action(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new();
        sub.add(counter_teardown(&hits));

        assert!(sub.unsubscribe().is_ok());
        assert!(sub.unsubscribe().is_ok());
        assert!(sub.unsubscribe().is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_add_after_release_runs_immediately() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new();
        sub.unsubscribe().unwrap();

        let handle = sub.add(counter_teardown(&hits));
        assert!(handle.is_spent());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_detaches_without_executing() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new();
        let handle = sub.add(counter_teardown(&hits));
        sub.remove(handle);

        sub.unsubscribe().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_releasing_parent_releases_children() {
        let hits = Arc::new(AtomicUsize::new(0));
        let parent = Subscription::new();
        let child = Subscription::new();
        child.add(counter_teardown(&hits));
        parent.add(Teardown::Subscription(Arc::clone(&child)));

        parent.unsubscribe().unwrap();
        assert!(child.is_released());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_are_aggregated_and_all_teardowns_run() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new();
        sub.add(Teardown::fallible(|| {
            Err(EngineError::Teardown { failures: vec!["first".into()] })
        }));
        sub.add(counter_teardown(&hits));
        sub.add(Teardown::fallible(|| {
            Err(EngineError::Teardown { failures: vec!["second".into()] })
        }));

        let err = sub.unsubscribe().expect_err("failures must surface");
        match err {
            EngineError::Teardown { failures } => assert_eq!(failures.len(), 2),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_unsubscribe_neither_deadlocks_nor_double_runs() {
        let hits = Arc::new(AtomicUsize::new(0));
        let sub = Subscription::new();

        let reentrant = Arc::clone(&sub);
        sub.add(Teardown::action(move || {
            // Release from inside a teardown of the same node.
            let _ = reentrant.unsubscribe();
        }));
        sub.add(counter_teardown(&hits));

        sub.unsubscribe().unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_token_cancelled_on_release() {
        let sub = Subscription::new();
        let token = sub.cancellation_token();
        assert!(!token.is_cancelled());
        sub.unsubscribe().unwrap();
        assert!(token.is_cancelled());
    }
}
