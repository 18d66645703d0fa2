//! # Shared test helpers
//!
//! A recording observer plus small assertions used across the unit tests.
//! Compiled only for `cfg(test)`.

use std::sync::{Arc, Mutex};

use crate::core::lock;
use crate::core::Observer;
use crate::error::FlowError;

/// One recorded delivery, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Note<T> {
    Next(T),
    Error(FlowError),
    Complete,
}

pub(crate) type Log<T> = Arc<Mutex<Vec<Note<T>>>>;

/// Observer that appends every delivery to a shared log.
pub(crate) struct Recorder<T> {
    log: Log<T>,
}

impl<T: Send> Observer<T> for Recorder<T> {
    fn on_next(&mut self, value: T) {
        lock(&self.log).push(Note::Next(value));
    }

    fn on_error(&mut self, error: FlowError) {
        lock(&self.log).push(Note::Error(error));
    }

    fn on_complete(&mut self) {
        lock(&self.log).push(Note::Complete);
    }
}

/// Builds a recorder and the log it writes into.
pub(crate) fn recorder<T>() -> (Recorder<T>, Log<T>) {
    let log: Log<T> = Arc::new(Mutex::new(Vec::new()));
    (Recorder { log: log.clone() }, log)
}

/// Snapshot of everything recorded so far.
pub(crate) fn notes<T: Clone>(log: &Log<T>) -> Vec<Note<T>> {
    lock(log).clone()
}

/// Yields to the runtime until `pred` holds, panicking if it never does.
pub(crate) async fn settled(pred: impl Fn() -> bool) {
    for _ in 0..256 {
        if pred() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition did not settle");
}
