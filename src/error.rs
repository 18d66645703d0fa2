//! Error types used by the rivulet execution core.
//!
//! This module defines two main error enums:
//!
//! - [`FlowError`] — errors that travel down the notification channel of a
//!   subscription (a producer failed, a selector failed).
//! - [`EngineError`] — errors raised synchronously to the caller (a value
//!   matched no source adapter, teardown actions failed during release).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.
//!
//! `FlowError` is `Clone + PartialEq`: a cached invocation outcome must be
//! replayable verbatim to late subscribers, and tests compare delivered
//! errors by value.

use thiserror::Error;

/// # Errors delivered through the notification channel.
///
/// These reach a subscriber's `on_error` callback. Once one was delivered,
/// the subscription chain is terminal and no further notification follows.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// The source itself failed (rejected future, failing callback function,
    /// iteration failure).
    #[error("producer failed: {error}")]
    Producer {
        /// The underlying error message.
        error: String,
    },

    /// A user-supplied transform/selector failed while projecting a value.
    #[error("selector failed: {error}")]
    Selector {
        /// The underlying error message.
        error: String,
    },
}

impl FlowError {
    /// Creates a producer-side failure.
    pub fn producer(error: impl Into<String>) -> Self {
        FlowError::Producer { error: error.into() }
    }

    /// Creates a selector failure.
    pub fn selector(error: impl Into<String>) -> Self {
        FlowError::Selector { error: error.into() }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use rivulet::FlowError;
    ///
    /// let err = FlowError::producer("boom");
    /// assert_eq!(err.as_label(), "flow_producer");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FlowError::Producer { .. } => "flow_producer",
            FlowError::Selector { .. } => "flow_selector",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FlowError::Producer { error } => format!("producer: {error}"),
            FlowError::Selector { error } => format!("selector: {error}"),
        }
    }
}

/// # Errors raised synchronously to the caller.
///
/// These never travel the notification channel: dispatch rejection happens
/// before any observable exists, and teardown failures surface from an
/// explicit `unsubscribe()` call after every teardown has run.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// The value handed to the dispatch resolver matched no source adapter.
    #[error("{type_name} is not observable")]
    NotObservable {
        /// Runtime type name of the offending value.
        type_name: &'static str,
    },

    /// One or more teardown actions failed during release.
    ///
    /// All remaining teardowns still ran; the failures are aggregated here.
    #[error("{} teardown action(s) failed", failures.len())]
    Teardown {
        /// Messages of every failed teardown, in execution order.
        failures: Vec<String>,
    },
}

impl EngineError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use rivulet::EngineError;
    ///
    /// let err = EngineError::NotObservable { type_name: "alloc::string::String" };
    /// assert_eq!(err.as_label(), "dispatch_not_observable");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::NotObservable { .. } => "dispatch_not_observable",
            EngineError::Teardown { .. } => "subscription_teardown",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EngineError::NotObservable { type_name } => {
                format!("{type_name} is not observable")
            }
            EngineError::Teardown { failures } => {
                format!("teardown failures: {failures:?}")
            }
        }
    }
}
