//! # The closed set of source shapes the dispatch resolver accepts.
//!
//! Where the original dynamic design probed values for capabilities ("has a
//! then", "has an observable method", "has a numeric length"), this crate
//! models the same shapes as an explicit tagged union, [`Source`], plus two
//! capability traits. The resolver in [`from`](crate::from) matches the
//! variants in the documented precedence order; precedence stays an ordered
//! match, not a set of independent predicates.
//!
//! ## Example
//! ```rust
//! use rivulet::Source;
//!
//! let numbers = Source::array(vec![1, 2, 3]);
//! let letters = Source::text("ab"); // pull-based character sequence
//! let rejected = Source::<i32>::unsupported::<std::time::Duration>();
//! # let _ = (numbers, letters, rejected);
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::Observable;
use crate::error::FlowError;

/// The "observable" capability: a zero-argument method returning an
/// observable view of the value.
pub trait IntoObservable<T>: Send + Sync {
    /// Returns the observable this value represents.
    fn observable(&self) -> Observable<T>;
}

/// The "array-like" capability: a numeric length plus index access.
///
/// `get` returning `None` inside `0..len()` is treated as a producer
/// failure by the adapter.
pub trait ArrayLike<T>: Send + Sync {
    /// Number of addressable elements.
    fn len(&self) -> usize;

    /// Element at `index`, if present.
    fn get(&self, index: usize) -> Option<T>;

    /// `true` when there are no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> ArrayLike<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).cloned()
    }
}

/// Factory producing a fresh iterator per subscription.
///
/// A consumed-once iterator cannot model a cold source; the factory is
/// what keeps the iterator bridge cold.
pub type IterFactory<T> = Arc<dyn Fn() -> Box<dyn Iterator<Item = T> + Send> + Send + Sync>;

/// Per-element transform used by the array-like adapter, receiving the
/// element and its index. The original's binding context (`thisArg`) is
/// closure capture here.
pub type MapFn<T> = Arc<dyn Fn(T, usize) -> T + Send + Sync>;

/// A value the dispatch resolver can normalize, one variant per shape.
pub enum Source<T> {
    /// Already an observable of this crate.
    Observable(Observable<T>),
    /// Exposes the observable capability without being a core observable.
    Capability(Arc<dyn IntoObservable<T>>),
    /// A native ordered sequence.
    Array(Vec<T>),
    /// A promise-like value: settles once with a value or an error.
    Future(BoxFuture<'static, Result<T, FlowError>>),
    /// A pull-based sequence, produced fresh per subscription.
    Iter(IterFactory<T>),
    /// Numeric length plus index access.
    ArrayLike(Arc<dyn ArrayLike<T>>),
    /// A value matching no adapter; `from` rejects it naming this type.
    Unsupported {
        /// Runtime type name of the offending value.
        type_name: &'static str,
    },
}

impl<T> Source<T> {
    /// Wraps an existing observable.
    pub fn observable(observable: Observable<T>) -> Self {
        Source::Observable(observable)
    }

    /// Wraps a value exposing the observable capability.
    pub fn capability(source: impl IntoObservable<T> + 'static) -> Self {
        Source::Capability(Arc::new(source))
    }

    /// Wraps an ordered sequence.
    pub fn array(values: impl Into<Vec<T>>) -> Self {
        Source::Array(values.into())
    }

    /// Wraps an asynchronous result.
    pub fn future(future: impl Future<Output = Result<T, FlowError>> + Send + 'static) -> Self {
        Source::Future(Box::pin(future))
    }

    /// Wraps a pull-based sequence via a per-subscription factory.
    pub fn iter<I>(factory: impl Fn() -> I + Send + Sync + 'static) -> Self
    where
        I: Iterator<Item = T> + Send + 'static,
    {
        Source::Iter(Arc::new(move || Box::new(factory())))
    }

    /// Wraps an array-like value.
    pub fn array_like(source: impl ArrayLike<T> + 'static) -> Self {
        Source::ArrayLike(Arc::new(source))
    }

    /// Marks a value of type `V` as matching no adapter.
    ///
    /// The resolver turns this into
    /// [`EngineError::NotObservable`](crate::EngineError::NotObservable)
    /// carrying the runtime type name.
    pub fn unsupported<V>() -> Self {
        Source::Unsupported { type_name: std::any::type_name::<V>() }
    }
}

impl Source<char> {
    /// Treats text as a pull-based character sequence.
    pub fn text(text: impl Into<String>) -> Self {
        let chars: Vec<char> = text.into().chars().collect();
        Source::iter(move || chars.clone().into_iter())
    }
}
