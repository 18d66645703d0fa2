//! Logical-time scheduling: when notifications are delivered.
//!
//! The [`Scheduler`] trait is the sole seam for controlling *when* work
//! runs; it never parallelizes anything. Two operating modes ship with the
//! crate:
//! - [`ImmediateScheduler`]: work runs synchronously inside `schedule`;
//! - [`VirtualScheduler`]: work is held on a queue until an explicit
//!   `flush` advances the clock, for deterministic timing tests.

mod immediate;
mod virtual_time;
mod work;

pub use immediate::ImmediateScheduler;
pub use virtual_time::VirtualScheduler;
pub use work::{Scheduler, Work, WorkContext};
