//! Callback bridge: callback-accepting functions as observable factories.

mod bind;

pub use bind::{bind_callback, bind_callback_select, CallbackValue, Done};
