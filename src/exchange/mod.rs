//! Exchange state module.
//!
//! An exchange is one request/response pair. Its state mirrors the surface of
//! a standard asynchronous request object: request fields set by the caller,
//! response fields filled in when the relay reports back.

mod ready_state;
mod state;

pub use ready_state::ReadyState;
pub use state::{ExchangeState, DEFAULT_METHOD};
