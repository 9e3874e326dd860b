//! Error types for the relay transport.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
