//! Configuration module for the relay transport.
//!
//! Handles loading and validating transport configuration from TOML files.

mod settings;

pub use settings::*;
