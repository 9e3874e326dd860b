//! Exchange journal module.
//!
//! Records every completed exchange as one JSON line, for later analysis of
//! relay traffic.
//!
//! ## Features
//!
//! - Structured JSON entries with request and outcome details
//! - Redaction of credential-bearing request headers
//! - Synced appends so entries survive a crash

mod entry;
mod logger;
mod sanitize;

pub use entry::{AuditEntry, AuditResult};
pub use logger::{AuditLogger, ExchangeJournal, NullAuditLogger};
pub use sanitize::sanitize_headers;
