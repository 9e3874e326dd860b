//! Header sanitization for the exchange journal.
//!
//! Redacts credential-bearing request headers before they are written.

use serde_json::{Map, Value};

use crate::protocol::HeaderMap;

/// Header name fragments whose values are redacted.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "cookie",
    "token",
    "secret",
    "key",
    "password",
];

const REDACTED: &str = "[REDACTED]";

/// Sanitize request headers for journaling.
///
/// Returns a JSON object of the headers, with the value of any header whose
/// lowercased name contains a sensitive fragment replaced by `[REDACTED]`.
pub fn sanitize_headers(headers: &HeaderMap) -> Value {
    let mut sanitized = Map::new();
    for (name, value) in headers {
        let name_lower = name.to_lowercase();
        let is_sensitive = SENSITIVE_HEADERS.iter().any(|&s| name_lower.contains(s));

        let value = if is_sensitive { REDACTED } else { value.as_str() };
        sanitized.insert(name.clone(), Value::String(value.to_string()));
    }
    Value::Object(sanitized)
}
