//! Inbound response message (relay to client).

use tracing::warn;

use super::wire::{decode, encode};

/// A response as reported by the relay.
///
/// Every field is optional; absent and empty fields are treated alike,
/// except `status` where `0` is a real value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundResponse {
    /// Raw response header block.
    pub response_headers: Option<String>,
    /// Numeric status.
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub response_text: Option<String>,
}

impl InboundResponse {
    /// Parse a relay message. Never fails; malformed fields are dropped.
    pub fn from_wire(wire: &str) -> Self {
        let mut fields = decode(wire);
        let mut take = |name: &str| fields.remove(name).filter(|v| !v.is_empty());

        let status = take("status").and_then(|raw| match raw.trim().parse::<u16>() {
            Ok(status) => Some(status),
            Err(e) => {
                warn!(status = %raw, error = %e, "Ignoring unparseable response status");
                None
            }
        });

        Self {
            response_headers: take("responseHeaders"),
            status,
            status_text: take("statusText"),
            response_text: take("responseText"),
        }
    }

    /// Encode the message, as a relay would.
    pub fn to_wire(&self) -> String {
        let status = self.status.map(|s| s.to_string());
        let mut fields = Vec::new();
        if let Some(headers) = self.response_headers.as_deref() {
            fields.push(("responseHeaders", headers));
        }
        if let Some(status) = status.as_deref() {
            fields.push(("status", status));
        }
        if let Some(text) = self.status_text.as_deref() {
            fields.push(("statusText", text));
        }
        if let Some(text) = self.response_text.as_deref() {
            fields.push(("responseText", text));
        }
        encode(fields)
    }
}
