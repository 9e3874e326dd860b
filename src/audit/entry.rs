//! Journal entry types.

use serde::Serialize;
use uuid::Uuid;

use crate::exchange::ExchangeState;
use crate::transport::ChannelId;

use super::sanitize::sanitize_headers;

/// A single journal entry describing one finished exchange.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    /// RFC 3339 timestamp of completion.
    pub timestamp: String,
    /// Unique identifier of the exchange.
    pub exchange_id: Uuid,
    /// Channel the exchange ran on.
    pub channel_id: ChannelId,
    pub method: Option<String>,
    pub uri: String,
    /// Request headers with sensitive values redacted.
    pub request_headers: serde_json::Value,
    /// Size of the request body in bytes.
    pub body_bytes: usize,
    pub result: AuditResult,
    /// Time from initialization to completion in milliseconds.
    pub duration_ms: u64,
}

impl AuditEntry {
    /// Build an entry from a completed exchange.
    pub fn new(
        timestamp: String,
        exchange_id: Uuid,
        channel_id: ChannelId,
        state: &ExchangeState,
        timed_out: bool,
        duration_ms: u64,
    ) -> Self {
        let result = if timed_out {
            AuditResult::TimedOut
        } else {
            AuditResult::Completed {
                status: state.status(),
                status_text: state.status_text().map(str::to_string),
            }
        };

        Self {
            timestamp,
            exchange_id,
            channel_id,
            method: state.method.clone(),
            uri: state.api_uri.clone(),
            request_headers: sanitize_headers(state.request_headers()),
            body_bytes: state.data.as_ref().map_or(0, String::len),
            result,
            duration_ms,
        }
    }
}

/// How an exchange ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome")]
pub enum AuditResult {
    /// The relay reported a response.
    #[serde(rename = "completed")]
    Completed {
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        #[serde(skip_serializing_if = "Option::is_none")]
        status_text: Option<String>,
    },
    /// No response arrived before the watchdog fired.
    #[serde(rename = "timed_out")]
    TimedOut,
}
