//! Mutable record of one exchange.

use serde::Serialize;
use tracing::debug;

use crate::protocol::{parse_headers, HeaderMap};

use super::ready_state::ReadyState;

/// Method used when the caller sets none.
pub const DEFAULT_METHOD: &str = "POST";

/// Request and response data for one exchange.
///
/// Request fields are public and set by the caller before sending. Response
/// fields are filled in by the transport and exposed read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeState {
    /// HTTP method. Omitted from the wire when `None`.
    pub method: Option<String>,
    /// Target resource URI.
    #[serde(rename = "apiURI")]
    pub api_uri: String,
    /// Request body.
    pub data: Option<String>,
    /// Origin the relay forwards requests to.
    #[serde(rename = "serverURI")]
    pub server_uri: String,
    /// URI of the relay document.
    #[serde(rename = "clientURI")]
    pub client_uri: String,
    request_headers: HeaderMap,
    response_headers: HeaderMap,
    raw_response_headers: Option<String>,
    status: Option<u16>,
    status_text: Option<String>,
    response_text: Option<String>,
    ready_state: ReadyState,
}

impl ExchangeState {
    /// Create an unsent exchange between a relay document and a server.
    pub fn new(client_uri: impl Into<String>, server_uri: impl Into<String>) -> Self {
        Self {
            method: Some(DEFAULT_METHOD.to_string()),
            api_uri: String::new(),
            data: None,
            server_uri: server_uri.into(),
            client_uri: client_uri.into(),
            request_headers: HeaderMap::new(),
            response_headers: HeaderMap::new(),
            raw_response_headers: None,
            status: None,
            status_text: None,
            response_text: None,
            ready_state: ReadyState::Unsent,
        }
    }

    /// Set a request header, replacing any previous value.
    ///
    /// Names and values are passed through unchecked.
    pub fn set_request_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.request_headers.insert(name.into(), value.into());
    }

    /// Headers to send with the request.
    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    /// The raw response header block, as last set.
    pub fn get_all_response_headers(&self) -> Option<&str> {
        self.raw_response_headers.as_deref()
    }

    /// Look up a response header by exact name.
    pub fn get_response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.get(name).map(String::as_str)
    }

    /// Parsed response headers.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Replace the response headers from a raw block.
    ///
    /// `None` or an empty block leaves the current headers untouched.
    pub fn set_response_headers(&mut self, raw: Option<&str>) {
        let Some(raw) = raw.filter(|r| !r.is_empty()) else {
            return;
        };

        self.response_headers = parse_headers(raw);
        self.raw_response_headers = Some(raw.to_string());
        debug!(count = self.response_headers.len(), "Response headers set");
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_text.as_deref()
    }

    pub fn response_text(&self) -> Option<&str> {
        self.response_text.as_deref()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Whether the exchange has reached its terminal state.
    pub fn is_complete(&self) -> bool {
        self.ready_state.is_terminal()
    }

    pub(crate) fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    pub(crate) fn set_status_text(&mut self, text: String) {
        self.status_text = Some(text);
    }

    pub(crate) fn set_response_text(&mut self, text: String) {
        self.response_text = Some(text);
    }

    /// Move to a later ready state.
    ///
    /// Returns `false` and leaves the state unchanged if `next` is not ahead
    /// of the current state.
    pub(crate) fn advance(&mut self, next: ReadyState) -> bool {
        if next <= self.ready_state {
            return false;
        }
        self.ready_state = next;
        true
    }
}
