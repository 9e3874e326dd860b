//! Outbound request message (client to relay).

use crate::exchange::ExchangeState;

use super::headers::{parse_headers, serialize_headers, HeaderMap};
use super::wire::{decode, encode};

/// A request as carried to the relay.
///
/// Optional fields are omitted from the wire when absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Target resource URI. Always present.
    pub uri: String,
    /// Serialized header block, if any headers were set.
    pub request_headers: Option<String>,
    /// HTTP method, if one was set.
    pub method: Option<String>,
    /// Request body, if non-empty.
    pub data: Option<String>,
}

impl OutboundRequest {
    /// Build the outbound message for an exchange.
    pub fn from_state(state: &ExchangeState) -> Self {
        let headers = state.request_headers();
        Self {
            uri: state.api_uri.clone(),
            request_headers: (!headers.is_empty()).then(|| serialize_headers(headers)),
            method: state.method.clone().filter(|m| !m.is_empty()),
            data: state.data.clone().filter(|d| !d.is_empty()),
        }
    }

    /// Parse an outbound message, as a relay would.
    pub fn from_wire(wire: &str) -> Self {
        let mut fields = decode(wire);
        let mut take = |name: &str| fields.remove(name).filter(|v| !v.is_empty());
        Self {
            uri: take("uri").unwrap_or_default(),
            request_headers: take("requestHeaders"),
            method: take("method"),
            data: take("data"),
        }
    }

    /// Encode the message.
    pub fn to_wire(&self) -> String {
        let mut fields = vec![("uri", self.uri.as_str())];
        if let Some(headers) = self.request_headers.as_deref() {
            fields.push(("requestHeaders", headers));
        }
        if let Some(method) = self.method.as_deref() {
            fields.push(("method", method));
        }
        if let Some(data) = self.data.as_deref() {
            fields.push(("data", data));
        }
        encode(fields)
    }

    /// Parsed request headers.
    pub fn headers(&self) -> HeaderMap {
        self.request_headers
            .as_deref()
            .map(parse_headers)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items_request() -> ExchangeState {
        let mut state = ExchangeState::new("https://client.example/relay.html", "https://api.example");
        state.api_uri = "https://api.example/items".to_string();
        state
    }

    #[test]
    fn test_get_with_single_header() {
        let mut state = items_request();
        state.method = Some("GET".to_string());
        state.data = Some(String::new());
        state.set_request_header("X-Token", "abc");

        let wire = OutboundRequest::from_state(&state).to_wire();
        assert_eq!(
            wire,
            "uri=https%3A%2F%2Fapi.example%2Fitems&requestHeaders=X-Token%3A%20abc&method=GET"
        );
    }

    #[test]
    fn test_default_method_is_post() {
        let wire = OutboundRequest::from_state(&items_request()).to_wire();
        assert_eq!(wire, "uri=https%3A%2F%2Fapi.example%2Fitems&method=POST");
    }

    #[test]
    fn test_unset_method_is_omitted() {
        let mut state = items_request();
        state.method = None;
        let wire = OutboundRequest::from_state(&state).to_wire();
        assert_eq!(wire, "uri=https%3A%2F%2Fapi.example%2Fitems");
    }

    #[test]
    fn test_header_block_encoded_as_single_field() {
        let mut state = items_request();
        state.set_request_header("Accept", "*/*");
        state.set_request_header("X-Token", "abc");
        state.data = Some("{\"a\":1}".to_string());

        let request = OutboundRequest::from_state(&state);
        assert_eq!(request.request_headers.as_deref(), Some("Accept: */*\r\nX-Token: abc"));

        let wire = request.to_wire();
        assert!(wire.contains("&requestHeaders=Accept%3A%20*%2F*%0D%0AX-Token%3A%20abc&"));
        assert!(wire.ends_with("&data=%7B%22a%22%3A1%7D"));
    }

    #[test]
    fn test_relay_side_parse() {
        let mut state = items_request();
        state.set_request_header("X-Token", "abc");
        state.data = Some("body text".to_string());

        let parsed = OutboundRequest::from_wire(&OutboundRequest::from_state(&state).to_wire());
        assert_eq!(parsed.uri, "https://api.example/items");
        assert_eq!(parsed.method.as_deref(), Some("POST"));
        assert_eq!(parsed.data.as_deref(), Some("body text"));
        assert_eq!(parsed.headers()["X-Token"], "abc");
    }
}
