//! Flat key-value codec for relay messages.
//!
//! Messages are `&`-joined `name=value` pairs, each side percent-encoded.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::trace;

/// Characters left unescaped when encoding a component.
///
/// Matches the unreserved set of ECMAScript `encodeURIComponent`, so space
/// becomes `%20` rather than `+`.
pub const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decoded message fields.
pub type WireFields = BTreeMap<String, String>;

/// Percent-encode a single name or value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Percent-decode a single name or value.
///
/// Malformed escapes are kept literally and invalid UTF-8 is replaced, so
/// decoding never fails.
pub fn decode_component(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Encode fields into a wire string, in iteration order.
///
/// Empty values are encoded as-is; callers drop optional fields beforehand.
pub fn encode<I, K, V>(fields: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    fields
        .into_iter()
        .map(|(name, value)| {
            format!(
                "{}={}",
                encode_component(name.as_ref()),
                encode_component(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Decode a wire string into fields.
///
/// Empty segments are skipped, a segment without `=` yields an empty value,
/// and a repeated name keeps its last value.
pub fn decode(wire: &str) -> WireFields {
    let mut fields = WireFields::new();

    for segment in wire.split('&').filter(|s| !s.is_empty()) {
        let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
        fields.insert(decode_component(name), decode_component(value));
    }

    trace!(fields = fields.len(), "Decoded wire message");
    fields
}
