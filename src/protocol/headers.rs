//! Header block sub-format.
//!
//! A header block is a sequence of `Name: Value` lines. Outbound blocks are
//! joined with `\r\n`; inbound blocks may use either `\r\n` or `\n`.

use std::collections::BTreeMap;

/// Header name to value mapping. Lookups are case-sensitive.
pub type HeaderMap = BTreeMap<String, String>;

const NAME_VALUE_SEPARATOR: &str = ": ";

/// Serialize headers into a `\r\n`-joined block.
pub fn serialize_headers<I, K, V>(headers: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    headers
        .into_iter()
        .map(|(name, value)| format!("{}{}{}", name.as_ref(), NAME_VALUE_SEPARATOR, value.as_ref()))
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Parse a header block.
///
/// Carriage returns are dropped, blank lines skipped, and each line split on
/// the first `": "`. A line without a separator becomes a header with an
/// empty value.
pub fn parse_headers(block: &str) -> HeaderMap {
    block
        .replace('\r', "")
        .split('\n')
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (name, value) = line.split_once(NAME_VALUE_SEPARATOR).unwrap_or((line, ""));
            (name.to_string(), value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_single_header() {
        assert_eq!(serialize_headers([("X-Token", "abc")]), "X-Token: abc");
    }

    #[test]
    fn test_serialize_joins_with_crlf() {
        let block = serialize_headers([("Accept", "*/*"), ("X-Token", "abc")]);
        assert_eq!(block, "Accept: */*\r\nX-Token: abc");
    }

    #[test]
    fn test_round_trip() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type".into(), "text/html; charset=utf-8".into());
        headers.insert("Date".into(), "Tue, 15 Nov 1994 08:12:31 GMT".into());
        headers.insert("X-Empty".into(), String::new());

        assert_eq!(parse_headers(&serialize_headers(&headers)), headers);
        assert!(parse_headers(&serialize_headers(&HeaderMap::new())).is_empty());
    }

    #[test]
    fn test_parse_lf_only_and_trailing_newline() {
        let headers = parse_headers("Server: relay\nContent-Length: 2\n");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["Server"], "relay");
        assert_eq!(headers["Content-Length"], "2");
    }

    #[test]
    fn test_parse_splits_on_first_separator() {
        let headers = parse_headers("Link: <a>; rel: next");
        assert_eq!(headers["Link"], "<a>; rel: next");
    }

    #[test]
    fn test_parse_line_without_separator() {
        let headers = parse_headers("garbage\r\nOk: yes");
        assert_eq!(headers["garbage"], "");
        assert_eq!(headers["Ok"], "yes");
    }
}
