//! Wire protocol module.
//!
//! Defines the messages exchanged with a relay document and their encoding.
//!
//! ## Wire Format
//!
//! Every message is a single string of `&`-joined `name=value` pairs, with
//! names and values percent-encoded independently:
//! ```text
//! uri=<uri>[&requestHeaders=<block>][&method=<method>][&data=<body>]
//! ```
//! Header blocks are `Name: Value` lines joined by `\r\n` before encoding.

mod headers;
mod init;
mod request;
mod response;
mod wire;

pub use headers::{parse_headers, serialize_headers, HeaderMap};
pub use init::{init_uri, RelayFrame, RELAY_FRAME_STYLE};
pub use request::OutboundRequest;
pub use response::InboundResponse;
pub use wire::{decode, decode_component, encode, encode_component, WireFields, COMPONENT};
