//! Request lifecycle markers.

use std::fmt;

use serde::Serialize;

/// Lifecycle of an exchange, numbered like a standard request object.
///
/// The relay protocol only ever reports `Unsent` and `Complete`; the
/// intermediate states exist so the numbering matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadyState {
    #[default]
    Unsent = 0,
    Opened = 1,
    HeadersReceived = 2,
    Loading = 3,
    Complete = 4,
}

impl ReadyState {
    /// Numeric value of the state.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        self == Self::Complete
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unsent => "UNSENT",
            Self::Opened => "OPENED",
            Self::HeadersReceived => "HEADERS_RECEIVED",
            Self::Loading => "LOADING",
            Self::Complete => "COMPLETE",
        };
        write!(f, "{}({})", name, self.as_u8())
    }
}
