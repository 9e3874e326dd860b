//! Error types for the relay transport.

use thiserror::Error;

use crate::transport::ChannelId;

/// Main error type for the transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No open channel carries the given id.
    #[error("Channel not found: {id}")]
    ChannelNotFound { id: ChannelId },

    /// The channel exists but refused the operation.
    #[error("Channel {id} error: {kind}")]
    Channel { id: ChannelId, kind: ChannelErrorKind },

    /// The embedding collaborator failed to host or reach a relay.
    #[error("Embedding error: {message}")]
    Embed { message: String },

    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Channel error kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelErrorKind {
    #[error("request already sent")]
    AlreadySent,

    #[error("exchange already complete")]
    AlreadyComplete,

    #[error("completion already taken")]
    CompletionTaken,

    #[error("exchange dropped before completion")]
    Abandoned,
}

impl TransportError {
    /// Shorthand for a [`TransportError::Channel`] error.
    pub fn channel(id: ChannelId, kind: ChannelErrorKind) -> Self {
        Self::Channel { id, kind }
    }

    /// Whether this error reports an unknown or closed channel.
    pub fn is_channel_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound { .. })
    }
}

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
