//! Channel identifiers and per-channel bookkeeping.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::exchange::ExchangeState;

/// Identifier of one relay channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(u64);

impl ChannelId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl From<u64> for ChannelId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a channel is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelPhase {
    /// Relay frame embedded, nothing sent yet.
    Created,
    /// Request dispatched to the relay.
    Active,
    /// Relay frame removed.
    Closed,
}

impl fmt::Display for ChannelPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Active => write!(f, "active"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// When a completed channel releases its relay frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeardownPolicy {
    /// Release as soon as the exchange completes.
    #[default]
    OnComplete,
    /// Release only when the response carried a non-empty body. A
    /// completed exchange without one keeps its frame.
    OnResponseText,
}

impl TeardownPolicy {
    /// Whether a just-completed channel should be released.
    pub(crate) fn should_release(self, has_response_text: bool) -> bool {
        match self {
            Self::OnComplete => true,
            Self::OnResponseText => has_response_text,
        }
    }
}

/// An open channel and the exchange it carries.
pub(crate) struct Channel {
    pub(crate) state: ExchangeState,
    pub(crate) phase: ChannelPhase,
    pub(crate) exchange_id: Uuid,
    pub(crate) opened_at: Instant,
    completion_tx: Option<oneshot::Sender<ExchangeState>>,
    completion_rx: Option<oneshot::Receiver<ExchangeState>>,
}

impl Channel {
    pub(crate) fn new(state: ExchangeState) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            state,
            phase: ChannelPhase::Created,
            exchange_id: Uuid::new_v4(),
            opened_at: Instant::now(),
            completion_tx: Some(tx),
            completion_rx: Some(rx),
        }
    }

    /// Hand out the completion receiver. Only the first call succeeds.
    pub(crate) fn take_completion(&mut self) -> Option<oneshot::Receiver<ExchangeState>> {
        self.completion_rx.take()
    }

    /// Deliver the completed state. Returns `false` if nobody is listening.
    pub(crate) fn notify(&mut self, state: ExchangeState) -> bool {
        match self.completion_tx.take() {
            Some(tx) => tx.send(state).is_ok(),
            None => false,
        }
    }
}
