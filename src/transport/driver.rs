//! Transport driver.
//!
//! Owns every open channel and moves each exchange from initialization
//! through send and receive.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{AuditEntry, ExchangeJournal, NullAuditLogger};
use crate::config::ChannelConfig;
use crate::error::{ChannelErrorKind, TransportError, TransportResult};
use crate::exchange::{ExchangeState, ReadyState};
use crate::protocol::{InboundResponse, OutboundRequest, RelayFrame};

use super::channel::{Channel, ChannelId, ChannelPhase, TeardownPolicy};
use super::completion::Completion;
use super::embedder::RelayEmbedder;

/// Message fed into `receive` when a relay never answers.
pub const TIMEOUT_MESSAGE: &str = "status=0&statusText=Relay%20timeout";

/// Drives exchanges over relay channels.
///
/// Each call to [`initialize`](Self::initialize) opens a channel with a
/// fresh id, so any number of exchanges may be in flight at once.
pub struct Transport<E: RelayEmbedder> {
    embedder: E,
    channels: HashMap<ChannelId, Channel>,
    first_id: ChannelId,
    next_id: ChannelId,
    teardown: TeardownPolicy,
    audit_logger: Arc<dyn ExchangeJournal>,
    response_timeout: Option<Duration>,
}

impl<E: RelayEmbedder> Transport<E> {
    /// Create a transport whose first channel id is 0.
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            channels: HashMap::new(),
            first_id: ChannelId::new(0),
            next_id: ChannelId::new(0),
            teardown: TeardownPolicy::default(),
            audit_logger: Arc::new(NullAuditLogger::new()),
            response_timeout: None,
        }
    }

    /// Create a transport configured from the `[channel]` settings.
    pub fn from_config(embedder: E, config: &ChannelConfig) -> Self {
        Self::new(embedder)
            .with_first_id(config.first_id)
            .with_teardown(config.teardown)
            .with_response_timeout(config.response_timeout())
    }

    /// Start channel ids at `first_id`.
    pub fn with_first_id(mut self, first_id: u64) -> Self {
        self.first_id = ChannelId::new(first_id);
        self.next_id = self.first_id;
        self
    }

    pub fn with_teardown(mut self, teardown: TeardownPolicy) -> Self {
        self.teardown = teardown;
        self
    }

    /// Journal every completed exchange.
    pub fn with_audit_logger(mut self, logger: Arc<dyn ExchangeJournal>) -> Self {
        self.audit_logger = logger;
        self
    }

    /// How long a sent exchange may wait for its relay; `None` waits forever.
    pub fn with_response_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn embedder_mut(&mut self) -> &mut E {
        &mut self.embedder
    }

    pub fn teardown_policy(&self) -> TeardownPolicy {
        self.teardown
    }

    /// Number of channels whose relay frame is still embedded.
    pub fn open_channels(&self) -> usize {
        self.channels.len()
    }

    /// Lifecycle phase of a channel, or `None` for an id never handed out.
    pub fn phase(&self, id: ChannelId) -> Option<ChannelPhase> {
        match self.channels.get(&id) {
            Some(channel) => Some(channel.phase),
            None if id >= self.first_id && id < self.next_id => Some(ChannelPhase::Closed),
            None => None,
        }
    }

    /// Open a channel: embed a relay for `client_uri` pointed at
    /// `server_uri` and return its id.
    ///
    /// Returns without waiting for the relay to load. The relay must signal
    /// readiness before [`send`](Self::send) is called.
    pub fn initialize(&mut self, client_uri: &str, server_uri: &str) -> TransportResult<ChannelId> {
        let id = self.next_id;
        let frame = RelayFrame::new(id, client_uri, server_uri);

        self.embedder.embed(&frame)?;
        self.channels
            .insert(id, Channel::new(ExchangeState::new(client_uri, server_uri)));
        self.next_id = id.next();

        info!(
            channel_id = %id,
            element_id = %frame.element_id,
            server = %server_uri,
            "Relay channel created"
        );

        Ok(id)
    }

    /// The exchange carried by an open channel.
    pub fn state(&self, id: ChannelId) -> TransportResult<&ExchangeState> {
        self.channels
            .get(&id)
            .map(|channel| &channel.state)
            .ok_or(TransportError::ChannelNotFound { id })
    }

    /// Mutable access to an open channel's exchange, to fill in the request.
    pub fn state_mut(&mut self, id: ChannelId) -> TransportResult<&mut ExchangeState> {
        self.channels
            .get_mut(&id)
            .map(|channel| &mut channel.state)
            .ok_or(TransportError::ChannelNotFound { id })
    }

    /// Take the completion notification for a channel. Only one may be
    /// taken per channel.
    pub fn completion(&mut self, id: ChannelId) -> TransportResult<Completion> {
        let channel = self
            .channels
            .get_mut(&id)
            .ok_or(TransportError::ChannelNotFound { id })?;

        channel
            .take_completion()
            .map(|rx| Completion::new(id, rx))
            .ok_or_else(|| TransportError::channel(id, ChannelErrorKind::CompletionTaken))
    }

    /// Encode the channel's request and dispatch it to the relay.
    ///
    /// # Errors
    ///
    /// - [`TransportError::ChannelNotFound`] if no open channel has this id;
    ///   nothing is dispatched.
    /// - [`ChannelErrorKind::AlreadySent`] / [`ChannelErrorKind::AlreadyComplete`]
    ///   if the channel already carried its request.
    /// - Any dispatch error from the embedder.
    pub fn send(&mut self, id: ChannelId) -> TransportResult<()> {
        let channel = self
            .channels
            .get_mut(&id)
            .ok_or(TransportError::ChannelNotFound { id })?;

        if channel.state.is_complete() {
            return Err(TransportError::channel(id, ChannelErrorKind::AlreadyComplete));
        }
        if channel.phase == ChannelPhase::Active {
            return Err(TransportError::channel(id, ChannelErrorKind::AlreadySent));
        }

        let request = OutboundRequest::from_state(&channel.state);
        let message = request.to_wire();
        debug!(channel_id = %id, message = %message, "Encoded request");

        self.embedder.dispatch(id, &message)?;
        channel.phase = ChannelPhase::Active;

        info!(
            channel_id = %id,
            method = request.method.as_deref().unwrap_or("-"),
            uri = %request.uri,
            "Request dispatched to relay"
        );

        Ok(())
    }

    /// Apply a relay response to the channel's exchange and complete it.
    ///
    /// Returns a snapshot of the completed exchange; the same snapshot is
    /// delivered to the channel's [`Completion`].
    pub fn receive(&mut self, id: ChannelId, message: &str) -> TransportResult<ExchangeState> {
        self.complete(id, message, false)
    }

    /// Complete a still-pending exchange with [`TIMEOUT_MESSAGE`].
    ///
    /// Returns `Ok(false)` if the exchange had already completed.
    pub fn expire(&mut self, id: ChannelId) -> TransportResult<bool> {
        if self.state(id)?.is_complete() {
            return Ok(false);
        }
        self.complete(id, TIMEOUT_MESSAGE, true)?;
        Ok(true)
    }

    fn complete(
        &mut self,
        id: ChannelId,
        message: &str,
        timed_out: bool,
    ) -> TransportResult<ExchangeState> {
        let channel = self
            .channels
            .get_mut(&id)
            .ok_or(TransportError::ChannelNotFound { id })?;

        if channel.state.is_complete() {
            warn!(channel_id = %id, "Response received for completed exchange");
            return Err(TransportError::channel(id, ChannelErrorKind::AlreadyComplete));
        }

        let response = InboundResponse::from_wire(message);
        let has_response_text = response.response_text.is_some();

        let state = &mut channel.state;
        state.set_response_headers(response.response_headers.as_deref());
        if let Some(status) = response.status {
            state.set_status(status);
        }
        if let Some(text) = response.status_text {
            state.set_status_text(text);
        }
        if let Some(text) = response.response_text {
            state.set_response_text(text);
        }
        state.advance(ReadyState::Complete);

        let snapshot = state.clone();
        let exchange_id = channel.exchange_id;
        let elapsed = channel.opened_at.elapsed();

        if !channel.notify(snapshot.clone()) {
            debug!(channel_id = %id, "Completion listener already gone");
        }

        if self.teardown.should_release(has_response_text) {
            self.channels.remove(&id);
            self.embedder.remove(id);
            debug!(channel_id = %id, "Relay channel closed");
        } else {
            debug!(channel_id = %id, "Relay channel kept open without response text");
        }

        info!(
            channel_id = %id,
            status = ?snapshot.status(),
            elapsed_ms = elapsed.as_millis() as u64,
            timed_out,
            "Exchange complete"
        );

        self.journal(exchange_id, id, &snapshot, timed_out, elapsed.as_millis() as u64);

        Ok(snapshot)
    }

    fn journal(
        &self,
        exchange_id: Uuid,
        id: ChannelId,
        state: &ExchangeState,
        timed_out: bool,
        duration_ms: u64,
    ) {
        if !self.audit_logger.is_enabled() {
            return;
        }

        let entry = AuditEntry::new(
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            exchange_id,
            id,
            state,
            timed_out,
            duration_ms,
        );

        if let Err(e) = self.audit_logger.record(&entry) {
            warn!(channel_id = %id, error = %e, "Failed to write journal entry");
        }
    }
}
