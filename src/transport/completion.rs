//! Single-shot completion notification.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::error::{ChannelErrorKind, TransportError, TransportResult};
use crate::exchange::ExchangeState;

use super::channel::ChannelId;

/// Resolves once with the completed exchange.
///
/// Fails with [`ChannelErrorKind::Abandoned`] if the transport drops the
/// exchange without completing it.
#[derive(Debug)]
pub struct Completion {
    id: ChannelId,
    rx: oneshot::Receiver<ExchangeState>,
}

impl Completion {
    pub(crate) fn new(id: ChannelId, rx: oneshot::Receiver<ExchangeState>) -> Self {
        Self { id, rx }
    }

    /// Channel this completion belongs to.
    pub fn channel_id(&self) -> ChannelId {
        self.id
    }

    /// Take the result without waiting. `None` while still pending.
    pub fn try_take(&mut self) -> Option<TransportResult<ExchangeState>> {
        match self.rx.try_recv() {
            Ok(state) => Some(Ok(state)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(self.abandoned())),
        }
    }

    fn abandoned(&self) -> TransportError {
        TransportError::channel(self.id, ChannelErrorKind::Abandoned)
    }
}

impl Future for Completion {
    type Output = TransportResult<ExchangeState>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.map_err(|_| TransportError::channel(id, ChannelErrorKind::Abandoned)))
    }
}
