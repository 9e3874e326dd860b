//! Relay embedding seam.
//!
//! Hosting a relay document and posting messages into it depends on the
//! host environment, so the transport reaches it through a trait.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{TransportError, TransportResult};
use crate::protocol::RelayFrame;

use super::channel::ChannelId;

/// Host-side operations on relay frames.
///
/// # Example
///
/// ```ignore
/// struct DomEmbedder { /* handle to the document */ }
///
/// impl RelayEmbedder for DomEmbedder {
///     fn embed(&mut self, frame: &RelayFrame) -> TransportResult<()> {
///         // create a hidden frame with `frame.element_id` and `frame.src`
///         Ok(())
///     }
///     fn dispatch(&mut self, id: ChannelId, message: &str) -> TransportResult<()> {
///         // call the relay's send entry point with `message`
///         Ok(())
///     }
///     fn remove(&mut self, id: ChannelId) {
///         // detach the frame from its parent
///     }
/// }
/// ```
pub trait RelayEmbedder {
    /// Embed a relay frame and start navigating it to `frame.src`.
    ///
    /// Returns before the relay has loaded.
    fn embed(&mut self, frame: &RelayFrame) -> TransportResult<()>;

    /// Post an encoded request into a channel's relay.
    fn dispatch(&mut self, id: ChannelId, message: &str) -> TransportResult<()>;

    /// Remove a channel's relay frame. Unknown ids are ignored.
    fn remove(&mut self, id: ChannelId);
}

/// In-memory embedder that records every operation.
///
/// Used by the command-line tool and by tests to stand in for a document.
#[derive(Debug, Default)]
pub struct MemoryEmbedder {
    frames: BTreeMap<ChannelId, RelayFrame>,
    dispatched: Vec<(ChannelId, String)>,
    removed: Vec<ChannelId>,
}

impl MemoryEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live frame for a channel.
    pub fn frame(&self, id: ChannelId) -> Option<&RelayFrame> {
        self.frames.get(&id)
    }

    /// Whether a channel's frame is still embedded.
    pub fn is_embedded(&self, id: ChannelId) -> bool {
        self.frames.contains_key(&id)
    }

    /// Number of live frames.
    pub fn embedded_count(&self) -> usize {
        self.frames.len()
    }

    /// All messages dispatched so far, in order.
    pub fn dispatched(&self) -> &[(ChannelId, String)] {
        &self.dispatched
    }

    /// The most recent message dispatched to a channel.
    pub fn last_dispatch(&self, id: ChannelId) -> Option<&str> {
        self.dispatched
            .iter()
            .rev()
            .find(|(channel, _)| *channel == id)
            .map(|(_, message)| message.as_str())
    }

    /// Channels whose frames were removed, in order.
    pub fn removed(&self) -> &[ChannelId] {
        &self.removed
    }
}

impl RelayEmbedder for MemoryEmbedder {
    fn embed(&mut self, frame: &RelayFrame) -> TransportResult<()> {
        if self.frames.contains_key(&frame.channel_id) {
            return Err(TransportError::Embed {
                message: format!("element '{}' already embedded", frame.element_id),
            });
        }
        debug!(element_id = %frame.element_id, src = %frame.src, "Embedding relay frame");
        self.frames.insert(frame.channel_id, frame.clone());
        Ok(())
    }

    fn dispatch(&mut self, id: ChannelId, message: &str) -> TransportResult<()> {
        if !self.frames.contains_key(&id) {
            return Err(TransportError::Embed {
                message: format!("no relay frame for channel {}", id),
            });
        }
        self.dispatched.push((id, message.to_string()));
        Ok(())
    }

    fn remove(&mut self, id: ChannelId) {
        if self.frames.remove(&id).is_some() {
            self.removed.push(id);
        }
    }
}
