//! Channel initialization target.
//!
//! The relay document is loaded from the client URI with a fragment that
//! carries the channel id and the server origin:
//! `<client>#<id>:init:id=<id>&server=<encoded server>`.

use crate::transport::ChannelId;

use super::wire::encode_component;

/// Inline style that keeps the relay frame out of view.
pub const RELAY_FRAME_STYLE: &str =
    "position: absolute; top: 0px; left: 0px; width: 1px; height: 1px; visibility: hidden;";

const RELAY_FRAME_WIDTH: u32 = 400;
const RELAY_FRAME_HEIGHT: u32 = 400;

/// Build the initialization URI for a channel.
pub fn init_uri(client_uri: &str, id: ChannelId, server_uri: &str) -> String {
    format!(
        "{client_uri}#{id}:init:id={id}&server={}",
        encode_component(server_uri)
    )
}

/// Description of the hidden relay frame to embed for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayFrame {
    /// Channel the frame belongs to.
    pub channel_id: ChannelId,
    /// Element id the frame is registered under.
    pub element_id: String,
    /// Initialization URI the frame navigates to.
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub style: &'static str,
}

impl RelayFrame {
    /// Describe the relay frame for a channel.
    pub fn new(id: ChannelId, client_uri: &str, server_uri: &str) -> Self {
        Self {
            channel_id: id,
            element_id: Self::element_id_for(id),
            src: init_uri(client_uri, id, server_uri),
            width: RELAY_FRAME_WIDTH,
            height: RELAY_FRAME_HEIGHT,
            style: RELAY_FRAME_STYLE,
        }
    }

    /// Element id used for a channel's frame.
    pub fn element_id_for(id: ChannelId) -> String {
        format!("clientFrame_{id}")
    }
}
