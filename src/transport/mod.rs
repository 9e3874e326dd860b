//! Relay transport module.
//!
//! Drives exchanges through hidden relay documents: one channel per exchange,
//! created on initialize, used by one send, released after the response.
//!
//! ## Lifecycle
//!
//! ```text
//! initialize -> CREATED --send--> ACTIVE --receive--> CLOSED
//! ```

mod channel;
mod completion;
mod driver;
mod embedder;
mod watchdog;

pub use channel::{ChannelId, ChannelPhase, TeardownPolicy};
pub use completion::Completion;
pub use driver::{Transport, TIMEOUT_MESSAGE};
pub use embedder::{MemoryEmbedder, RelayEmbedder};
pub use watchdog::{send_with_timeout, spawn_response_timeout, SharedTransport};
