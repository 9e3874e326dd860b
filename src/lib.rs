//! XDA Transport Library
//!
//! This crate tunnels HTTP-style request/response exchanges through a hidden
//! relay document hosted on the server's origin. The caller embeds the relay,
//! posts an encoded request into it, and receives the encoded response back.

pub mod audit;
pub mod config;
pub mod error;
pub mod exchange;
pub mod protocol;
pub mod transport;
