//! Line-oriented TCP chat relay
//!
//! Clients connect over TCP and speak a newline-delimited text protocol:
//! slash-prefixed commands to join rooms, change nicknames, or message a
//! user privately, with any other line broadcast to the sender's current
//! room. The server multiplexes all connections onto one serialized
//! event-processing task that owns every piece of session and room state.

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;

pub use client::RelayClient;
pub use error::{RelayError, Result};
pub use protocol::{Command, LineCodec, Reply};
pub use server::RelayServer;

use std::net::SocketAddr;

use protocol::DEFAULT_MAX_LINE_BYTES;

/// Relay server configuration
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Address the server listens on
    pub bind_addr: SocketAddr,
    /// Per-connection inbound buffer bound; a line growing past this
    /// disconnects the offending client
    pub max_line_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:7000".parse().unwrap(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}
