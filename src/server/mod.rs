//! Server-side components of the chat relay
//!
//! State lives in [`registry`] and [`rooms`], per-connection I/O in
//! [`connection`], and the accept loop plus the serialized command
//! handlers in [`relay`].

pub mod connection;
pub mod registry;
pub mod relay;
pub mod rooms;

pub use connection::{OutboundHandle, ServerEvent};
pub use registry::{ConnId, Session, SessionRegistry};
pub use relay::RelayServer;
pub use rooms::RoomDirectory;
