//! Error handling for the chat relay

use std::fmt;

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Relay error types
#[derive(Debug, Clone)]
pub enum RelayError {
    /// Network-related errors (bind, accept, read, write)
    Network(String),
    /// Per-connection lifecycle errors
    Connection(String),
    /// Inbound line decoding errors
    Decode(String),
}

impl RelayError {
    /// Create a network error
    pub fn network<T: Into<String>>(msg: T) -> Self {
        RelayError::Network(msg.into())
    }

    /// Create a connection error
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        RelayError::Connection(msg.into())
    }

    /// Create a decode error
    pub fn decode<T: Into<String>>(msg: T) -> Self {
        RelayError::Decode(msg.into())
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Network(msg) => write!(f, "Network error: {}", msg),
            RelayError::Connection(msg) => write!(f, "Connection error: {}", msg),
            RelayError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {}

impl From<std::io::Error> for RelayError {
    fn from(err: std::io::Error) -> Self {
        RelayError::Network(format!("IO error: {}", err))
    }
}
