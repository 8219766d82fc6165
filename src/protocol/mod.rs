//! Wire protocol: line framing, command classification, reply grammar
//!
//! The protocol is UTF-8 text, one command or reply per `\n`-terminated
//! line. This module is transport-agnostic; the server wires it to TCP.

pub mod command;
pub mod line;
pub mod reply;

pub use command::Command;
pub use line::{LineCodec, DEFAULT_MAX_LINE_BYTES};
pub use reply::Reply;
