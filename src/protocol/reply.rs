//! Server-to-client response grammar
//!
//! Every reply is one newline-delimited line; [`Reply`]'s `Display` impl
//! produces the exact wire form. The sender half appends the terminator.

use std::fmt;

/// One server reply line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `OK <detail>` — command acknowledged
    Ok(String),
    /// `ERROR: <detail>` — command rejected, connection stays open
    Error(String),
    /// `MESSAGE <nick>: <text>` — room broadcast (and sender echo)
    Message { nick: String, text: String },
    /// `PRIVATE <nick>: <text>` — private message, delivered to the target
    Private { from: String, text: String },
    /// `PRIVATE to <nick>: <text>` — private message confirmation to sender
    PrivateEcho { to: String, text: String },
    /// `JOINED <nick>` — a peer joined the room
    Joined(String),
    /// `LEFT <nick>` — a peer left the room
    Left(String),
    /// `NEWNICK <old> <new>` — a peer changed nickname
    NewNick { old: String, new: String },
}

impl Reply {
    /// `OK Joined room: <room>`
    pub fn joined_room(room: &str) -> Self {
        Reply::Ok(format!("Joined room: {}", room))
    }

    /// `OK Left room: <room>`
    pub fn left_room(room: &str) -> Self {
        Reply::Ok(format!("Left room: {}", room))
    }

    /// `OK Nickname changed to <name>`
    pub fn nickname_changed(name: &str) -> Self {
        Reply::Ok(format!("Nickname changed to {}", name))
    }

    /// Generic `ERROR: <detail>`
    pub fn error<T: Into<String>>(detail: T) -> Self {
        Reply::Error(detail.into())
    }

    /// `ERROR: You are not in any room.`
    pub fn not_in_room() -> Self {
        Reply::Error("You are not in any room.".to_string())
    }

    /// `ERROR: Nickname already in use.`
    pub fn nickname_in_use() -> Self {
        Reply::Error("Nickname already in use.".to_string())
    }

    /// `ERROR: User '<nick>' not found.`
    pub fn user_not_found(nick: &str) -> Self {
        Reply::Error(format!("User '{}' not found.", nick))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok(detail) => write!(f, "OK {}", detail),
            Reply::Error(detail) => write!(f, "ERROR: {}", detail),
            Reply::Message { nick, text } => write!(f, "MESSAGE {}: {}", nick, text),
            Reply::Private { from, text } => write!(f, "PRIVATE {}: {}", from, text),
            Reply::PrivateEcho { to, text } => write!(f, "PRIVATE to {}: {}", to, text),
            Reply::Joined(nick) => write!(f, "JOINED {}", nick),
            Reply::Left(nick) => write!(f, "LEFT {}", nick),
            Reply::NewNick { old, new } => write!(f, "NEWNICK {} {}", old, new),
        }
    }
}
