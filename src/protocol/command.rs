//! Classification of decoded command lines
//!
//! A line is dispatched on its first space-delimited token, matched exactly:
//! `/nickname` is not `/nick` and falls through to a plain broadcast, as
//! does any other line with no recognized leading token. Parsing is total —
//! malformed arguments classify to [`Command::Invalid`] carrying the error
//! detail to send back, so the caller never needs a second validation pass.

/// One client command, classified from a single decoded line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Broadcast text to the sender's current room
    ///
    /// Covers both plain lines and the `//` escape, which strips exactly
    /// one slash so that `//join` broadcasts the literal text `/join`.
    Broadcast(String),
    /// `/leave` — leave the current room
    Leave,
    /// `/nick <name>` — change nickname
    Nick(String),
    /// `/join <room>` — join a room, leaving the current one first
    Join(String),
    /// `/bye` — disconnect
    Bye,
    /// `/priv <user> <message>` — private message by nickname
    Priv { to: String, text: String },
    /// A recognized command with malformed arguments; the payload is the
    /// `ERROR:` detail to reply with
    Invalid(String),
}

impl Command {
    /// Classify one trimmed, non-empty line
    pub fn parse(line: &str) -> Command {
        if line.starts_with("//") {
            return Command::Broadcast(line[1..].to_string());
        }

        let (head, rest) = match line.split_once(' ') {
            Some((head, rest)) => (head, rest),
            None => (line, ""),
        };

        match head {
            "/leave" => Command::Leave,
            "/bye" => Command::Bye,
            "/nick" => {
                let name = rest.trim();
                if name.is_empty() {
                    Command::Invalid("Nickname cannot be empty.".to_string())
                } else {
                    Command::Nick(name.to_string())
                }
            }
            "/join" => {
                let room = rest.trim();
                if room.is_empty() {
                    Command::Invalid("Room name required.".to_string())
                } else {
                    Command::Join(room.to_string())
                }
            }
            "/priv" => parse_priv(line),
            _ => Command::Broadcast(line.to_string()),
        }
    }
}

/// Split `/priv <user> <message>` into its three fields
///
/// The message field is taken verbatim (apart from trimming), so it may
/// contain spaces.
fn parse_priv(line: &str) -> Command {
    let mut fields = line.splitn(3, ' ');
    fields.next(); // the "/priv" token itself

    let (user, message) = match (fields.next(), fields.next()) {
        (Some(user), Some(message)) => (user, message),
        _ => {
            return Command::Invalid(
                "Invalid private message format. Usage: /priv <username> <message>".to_string(),
            );
        }
    };

    let to = user.trim();
    let text = message.trim();
    if to.is_empty() || text.is_empty() {
        return Command::Invalid("Recipient name and message cannot be empty.".to_string());
    }

    Command::Priv {
        to: to.to_string(),
        text: text.to_string(),
    }
}
