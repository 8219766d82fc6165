//! Chat relay server: accept loop and serialized command handling
//!
//! The server runs one accept loop and one event-processing task. Every
//! connection's reader funnels into the same event channel, and the event
//! task exclusively owns all session and room state, so command handlers
//! never execute concurrently and the registries need no locking. The only
//! work that leaves the event task is outbound delivery, which goes through
//! per-connection queues and cannot block it.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{RelayError, Result};
use crate::protocol::{Command, Reply};
use crate::RelayConfig;

use super::connection::{run_connection, OutboundHandle, ServerEvent};
use super::registry::{ConnId, SessionRegistry};
use super::rooms::RoomDirectory;

/// Line-oriented TCP chat relay server
pub struct RelayServer {
    config: RelayConfig,
}

impl RelayServer {
    /// Create a new server with the given configuration
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    /// Create with default configuration
    pub fn with_defaults() -> Self {
        Self::new(RelayConfig::default())
    }

    /// Bind the configured address and serve forever
    pub async fn start(&mut self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| {
                RelayError::network(format!("failed to bind {}: {}", self.config.bind_addr, e))
            })?;

        info!("Relay listening on {}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Serve connections from a pre-bound listener
    ///
    /// Split out from [`start`](Self::start) so callers can bind port 0 and
    /// discover the address themselves.
    pub async fn serve(&mut self, listener: TcpListener) -> Result<()> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        // The one task allowed to touch session and room state.
        tokio::spawn(process_events(event_rx));

        let max_line_bytes = self.config.max_line_bytes;
        let mut next_conn_id: ConnId = 1;

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let conn_id = next_conn_id;
                    next_conn_id += 1;

                    debug!("Accepted connection {} from {}", conn_id, addr);
                    let event_tx = event_tx.clone();
                    tokio::spawn(run_connection(
                        conn_id,
                        stream,
                        addr,
                        event_tx,
                        max_line_bytes,
                    ));
                }
                Err(e) => {
                    // One failed accept must not take the server down.
                    warn!("Accept failed: {}", e);
                }
            }
        }
    }
}

/// Drain the event channel, applying each event to the relay state
async fn process_events(mut event_rx: mpsc::UnboundedReceiver<ServerEvent>) {
    let mut state = RelayState::new();
    while let Some(event) = event_rx.recv().await {
        state.handle_event(event);
    }
}

/// All mutable relay state, owned by the event-processing task
struct RelayState {
    sessions: SessionRegistry,
    rooms: RoomDirectory,
    outbound: HashMap<ConnId, OutboundHandle>,
}

impl RelayState {
    fn new() -> Self {
        Self {
            sessions: SessionRegistry::new(),
            rooms: RoomDirectory::new(),
            outbound: HashMap::new(),
        }
    }

    /// Apply one event; all mutation is synchronous within this call
    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected {
                conn_id,
                addr,
                outbound,
            } => self.handle_connected(conn_id, addr, outbound),
            ServerEvent::Command { conn_id, command } => self.handle_command(conn_id, command),
            ServerEvent::Disconnected { conn_id } => self.disconnect(conn_id),
        }
    }

    fn handle_connected(&mut self, conn_id: ConnId, addr: SocketAddr, outbound: OutboundHandle) {
        self.outbound.insert(conn_id, outbound);
        let session = self.sessions.insert(conn_id);
        info!(
            "Client {} connected from {} as {}",
            conn_id, addr, session.nickname
        );
    }

    fn handle_command(&mut self, conn_id: ConnId, command: Command) {
        // Commands decoded before a /bye can still be queued behind it;
        // once the session is gone they are dropped.
        if self.sessions.get(conn_id).is_none() {
            return;
        }

        match command {
            Command::Broadcast(text) => self.handle_broadcast(conn_id, &text),
            Command::Leave => self.handle_leave(conn_id),
            Command::Nick(name) => self.handle_nick(conn_id, &name),
            Command::Join(room) => self.handle_join(conn_id, &room),
            Command::Bye => self.handle_bye(conn_id),
            Command::Priv { to, text } => self.handle_priv(conn_id, &to, &text),
            Command::Invalid(detail) => self.send(conn_id, &Reply::error(detail)),
        }
    }

    /// Join a room, leaving the current one first
    fn handle_join(&mut self, conn_id: ConnId, room: &str) {
        // Re-join semantics: an existing membership is released with the
        // full Leave transition, replies included, before joining.
        if self.sessions.current_room(conn_id).is_some() {
            self.leave_room(conn_id);
        }

        self.rooms.join(room, conn_id);
        self.sessions.set_room(conn_id, room);
        self.send(conn_id, &Reply::joined_room(room));

        let nickname = self.nickname_of(conn_id);
        self.broadcast_to_others(room, conn_id, &Reply::Joined(nickname));
        debug!("Client {} joined room {}", conn_id, room);
    }

    fn handle_leave(&mut self, conn_id: ConnId) {
        if !self.leave_room(conn_id) {
            self.send(conn_id, &Reply::not_in_room());
        }
    }

    /// Change nickname, rejecting names other live sessions hold
    fn handle_nick(&mut self, conn_id: ConnId, name: &str) {
        // Exact-match uniqueness; renaming to your own current name is
        // allowed. The /priv lookup is case-insensitive, this check is
        // not — both behaviors are preserved as observed.
        if self.sessions.is_nickname_taken(name, conn_id) {
            self.send(conn_id, &Reply::nickname_in_use());
            return;
        }

        let Some(old) = self.sessions.rename(conn_id, name) else {
            return;
        };
        self.send(conn_id, &Reply::nickname_changed(name));

        if let Some(room) = self.sessions.current_room(conn_id).map(str::to_string) {
            self.broadcast_to_others(
                &room,
                conn_id,
                &Reply::NewNick {
                    old,
                    new: name.to_string(),
                },
            );
        }
        debug!("Client {} is now known as {}", conn_id, name);
    }

    /// Broadcast to the sender's room, echoing the line back to the sender
    fn handle_broadcast(&mut self, conn_id: ConnId, text: &str) {
        let Some(room) = self.sessions.current_room(conn_id).map(str::to_string) else {
            self.send(conn_id, &Reply::not_in_room());
            return;
        };

        let message = Reply::Message {
            nick: self.nickname_of(conn_id),
            text: text.to_string(),
        };
        self.broadcast_to_others(&room, conn_id, &message);
        // The sender hears its own message exactly once, as this echo.
        self.send(conn_id, &message);
    }

    /// Deliver a private message to a nickname, matched case-insensitively
    fn handle_priv(&mut self, conn_id: ConnId, to: &str, text: &str) {
        let Some(target) = self.sessions.resolve_nickname(to) else {
            self.send(conn_id, &Reply::user_not_found(to));
            return;
        };

        self.send(
            target,
            &Reply::Private {
                from: self.nickname_of(conn_id),
                text: text.to_string(),
            },
        );
        self.send(
            conn_id,
            &Reply::PrivateEcho {
                to: to.to_string(),
                text: text.to_string(),
            },
        );
    }

    fn handle_bye(&mut self, conn_id: ConnId) {
        debug!("Client {} said goodbye", conn_id);
        self.disconnect(conn_id);
    }

    /// Tear down a connection: leave its room, release its nickname, drop
    /// its outbound queue
    ///
    /// Reached from the command path (/bye) and from the transport error
    /// path; a second arrival finds nothing left and does nothing.
    fn disconnect(&mut self, conn_id: ConnId) {
        if self.sessions.get(conn_id).is_none() {
            return;
        }

        self.leave_room(conn_id);
        self.sessions.remove(conn_id);
        // Dropping the handle lets the writer flush queued replies, then
        // close the socket.
        self.outbound.remove(&conn_id);
        info!("Client {} disconnected", conn_id);
    }

    /// Full Leave transition; returns false when the session has no room
    ///
    /// Ordering: membership is removed (deleting the room once empty), the
    /// remaining members hear `LEFT`, and the leaver gets its `OK`.
    fn leave_room(&mut self, conn_id: ConnId) -> bool {
        let Some(room) = self.sessions.current_room(conn_id).map(str::to_string) else {
            return false;
        };

        self.rooms.leave(&room, conn_id);
        self.sessions.clear_room(conn_id);

        let nickname = self.nickname_of(conn_id);
        self.broadcast_to_others(&room, conn_id, &Reply::Left(nickname));
        self.send(conn_id, &Reply::left_room(&room));
        debug!("Client {} left room {}", conn_id, room);
        true
    }

    fn nickname_of(&self, conn_id: ConnId) -> String {
        self.sessions
            .nickname(conn_id)
            .unwrap_or_default()
            .to_string()
    }

    /// Queue one reply for a single connection
    fn send(&self, conn_id: ConnId, reply: &Reply) {
        let Some(handle) = self.outbound.get(&conn_id) else {
            return;
        };
        if let Err(e) = handle.send_line(reply.to_string()) {
            // Confined to this connection; it gets reaped by its own
            // Disconnected event.
            warn!("Failed to queue reply for connection {}: {}", conn_id, e);
        }
    }

    /// Queue one reply for every room member except the sender
    ///
    /// The member list is a snapshot taken here, under the event task, so
    /// a concurrent join or leave cannot change the recipient set of an
    /// in-flight broadcast. A failed queue push skips only that recipient.
    fn broadcast_to_others(&self, room: &str, sender: ConnId, reply: &Reply) {
        for member in self.rooms.members_except(room, sender) {
            self.send(member, reply);
        }
    }
}
