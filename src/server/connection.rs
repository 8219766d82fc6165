//! Per-connection I/O tasks
//!
//! Each accepted socket is split into a reader task and a writer task. The
//! reader turns inbound bytes into [`ServerEvent`]s on the server's event
//! channel; the writer drains the connection's outbound queue onto the
//! socket. Neither task touches session or room state — all mutation stays
//! on the server's event-processing task.

use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{RelayError, Result};
use crate::protocol::{Command, LineCodec};

use super::registry::ConnId;

/// Events flowing from connection tasks to the event-processing task
#[derive(Debug)]
pub enum ServerEvent {
    /// A connection was accepted and its outbound queue is ready
    Connected {
        conn_id: ConnId,
        addr: SocketAddr,
        outbound: OutboundHandle,
    },
    /// One complete command line arrived on a connection
    Command { conn_id: ConnId, command: Command },
    /// The connection reached end-of-stream or failed
    Disconnected { conn_id: ConnId },
}

/// Non-blocking send half of one connection's outbound queue
///
/// Held by the event-processing task; the paired writer task appends the
/// line terminator and performs the actual socket write. Dropping the
/// handle lets the writer flush whatever is queued and then close the
/// socket.
#[derive(Debug, Clone)]
pub struct OutboundHandle {
    tx: mpsc::UnboundedSender<String>,
}

impl OutboundHandle {
    /// Create a handle and the receiver its writer task drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue one reply line (without terminator) for delivery
    pub fn send_line(&self, line: String) -> Result<()> {
        self.tx
            .send(line)
            .map_err(|_| RelayError::connection("outbound queue closed"))
    }
}

/// Drive one accepted connection until either half stops
///
/// Registers the connection with the event task, then runs the reader and
/// writer. The `Connected` event is queued before the first read, and the
/// event channel is ordered, so the session exists by the time any command
/// from this socket is processed.
pub(crate) async fn run_connection(
    conn_id: ConnId,
    stream: TcpStream,
    addr: SocketAddr,
    event_tx: mpsc::UnboundedSender<ServerEvent>,
    max_line_bytes: usize,
) {
    let (read_half, write_half) = stream.into_split();
    let (outbound, out_rx) = OutboundHandle::channel();

    if event_tx
        .send(ServerEvent::Connected {
            conn_id,
            addr,
            outbound,
        })
        .is_err()
    {
        // Server shut down before this connection got going.
        return;
    }

    let mut writer = tokio::spawn(write_loop(conn_id, write_half, out_rx));
    let mut reader = tokio::spawn(read_loop(conn_id, read_half, event_tx.clone(), max_line_bytes));

    // Whichever half stops first ends the connection. A finished writer
    // means the server released the connection (or a write failed); a
    // finished reader means the peer is gone. Either way the other half
    // has no one left to talk to.
    tokio::select! {
        _ = &mut writer => reader.abort(),
        _ = &mut reader => writer.abort(),
    }

    let _ = event_tx.send(ServerEvent::Disconnected { conn_id });
}

/// Read available bytes, decode command lines, forward them as events
///
/// Ends on end-of-stream, read error, or a decode error (oversized line);
/// every exit path is reported to the event task by `run_connection`.
async fn read_loop(
    conn_id: ConnId,
    mut read_half: OwnedReadHalf,
    event_tx: mpsc::UnboundedSender<ServerEvent>,
    max_line_bytes: usize,
) {
    let mut codec = LineCodec::with_limit(max_line_bytes);
    let mut chunk = vec![0u8; 4096];

    loop {
        let n = match read_half.read(&mut chunk).await {
            Ok(0) => {
                debug!("Connection {} reached end of stream", conn_id);
                return;
            }
            Ok(n) => n,
            Err(e) => {
                debug!("Read failed on connection {}: {}", conn_id, e);
                return;
            }
        };

        codec.feed(&chunk[..n]);
        loop {
            match codec.decode_next() {
                Ok(Some(line)) => {
                    let command = Command::parse(&line);
                    if event_tx
                        .send(ServerEvent::Command { conn_id, command })
                        .is_err()
                    {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("Dropping connection {}: {}", conn_id, e);
                    return;
                }
            }
        }
    }
}

/// Drain the outbound queue onto the socket, one terminated line per entry
///
/// A write failure abandons only this connection; the queued backlog is
/// discarded and cleanup happens through the normal `Disconnected` path.
async fn write_loop(
    conn_id: ConnId,
    mut write_half: OwnedWriteHalf,
    mut out_rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(line) = out_rx.recv().await {
        let mut payload = line.into_bytes();
        payload.push(b'\n');

        if let Err(e) = write_half.write_all(&payload).await {
            warn!("Write failed on connection {}: {}", conn_id, e);
            return;
        }
    }
}
