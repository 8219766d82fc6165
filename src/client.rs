//! Thin wire-protocol client
//!
//! Sends command lines and reads reply lines, nothing more. The relay
//! treats clients as opaque byte-stream peers; this one exists so tests
//! and tooling have something that speaks the protocol. Rendering replies
//! is a consumer concern and stays out of this crate.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};

use crate::error::{RelayError, Result};

/// A connected line-protocol client
pub struct RelayClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl RelayClient {
    /// Connect to a relay server
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| RelayError::network(format!("failed to connect: {}", e)))?;

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }

    /// Send one command line, appending the terminator
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let mut payload = line.as_bytes().to_vec();
        payload.push(b'\n');
        self.writer.write_all(&payload).await?;
        Ok(())
    }

    /// Read the next reply line, without its terminator
    ///
    /// Returns `Ok(None)` once the server closes the connection.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(|c| c == '\n' || c == '\r').to_string()))
    }

    /// Close the outbound half of the connection
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}
