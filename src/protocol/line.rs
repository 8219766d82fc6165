//! Incremental decoding of newline-terminated command lines
//!
//! Inbound bytes arrive in arbitrary chunks; a command only exists once its
//! terminating `\n` does. The codec accumulates bytes per connection and
//! yields complete lines, keeping any trailing fragment buffered for the
//! next read.

use bytes::BytesMut;

use crate::error::{RelayError, Result};

/// Maximum bytes a single line may occupy in the inbound buffer (16 KB)
pub const DEFAULT_MAX_LINE_BYTES: usize = 16 * 1024;

/// Streaming decoder for `\n`-delimited UTF-8 command lines
#[derive(Debug)]
pub struct LineCodec {
    buffer: BytesMut,
    max_line_bytes: usize,
}

impl LineCodec {
    /// Create a new codec with the default line limit
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MAX_LINE_BYTES)
    }

    /// Create a new codec with a custom line limit
    pub fn with_limit(max_line_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(1024),
            max_line_bytes,
        }
    }

    /// Feed newly-read bytes into the codec
    pub fn feed(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to decode the next complete command line
    ///
    /// Returns `Ok(Some(line))` for a complete, trimmed, non-empty line,
    /// `Ok(None)` if more data is needed. Lines that are empty after
    /// trimming are discarded. Invalid UTF-8 is replaced rather than
    /// rejected, so a bad byte sequence degrades only the offending line.
    /// Errors if the buffer fills past the line limit with no terminator.
    pub fn decode_next(&mut self) -> Result<Option<String>> {
        loop {
            let newline = self.buffer.iter().position(|&b| b == b'\n');

            let idx = match newline {
                Some(idx) => idx,
                None => {
                    if self.buffer.len() > self.max_line_bytes {
                        return Err(RelayError::decode(format!(
                            "line exceeds {} bytes without terminator",
                            self.max_line_bytes
                        )));
                    }
                    return Ok(None);
                }
            };

            if idx > self.max_line_bytes {
                return Err(RelayError::decode(format!(
                    "line exceeds {} bytes",
                    self.max_line_bytes
                )));
            }

            // Consume the line and its terminator; a multi-byte character
            // split across reads only ever sits in the unconsumed tail.
            let raw = self.buffer.split_to(idx + 1);
            let line = String::from_utf8_lossy(&raw[..idx]);
            let trimmed = line.trim();

            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
            // Blank line: skip it and keep scanning the buffer.
        }
    }

    /// Bytes currently buffered without a terminator
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}
