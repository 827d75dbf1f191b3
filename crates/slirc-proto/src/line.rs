//! CRLF line codec for tokio.
//!
//! Decoding yields lines without their terminator. A bare `\n` is accepted
//! as a terminator and a trailing `\r` is stripped. Invalid UTF-8 is
//! decoded lossily. Lines longer than the inbound limit are discarded and
//! decoding resumes at the next terminator, so one bad line never ends the
//! stream.
//!
//! Encoding writes the sanitized line followed by CRLF.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::encode;
use crate::error::{self, ProtocolError};

/// Default inbound line limit. Servers may exceed the 512-byte wire limit
/// (tags, long numerics), so inbound is more permissive than outbound.
pub const MAX_INBOUND_LINE_LEN: usize = 8191;

/// Line-based codec for CRLF-terminated IRC lines.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum inbound line length
    max_len: usize,
    /// Skipping the remainder of an overlong line
    discarding: bool,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    /// Codec with the default inbound limit.
    pub fn new() -> Self {
        Self::with_max_len(MAX_INBOUND_LINE_LEN)
    }

    /// Codec with a custom inbound limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
            discarding: false,
        }
    }

    /// The inbound limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if src.len() > self.max_len {
                    if !self.discarding {
                        warn!(limit = self.max_len, "discarding overlong inbound line");
                    }
                    self.discarding = true;
                    src.clear();
                    self.next_index = 0;
                } else {
                    self.next_index = src.len();
                }
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.len() > self.max_len {
                warn!(len = line.len(), limit = self.max_len, "discarding overlong inbound line");
                continue;
            }

            let text = String::from_utf8_lossy(&line);
            let text = text.trim_end_matches(['\r', '\n']);
            return Ok(Some(text.to_owned()));
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        match self.decode(src)? {
            Some(line) => Ok(Some(line)),
            None => {
                // An unterminated final line is dropped.
                src.clear();
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: String, dst: &mut BytesMut) -> error::Result<()> {
        let line = encode::sanitize(&msg);
        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
