//! Incremental UTF-8 decoding of a chunked body.
//!
//! Chunk boundaries are picked by the network, so a multi-byte character can
//! straddle two reads.  [`Utf8StreamDecoder`] holds the incomplete tail of one
//! chunk and completes it with the head of the next.  One decoder lives for the
//! whole of one request.

use crate::{Error, Result};

/// How to treat bytes that are not valid UTF-8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Replace each invalid sequence with U+FFFD.
    #[default]
    Lossy,
    /// Fail on the first invalid sequence.
    Strict,
}

/// A stateful UTF-8 decoder carried across reads.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    mode: DecodeMode,
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new(mode: DecodeMode) -> Self {
        Self {
            mode,
            pending: Vec::new(),
        }
    }

    /// Number of bytes held back waiting for the rest of a character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Decode the next chunk.
    ///
    /// Returns all text that is complete so far.  A trailing partial character
    /// is kept for the next call.
    pub fn decode(&mut self, chunk: &[u8]) -> Result<String> {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(chunk);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid)?);
                    match e.error_len() {
                        Some(bad) => {
                            if self.mode == DecodeMode::Strict {
                                return Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                ));
                            }
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// Flush at end of stream.
    ///
    /// Bytes still pending are an unterminated character.
    pub fn finish(&mut self) -> Result<String> {
        if self.pending.is_empty() {
            return Ok(String::new());
        }
        let held = std::mem::take(&mut self.pending);
        match self.mode {
            DecodeMode::Lossy => Ok(char::REPLACEMENT_CHARACTER.to_string()),
            DecodeMode::Strict => Err(Error::encoding(
                format!(
                    "Stream ended inside a multi-byte character ({} byte(s) pending)",
                    held.len()
                ),
                None,
            )),
        }
    }
}
