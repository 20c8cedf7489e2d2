//! Pattern buffer with tail-search prompt detection.
//!
//! Only the last `search_depth` bytes are searched for prompts, which keeps
//! matching cheap on long outputs such as `show running-config`.

use bytes::BytesMut;
use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Buffer for accumulating cleaned device output.
///
/// Incoming bytes are passed through a VT parser: printable text and
/// newlines/tabs are kept, escape sequences and carriage returns are
/// dropped, and backspaces erase the previous character.
pub struct PatternBuffer {
    parser: Parser,
    sink: Sink,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,
}

#[derive(Default)]
struct Sink {
    buffer: BytesMut,
}

impl Perform for Sink {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.buffer.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            b'\n' | b'\t' => self.buffer.extend_from_slice(&[byte]),
            0x08 => {
                if let Some(pos) = self.buffer.iter().rposition(|b| (*b & 0xC0) != 0x80) {
                    self.buffer.truncate(pos);
                }
            }
            _ => {}
        }
    }
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            parser: Parser::new(),
            sink: Sink {
                buffer: BytesMut::with_capacity(4096),
            },
            search_depth,
        }
    }

    /// Extend the buffer with raw device output.
    pub fn extend(&mut self, data: &[u8]) {
        self.parser.advance(&mut self.sink, data);
    }

    /// Search only the tail of the buffer for the pattern.
    pub fn search_tail(&self, pattern: &Regex) -> Option<regex::bytes::Match<'_>> {
        let buffer = &self.sink.buffer;
        let start = buffer.len().saturating_sub(self.search_depth);
        pattern.find(&buffer[start..])
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        self.sink.buffer.split().to_vec()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}
