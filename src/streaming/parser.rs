//! Incremental NDJSON line splitter
//!
//! Accumulates body bytes as they arrive and hands out complete lines.
//! A line longer than the buffer limit is discarded up to its newline
//! rather than failing the stream.

use bytes::{Bytes, BytesMut};

/// Maximum buffered bytes for a single line (8MB)
pub const MAX_LINE_SIZE: usize = 8 * 1_048_576;

/// Splits a byte stream into newline-delimited lines
#[derive(Debug)]
pub struct LineParser {
    /// Bytes received but not yet returned as a line
    buffer: BytesMut,

    /// Set while skipping the rest of an oversized line
    discarding: bool,

    max_line_size: usize,
}

impl LineParser {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LINE_SIZE)
    }

    /// Create parser with a custom line size limit
    pub fn with_capacity(max_line_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            discarding: false,
            max_line_size,
        }
    }

    /// Append received bytes
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        if self.discarding {
            match bytes.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.discarding = false;
                    self.buffer.extend_from_slice(&bytes[pos + 1..]);
                }
                None => return,
            }
        } else {
            self.buffer.extend_from_slice(bytes);
        }

        if self.buffer.len() > self.max_line_size && !self.buffer.contains(&b'\n') {
            tracing::trace!(
                buffered = self.buffer.len(),
                limit = self.max_line_size,
                "discarding oversized stream line"
            );
            self.buffer.clear();
            self.discarding = true;
        }
    }

    /// Next complete line, without its terminator
    pub fn next_line(&mut self) -> Option<Bytes> {
        let pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let mut line = self.buffer.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            line.truncate(pos - 1);
        }
        Some(line.freeze())
    }

    /// Mark end of input so a final unterminated line becomes available
    pub fn finish(&mut self) {
        if self.discarding {
            self.discarding = false;
            self.buffer.clear();
        } else if !self.buffer.is_empty() {
            self.buffer.extend_from_slice(b"\n");
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(parser: &mut LineParser) -> Vec<String> {
        std::iter::from_fn(|| parser.next_line())
            .map(|line| String::from_utf8(line.to_vec()).unwrap())
            .collect()
    }

    #[test]
    fn test_complete_lines() {
        let mut parser = LineParser::new();
        parser.add_bytes(b"{\"a\":1}\n{\"b\":2}\n");
        assert_eq!(drain(&mut parser), vec!["{\"a\":1}", "{\"b\":2}"]);
        assert!(parser.buffer.is_empty());
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut parser = LineParser::new();
        parser.add_bytes(b"{\"resp");
        assert!(parser.next_line().is_none());
        parser.add_bytes(b"onse\":\"Hel\"}\n{\"x\"");
        assert_eq!(drain(&mut parser), vec!["{\"response\":\"Hel\"}"]);
        assert_eq!(parser.buffer.len(), 4);
    }

    #[test]
    fn test_crlf_terminators() {
        let mut parser = LineParser::new();
        parser.add_bytes(b"one\r\ntwo\r\n");
        assert_eq!(drain(&mut parser), vec!["one", "two"]);
    }

    #[test]
    fn test_finish_flushes_tail() {
        let mut parser = LineParser::new();
        parser.add_bytes(b"first\nlast");
        assert_eq!(drain(&mut parser), vec!["first"]);
        parser.finish();
        assert_eq!(drain(&mut parser), vec!["last"]);
        parser.finish();
        assert!(parser.next_line().is_none());
    }

    #[test]
    fn test_oversized_line_discarded() {
        let mut parser = LineParser::with_capacity(8);
        parser.add_bytes(b"0123456789");
        assert!(parser.buffer.is_empty());
        parser.add_bytes(b"abc\nok\n");
        assert_eq!(drain(&mut parser), vec!["ok"]);
    }

    #[test]
    fn test_clear() {
        let mut parser = LineParser::new();
        parser.add_bytes(b"partial");
        assert!(!parser.buffer.is_empty());
        parser.clear();
        assert!(parser.buffer.is_empty());
        assert!(!parser.discarding);
    }
}
