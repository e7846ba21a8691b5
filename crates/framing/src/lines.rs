use crate::Framer;
use core_types::Frame;

/// Line terminator appended to every outbound sentence.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Longest line kept in the buffer before it is discarded as garbage.
///
/// NMEA 0183 caps sentences at 82 characters; the extra headroom covers
/// devices that ignore the limit.
pub const DEFAULT_MAX_LINE_LEN: usize = 512;

/// Buffers input and emits a frame whenever a `\n` is encountered.
///
/// Frames keep their terminator (`\n` or `\r\n`); `Frame::text()` strips it.
/// Blank lines are dropped. A line that grows past `max_line_len` without a
/// terminator is discarded up to the next `\n`.
pub struct LineFramer {
    buffer: Vec<u8>,
    // Timestamp of the *first byte* currently in the buffer, so a completed
    // line carries the time it started arriving.
    start_timestamp_us: Option<u64>,
    max_line_len: usize,
    // Set while skipping the tail of an oversized line.
    discarding: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::with_max_line_len(DEFAULT_MAX_LINE_LEN)
    }

    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(128),
            start_timestamp_us: None,
            max_line_len,
            discarding: false,
        }
    }

    /// Number of bytes buffered for the current incomplete line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer for LineFramer {
    fn push(&mut self, bytes: &[u8], timestamp_us: u64) -> Vec<Frame> {
        let mut frames = Vec::new();

        for &b in bytes {
            if self.discarding {
                if b == b'\n' {
                    self.discarding = false;
                }
                continue;
            }

            if self.buffer.is_empty() {
                self.start_timestamp_us = Some(timestamp_us);
            }
            self.buffer.push(b);

            if b == b'\n' {
                let ts = self.start_timestamp_us.take().unwrap_or(timestamp_us);
                let frame = Frame::new_rx(std::mem::take(&mut self.buffer), ts);
                if !frame.is_blank() {
                    frames.push(frame);
                }
            } else if self.buffer.len() > self.max_line_len {
                self.buffer.clear();
                self.start_timestamp_us = None;
                self.discarding = true;
            }
        }

        frames
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.start_timestamp_us = None;
        self.discarding = false;
    }

    fn name(&self) -> &'static str {
        "Lines"
    }
}

/// Wrap a sentence in the line protocol framing.
pub fn encode_line(sentence: &str) -> Vec<u8> {
    let mut data = Vec::with_capacity(sentence.len() + LINE_TERMINATOR.len());
    data.extend_from_slice(sentence.as_bytes());
    data.extend_from_slice(LINE_TERMINATOR);
    data
}
