//! Incremental line splitting for the plotting protocol
//!
//! Reads may split a line across many chunks or carry several lines at once.
//! [`LineBuffer`] keeps the unterminated tail between reads and hands out one
//! complete line at a time.

use plotkit_core::CommandError;

/// Default upper bound for a single protocol line, in bytes
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Accumulates raw bytes and yields newline-terminated lines
#[derive(Debug)]
pub struct LineBuffer {
    buffer: Vec<u8>,
    max_line_length: usize,
    /// Set after an overlong line was reported; bytes are dropped up to the next newline
    discarding: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

impl LineBuffer {
    /// Create a buffer that rejects lines longer than `max_line_length` bytes
    pub fn new(max_line_length: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line_length,
            discarding: false,
        }
    }

    /// Append freshly read bytes
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Take the next complete line, without its `\n`
    ///
    /// Returns `None` when no complete line is buffered. Lines that are not UTF-8 or
    /// that exceed the length limit come back as errors and are consumed.
    pub fn next_line(&mut self) -> Option<Result<String, CommandError>> {
        loop {
            let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
                return self.check_unterminated();
            };

            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            line.pop();

            if std::mem::take(&mut self.discarding) {
                // Tail of a line already reported as too long
                continue;
            }

            if line.len() > self.max_line_length {
                return Some(Err(CommandError::LineTooLong {
                    limit: self.max_line_length,
                }));
            }

            let len = line.len();
            return Some(
                String::from_utf8(line).map_err(|_| CommandError::InvalidEncoding { len }),
            );
        }
    }

    fn check_unterminated(&mut self) -> Option<Result<String, CommandError>> {
        if self.discarding {
            self.buffer.clear();
            return None;
        }

        if self.buffer.len() > self.max_line_length {
            self.buffer.clear();
            self.discarding = true;
            return Some(Err(CommandError::LineTooLong {
                limit: self.max_line_length,
            }));
        }

        None
    }

    /// Bytes of an unterminated line currently held
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}
