//! Forward-only line stream over the raw document text.
//!
//! The stream hands out lines one at a time and never moves backwards.
//! Newlines are located with `memchr` (SIMD on supported platforms) and a
//! trailing `\r` is stripped so CRLF input behaves like LF input.

use memchr::memchr;

/// Line-by-line reader with single-line lookahead.
///
/// Lines borrow from the input. Line numbers are 1-based and refer to the
/// line most recently returned by [`LineStream::next_line`].
#[derive(Debug, Clone)]
pub struct LineStream<'a> {
    input: &'a str,
    /// Byte offset of the next unread line.
    offset: usize,
    /// Number of lines consumed so far.
    line_number: u32,
}

impl<'a> LineStream<'a> {
    /// Create a stream over the given text.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line_number: 0,
        }
    }

    /// Whether at least one more line can be read.
    #[inline(always)]
    pub fn has_next(&self) -> bool {
        self.offset < self.input.len()
    }

    /// Number of lines consumed so far (the 1-based number of the last line read).
    #[inline(always)]
    pub fn line_number(&self) -> u32 {
        self.line_number
    }

    /// Return the next line without advancing.
    #[inline]
    pub fn peek_line(&self) -> Option<&'a str> {
        self.scan().map(|(line, _)| line)
    }

    /// Return the next line and advance past it.
    #[inline]
    pub fn next_line(&mut self) -> Option<&'a str> {
        let (line, next_offset) = self.scan()?;
        self.offset = next_offset;
        self.line_number += 1;
        Some(line)
    }

    /// Locate the line at the cursor, returning it with the offset of the line after it.
    #[inline(always)]
    fn scan(&self) -> Option<(&'a str, usize)> {
        if !self.has_next() {
            return None;
        }

        let bytes = self.input.as_bytes();
        let start = self.offset;
        let end = match memchr(b'\n', &bytes[start..]) {
            Some(pos) => start + pos,
            None => bytes.len(),
        };

        let text_end = if end > start && bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };
        let next_offset = if end < bytes.len() { end + 1 } else { end };

        // `start` is 0 or just past a '\n', `text_end` is at '\r', '\n' or the end of
        // input: all of them are char boundaries.
        Some((&self.input[start..text_end], next_offset))
    }
}
