//! Line- and length-oriented reads over a byte source.
//!
//! # Design
//! `ByteCursor` wraps any `BufRead` and only ever consumes what a caller
//! asks for: one terminated line, exactly `n` bytes, or everything left.
//! Look-ahead goes through `fill_buf`, so bytes that follow a message stay in
//! the source's own buffer and are visible to whoever reads it next. Pass
//! `&mut reader` to keep using the source after the cursor is gone.

use std::io::{self, BufRead, Read};

use crate::error::ParseError;

/// Counting reader that splits a source into lines and exact-length runs.
#[derive(Debug, Clone)]
pub struct ByteCursor<R> {
    inner: R,
    consumed: u64,
    lines: usize,
    allow_bare_lf: bool,
}

impl<R: BufRead> ByteCursor<R> {
    /// Cursor that accepts both `CRLF` and bare `LF` terminators.
    pub fn new(inner: R) -> Self {
        Self::with_line_endings(inner, true)
    }

    pub fn with_line_endings(inner: R, allow_bare_lf: bool) -> Self {
        Self {
            inner,
            consumed: 0,
            lines: 0,
            allow_bare_lf,
        }
    }

    /// Total bytes taken from the source so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Lines returned by `read_line` so far.
    pub fn lines_read(&self) -> usize {
        self.lines
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn advance(&mut self, n: usize) {
        self.inner.consume(n);
        self.consumed += n as u64;
    }

    /// Next line without its terminator, or `None` at end of source.
    ///
    /// An empty line is `Some(vec![])`. A final line without a terminator is
    /// returned as-is, and a `CR` as the very last byte counts as one.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>, ParseError> {
        let mut line = Vec::new();
        let mut started = false;

        loop {
            let (used, terminator) = {
                let buf = match self.inner.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                };
                if buf.is_empty() {
                    if !started {
                        return Ok(None);
                    }
                    self.lines += 1;
                    return Ok(Some(line));
                }
                started = true;
                match memchr::memchr2(b'\r', b'\n', buf) {
                    Some(i) => {
                        line.extend_from_slice(&buf[..i]);
                        (i + 1, Some(buf[i]))
                    }
                    None => {
                        line.extend_from_slice(buf);
                        (buf.len(), None)
                    }
                }
            };
            self.advance(used);

            match terminator {
                None => continue,
                Some(b'\n') => {
                    self.lines += 1;
                    if !self.allow_bare_lf {
                        return Err(ParseError::InvalidLineEnding { line: self.lines });
                    }
                    return Ok(Some(line));
                }
                Some(_) => {
                    self.lines += 1;
                    return match self.peek_byte()? {
                        None => Ok(Some(line)),
                        Some(b'\n') => {
                            self.advance(1);
                            Ok(Some(line))
                        }
                        Some(_) => Err(ParseError::InvalidLineEnding { line: self.lines }),
                    };
                }
            }
        }
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, ParseError> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Exactly `n` bytes, or `TruncatedInput` if the source ends first.
    pub fn read_exact(&mut self, n: u64) -> Result<Vec<u8>, ParseError> {
        let mut bytes = Vec::with_capacity(n.min(64 * 1024) as usize);
        let received = self.by_ref().take(n).read_to_end(&mut bytes)? as u64;
        if received < n {
            return Err(ParseError::TruncatedInput {
                expected: n,
                received,
            });
        }
        Ok(bytes)
    }

    /// Everything left in the source.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>, ParseError> {
        let mut bytes = Vec::new();
        Read::read_to_end(self, &mut bytes)?;
        Ok(bytes)
    }
}

impl<R: BufRead> Read for ByteCursor<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}
