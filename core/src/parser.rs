//! Entry points that turn a byte source into a message.
//!
//! # Design
//! `RawHttp` holds only its `ParseOptions`; every call is an independent
//! pass over the source it is given. The pass is always the same: start
//! line, header block, URI (requests only), framing, then a body bound to
//! what is left of the source. Nothing after the header block is read
//! until the body is, and nothing past the body at all.
//!
//! The `_eagerly`, `_str` and `_file` variants finish by reading the body
//! and return messages that no longer refer to the source.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::body::{self, Body, Detached};
use crate::cursor::ByteCursor;
use crate::error::ParseError;
use crate::headers::HttpHeaders;
use crate::log;
use crate::message::{RawRequest, RawResponse};
use crate::options::ParseOptions;
use crate::start_line::{line_text, RequestLine, StatusLine};
use crate::uri;

/// HTTP/1.x message parser.
#[derive(Debug, Clone, Default)]
pub struct RawHttp {
    options: ParseOptions,
}

impl RawHttp {
    /// Parser with the default (lenient) options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn cursor<R: BufRead>(&self, source: R) -> ByteCursor<R> {
        ByteCursor::with_line_endings(source, self.options.allow_newline_without_return)
    }

    /// Parse a request, leaving its body in `source`.
    ///
    /// Pass `&mut reader` to keep using the source once the message and its
    /// body are done with.
    pub fn parse_request<R: BufRead>(&self, source: R) -> Result<RawRequest<R>, ParseError> {
        let mut cursor = self.cursor(source);
        let line = RequestLine::parse(line_text(&read_start_line(&mut cursor)?)?)?;
        let mut headers = HttpHeaders::parse(&mut cursor)?;
        let uri = uri::resolve(&line, &mut headers, &self.options)?;
        let framing = body::request_framing(&headers)?;
        log::debug!("request {line}: {} headers, body {framing:?}", headers.len());
        Ok(RawRequest::new(line, headers, uri, Body::framed(cursor, framing)))
    }

    pub fn parse_request_eagerly<R: BufRead>(
        &self,
        source: R,
    ) -> Result<RawRequest<Detached>, ParseError> {
        self.parse_request(source)?.eagerly()
    }

    pub fn parse_request_str(&self, text: &str) -> Result<RawRequest<Detached>, ParseError> {
        self.parse_request_eagerly(text.as_bytes())
    }

    /// Parse a request stored in a file. The file is closed on return.
    pub fn parse_request_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<RawRequest<Detached>, ParseError> {
        let file = File::open(path.as_ref())?;
        self.parse_request_eagerly(BufReader::new(file))
    }

    /// Parse a response, leaving its body in `source`.
    ///
    /// Without the request at hand a response is assumed not to answer a
    /// `HEAD` or `CONNECT`; use `parse_response_to` when it might.
    pub fn parse_response<R: BufRead>(&self, source: R) -> Result<RawResponse<R>, ParseError> {
        self.read_response(source, None)
    }

    /// Parse the response to a request made with `request_method`.
    pub fn parse_response_to<R: BufRead>(
        &self,
        source: R,
        request_method: &str,
    ) -> Result<RawResponse<R>, ParseError> {
        self.read_response(source, Some(request_method))
    }

    pub fn parse_response_eagerly<R: BufRead>(
        &self,
        source: R,
    ) -> Result<RawResponse<Detached>, ParseError> {
        self.parse_response(source)?.eagerly()
    }

    pub fn parse_response_str(&self, text: &str) -> Result<RawResponse<Detached>, ParseError> {
        self.parse_response_eagerly(text.as_bytes())
    }

    /// Parse a response stored in a file. The file is closed on return.
    pub fn parse_response_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<RawResponse<Detached>, ParseError> {
        let file = File::open(path.as_ref())?;
        self.parse_response_eagerly(BufReader::new(file))
    }

    fn read_response<R: BufRead>(
        &self,
        source: R,
        request_method: Option<&str>,
    ) -> Result<RawResponse<R>, ParseError> {
        let mut cursor = self.cursor(source);
        let line = StatusLine::parse(line_text(&read_start_line(&mut cursor)?)?)?;
        let headers = HttpHeaders::parse(&mut cursor)?;
        let framing = body::response_framing(&line, request_method, &headers)?;
        log::debug!("response {line}: {} headers, body {framing:?}", headers.len());
        Ok(RawResponse::new(line, headers, Body::framed(cursor, framing)))
    }
}

/// First non-empty line. Blank lines before it are skipped.
fn read_start_line<R: BufRead>(cursor: &mut ByteCursor<R>) -> Result<Vec<u8>, ParseError> {
    loop {
        match cursor.read_line()? {
            None => return Err(ParseError::EmptyMessage),
            Some(line) if line.is_empty() => {
                log::trace!("skipping blank line before start line");
            }
            Some(line) => return Ok(line),
        }
    }
}
