//! Parsed HTTP messages and their exact serialization.
//!
//! # Design
//! A message is start line + headers + body and is immutable apart from one
//! step: turning a lazy body into an eager one. `eagerly` does that by value
//! and changes the source type to `Detached`, so a detached message cannot
//! hold on to the stream it came from.
//!
//! Serialization writes the start line, each header as stored and a blank
//! line, all with `CRLF`, then the body bytes. Nothing is recomputed: a
//! `Content-Length` that disagrees with the body is written as found.

use std::fmt;
use std::io::{BufRead, Write};

use crate::body::{Body, Detached};
use crate::error::ParseError;
use crate::headers::HttpHeaders;
use crate::log;
use crate::start_line::{HttpVersion, RequestLine, RequestTarget, StartLine, StatusLine};
use crate::uri::Uri;

/// An HTTP request read from a source of type `R`. Only detached requests
/// are `Clone`.
pub struct RawRequest<R> {
    line: RequestLine,
    headers: HttpHeaders,
    uri: Uri,
    body: Body<R>,
}

impl<R> RawRequest<R> {
    pub(crate) fn new(line: RequestLine, headers: HttpHeaders, uri: Uri, body: Body<R>) -> Self {
        Self {
            line,
            headers,
            uri,
            body,
        }
    }

    pub fn method(&self) -> &str {
        self.line.method()
    }

    /// The target exactly as written on the request line.
    pub fn target(&self) -> &RequestTarget {
        self.line.target()
    }

    /// Absolute URI built from the target and the `Host` header.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> HttpVersion {
        self.line.version()
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.line
    }

    pub fn start_line(&self) -> StartLine {
        StartLine::Request(self.line.clone())
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> &Body<R> {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body<R> {
        &mut self.body
    }

    pub fn into_body(self) -> Body<R> {
        self.body
    }

    pub fn has_body(&self) -> bool {
        self.body.is_present()
    }
}

impl<R: BufRead> RawRequest<R> {
    /// Read the body to completion and drop the tie to the source.
    ///
    /// On a message that is already detached this returns an equal message.
    pub fn eagerly(self) -> Result<RawRequest<Detached>, ParseError> {
        if self.body.is_lazy() {
            log::debug!("reading body of {} {} eagerly", self.line.method(), self.line.target());
        }
        Ok(RawRequest {
            line: self.line,
            headers: self.headers,
            uri: self.uri,
            body: self.body.detach()?,
        })
    }

    /// Write the message in wire form. A lazy body is consumed by this.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> Result<(), ParseError> {
        write!(out, "{}\r\n{}\r\n", self.line, self.headers)?;
        self.body.write_to(out)
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, ParseError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// An HTTP response read from a source of type `R`. Only detached
/// responses are `Clone`.
pub struct RawResponse<R> {
    line: StatusLine,
    headers: HttpHeaders,
    body: Body<R>,
}

impl<R> RawResponse<R> {
    pub(crate) fn new(line: StatusLine, headers: HttpHeaders, body: Body<R>) -> Self {
        Self {
            line,
            headers,
            body,
        }
    }

    pub fn version(&self) -> HttpVersion {
        self.line.version()
    }

    pub fn status_code(&self) -> u16 {
        self.line.status_code()
    }

    pub fn reason(&self) -> &str {
        self.line.reason()
    }

    pub fn status_line(&self) -> &StatusLine {
        &self.line
    }

    pub fn start_line(&self) -> StartLine {
        StartLine::Status(self.line.clone())
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn body(&self) -> &Body<R> {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body<R> {
        &mut self.body
    }

    pub fn into_body(self) -> Body<R> {
        self.body
    }

    pub fn has_body(&self) -> bool {
        self.body.is_present()
    }
}

impl<R: BufRead> RawResponse<R> {
    /// Read the body to completion and drop the tie to the source.
    ///
    /// On a message that is already detached this returns an equal message.
    pub fn eagerly(self) -> Result<RawResponse<Detached>, ParseError> {
        if self.body.is_lazy() {
            log::debug!("reading body of {} response eagerly", self.line.status_code());
        }
        Ok(RawResponse {
            line: self.line,
            headers: self.headers,
            body: self.body.detach()?,
        })
    }

    /// Write the message in wire form. A lazy body is consumed by this.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> Result<(), ParseError> {
        write!(out, "{}\r\n{}\r\n", self.line, self.headers)?;
        self.body.write_to(out)
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>, ParseError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl<R> PartialEq for RawRequest<R> {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line
            && self.headers == other.headers
            && self.uri == other.uri
            && self.body == other.body
    }
}

impl<R> PartialEq for RawResponse<R> {
    fn eq(&self, other: &Self) -> bool {
        self.line == other.line && self.headers == other.headers && self.body == other.body
    }
}

impl<R> fmt::Debug for RawRequest<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawRequest")
            .field("line", &self.line)
            .field("headers", &self.headers)
            .field("uri", &self.uri)
            .field("body", &self.body)
            .finish()
    }
}

impl<R> fmt::Debug for RawResponse<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawResponse")
            .field("line", &self.line)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .finish()
    }
}

impl Clone for RawRequest<Detached> {
    fn clone(&self) -> Self {
        Self::new(
            self.line.clone(),
            self.headers.clone(),
            self.uri.clone(),
            self.body.clone(),
        )
    }
}

impl Clone for RawResponse<Detached> {
    fn clone(&self) -> Self {
        Self::new(self.line.clone(), self.headers.clone(), self.body.clone())
    }
}

fn fmt_body(body: &Body<Detached>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Some(eager) = body.as_eager() else {
        return Ok(());
    };
    let mut wire = Vec::with_capacity(eager.len());
    eager.write_to(&mut wire).map_err(|_| fmt::Error)?;
    f.write_str(&String::from_utf8_lossy(&wire))
}

/// Wire form, with the body decoded lossily as UTF-8.
impl fmt::Display for RawRequest<Detached> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}\r\n", self.line, self.headers)?;
        fmt_body(&self.body, f)
    }
}

/// Wire form, with the body decoded lossily as UTF-8.
impl fmt::Display for RawResponse<Detached> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\r\n{}\r\n", self.line, self.headers)?;
        fmt_body(&self.body, f)
    }
}
