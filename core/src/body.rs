//! Body framing and the lazy/eager body model.
//!
//! # Design
//! `Framing` is decided from the start line and headers alone, before a
//! single body byte is read, and never recomputed. A `LazyBody` owns the
//! cursor over the rest of the source but only ever reads inside the window
//! its framing describes, once. An `EagerBody` is a detached buffer that can
//! be read and serialized any number of times.
//!
//! Chunked bodies are decoded on the fly. The chunk layout (size lines,
//! extensions, trailers) is recorded on the side so an eager copy can be
//! written back in the same shape it arrived in.

use std::fmt;
use std::io::{self, BufRead, Read, Write};

use crate::cursor::ByteCursor;
use crate::error::ParseError;
use crate::headers::HttpHeaders;
use crate::start_line::StatusLine;

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// How the end of a body is found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// No body at all.
    Absent,
    /// Exactly this many bytes.
    ContentLength(u64),
    /// Chunked transfer coding, ended by a zero-size chunk.
    Chunked,
    /// Everything until the source is exhausted.
    CloseDelimited,
}

/// Framing of a request body. Requests are never close-delimited.
pub fn request_framing(headers: &HttpHeaders) -> Result<Framing, ParseError> {
    let coding = transfer_coding(headers);
    if coding == Some(true) {
        return Ok(Framing::Chunked);
    }
    match (content_length(headers)?, coding) {
        (Some(len), _) => Ok(Framing::ContentLength(len)),
        (None, Some(false)) => Err(ParseError::AmbiguousFraming(
            "request Transfer-Encoding is not chunked and there is no Content-Length".to_string(),
        )),
        (None, _) => Ok(Framing::Absent),
    }
}

/// Framing of a response body, given the method of the request it answers
/// when that is known.
pub fn response_framing(
    status: &StatusLine,
    request_method: Option<&str>,
    headers: &HttpHeaders,
) -> Result<Framing, ParseError> {
    let code = status.status_code();
    if status.is_informational() || code == 204 || code == 304 {
        return Ok(Framing::Absent);
    }
    if let Some(method) = request_method {
        if method.eq_ignore_ascii_case("HEAD") {
            return Ok(Framing::Absent);
        }
        // a successful CONNECT turns the connection into a tunnel
        if method.eq_ignore_ascii_case("CONNECT") && status.is_success() {
            return Ok(Framing::Absent);
        }
    }
    if transfer_coding(headers) == Some(true) {
        return Ok(Framing::Chunked);
    }
    Ok(match content_length(headers)? {
        Some(len) => Framing::ContentLength(len),
        None => Framing::CloseDelimited,
    })
}

/// `None` without a `Transfer-Encoding` header, otherwise whether any of
/// the listed codings is `chunked`.
fn transfer_coding(headers: &HttpHeaders) -> Option<bool> {
    if !headers.contains("Transfer-Encoding") {
        return None;
    }
    Some(
        headers
            .get_all("Transfer-Encoding")
            .flat_map(|value| value.split(','))
            .any(|coding| coding.trim().eq_ignore_ascii_case("chunked")),
    )
}

/// Every `Content-Length` value (and every member of a comma list) must be
/// the same plain decimal number.
fn content_length(headers: &HttpHeaders) -> Result<Option<u64>, ParseError> {
    let mut length = None;
    for member in headers
        .get_all("Content-Length")
        .flat_map(|value| value.split(','))
    {
        let member = member.trim();
        if member.is_empty() || !member.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::AmbiguousFraming(format!(
                "invalid Content-Length: {member:?}"
            )));
        }
        let value: u64 = member.parse().map_err(|_| {
            ParseError::AmbiguousFraming(format!("Content-Length out of range: {member}"))
        })?;
        match length {
            Some(previous) if previous != value => {
                return Err(ParseError::AmbiguousFraming(format!(
                    "conflicting Content-Length values {previous} and {value}"
                )))
            }
            _ => length = Some(value),
        }
    }
    Ok(length)
}

/// Character sets a body can be decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Iso8859_1,
    UsAscii,
}

impl Charset {
    /// Look up a charset by one of its common labels, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "l1" => Some(Charset::Iso8859_1),
            "us-ascii" | "ascii" => Some(Charset::UsAscii),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Iso8859_1 => "ISO-8859-1",
            Charset::UsAscii => "US-ASCII",
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String, ParseError> {
        let invalid = || ParseError::Decode {
            charset: self.name(),
        };
        match self {
            Charset::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| invalid()),
            Charset::Iso8859_1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::UsAscii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| char::from(b)).collect())
                } else {
                    Err(invalid())
                }
            }
        }
    }
}

/// One data chunk of a chunked body as it appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chunk {
    /// Size line including any extensions, e.g. `1a;name=value`.
    size_line: String,
    len: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ChunkedLayout {
    chunks: Vec<Chunk>,
    last_chunk: String,
    trailers: HttpHeaders,
}

/// A body read to completion and detached from its source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EagerBody {
    content: Vec<u8>,
    chunked: Option<ChunkedLayout>,
}

impl EagerBody {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        Self {
            content: content.into(),
            chunked: None,
        }
    }

    /// Decoded body content.
    pub fn as_bytes(&self) -> &[u8] {
        &self.content
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.content
    }

    pub fn as_string(&self, charset: Charset) -> Result<String, ParseError> {
        charset.decode(&self.content)
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked.is_some()
    }

    /// Trailer fields that followed the last chunk.
    pub fn trailers(&self) -> Option<&HttpHeaders> {
        self.chunked.as_ref().map(|layout| &layout.trailers)
    }

    /// Write the body in wire form: raw bytes, or the recorded chunk layout
    /// re-emitted with `CRLF` line endings.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(layout) = &self.chunked else {
            return out.write_all(&self.content);
        };
        let mut offset = 0;
        for chunk in &layout.chunks {
            out.write_all(chunk.size_line.as_bytes())?;
            out.write_all(b"\r\n")?;
            out.write_all(&self.content[offset..offset + chunk.len])?;
            out.write_all(b"\r\n")?;
            offset += chunk.len;
        }
        out.write_all(layout.last_chunk.as_bytes())?;
        out.write_all(b"\r\n")?;
        write!(out, "{}", layout.trailers)?;
        out.write_all(b"\r\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkPhase {
    Size,
    Data { size: u64, remaining: u64 },
    DataEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Length { total: u64, remaining: u64 },
    Chunked(ChunkPhase),
    UntilClose,
    Done,
}

/// A body still sitting in its source, readable exactly once.
///
/// There is no `Clone` for a body tied to a real source, so the window
/// cannot be read twice:
///
/// ```compile_fail
/// use rawhttp_core::RawHttp;
///
/// let text = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi";
/// let response = RawHttp::new().parse_response(&text[..]).unwrap();
/// let copy: rawhttp_core::RawResponse<&[u8]> = response.clone();
/// ```
pub struct LazyBody<R> {
    cursor: ByteCursor<R>,
    framing: Framing,
    progress: Progress,
    started: bool,
    decoded: u64,
    layout: ChunkedLayout,
}

impl<R: BufRead> LazyBody<R> {
    pub(crate) fn new(cursor: ByteCursor<R>, framing: Framing) -> Self {
        let progress = match framing {
            Framing::ContentLength(total) => Progress::Length {
                total,
                remaining: total,
            },
            Framing::Chunked => Progress::Chunked(ChunkPhase::Size),
            Framing::CloseDelimited => Progress::UntilClose,
            Framing::Absent => Progress::Done,
        };
        Self {
            cursor,
            framing,
            progress,
            started: false,
            decoded: 0,
            layout: ChunkedLayout::default(),
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// True once any byte of the body has been handed out.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// True once the end of the body has been reached.
    pub fn is_finished(&self) -> bool {
        self.progress == Progress::Done
    }

    /// Bytes taken from the source so far, start line and headers included.
    pub fn source_position(&self) -> u64 {
        self.cursor.consumed()
    }

    /// Give back the source, positioned wherever reading stopped.
    pub fn into_inner(self) -> R {
        self.cursor.into_inner()
    }

    fn finish(&mut self) {
        self.progress = Progress::Done;
    }

    fn truncated(&self, expected: u64, received: u64) -> ParseError {
        ParseError::TruncatedInput { expected, received }
    }

    /// Decode the next run of body bytes into `buf`; `Ok(0)` at the end.
    fn read_body(&mut self, buf: &mut [u8]) -> Result<usize, ParseError> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.started = true;
        loop {
            match self.progress {
                Progress::Done => return Ok(0),
                Progress::UntilClose => {
                    let n = self.cursor.read(buf)?;
                    if n == 0 {
                        self.finish();
                    }
                    self.decoded += n as u64;
                    return Ok(n);
                }
                Progress::Length { total, remaining } => {
                    if remaining == 0 {
                        self.finish();
                        return Ok(0);
                    }
                    let max = buf.len().min(remaining.min(usize::MAX as u64) as usize);
                    let n = self.cursor.read(&mut buf[..max])?;
                    if n == 0 {
                        return Err(self.truncated(total, total - remaining));
                    }
                    let remaining = remaining - n as u64;
                    self.progress = Progress::Length { total, remaining };
                    if remaining == 0 {
                        self.finish();
                    }
                    self.decoded += n as u64;
                    return Ok(n);
                }
                Progress::Chunked(ChunkPhase::Size) => self.read_chunk_size()?,
                Progress::Chunked(ChunkPhase::Data { size, remaining }) => {
                    let max = buf.len().min(remaining.min(usize::MAX as u64) as usize);
                    let n = self.cursor.read(&mut buf[..max])?;
                    if n == 0 {
                        return Err(self.truncated(size, size - remaining));
                    }
                    let remaining = remaining - n as u64;
                    self.progress = Progress::Chunked(if remaining == 0 {
                        ChunkPhase::DataEnd
                    } else {
                        ChunkPhase::Data { size, remaining }
                    });
                    if let Some(chunk) = self.layout.chunks.last_mut() {
                        chunk.len += n;
                    }
                    self.decoded += n as u64;
                    return Ok(n);
                }
                Progress::Chunked(ChunkPhase::DataEnd) => match self.cursor.read_line()? {
                    Some(line) if line.is_empty() => {
                        self.progress = Progress::Chunked(ChunkPhase::Size);
                    }
                    Some(_) => {
                        return Err(ParseError::AmbiguousFraming(
                            "chunk data is not followed by a line break".to_string(),
                        ))
                    }
                    // at least the line break is still owed
                    None => return Err(self.truncated(self.decoded + 1, self.decoded)),
                },
            }
        }
    }

    fn read_chunk_size(&mut self) -> Result<(), ParseError> {
        let Some(line) = self.cursor.read_line()? else {
            // at least the terminating chunk is still owed
            return Err(self.truncated(self.decoded + 1, self.decoded));
        };
        let size_line = String::from_utf8(line)
            .map_err(|_| ParseError::AmbiguousFraming("chunk size line is not text".to_string()))?;
        let digits = size_line
            .split_once(';')
            .map_or(size_line.as_str(), |(digits, _)| digits)
            .trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseError::AmbiguousFraming(format!(
                "invalid chunk size: {size_line:?}"
            )));
        }
        let size = u64::from_str_radix(digits, 16)
            .map_err(|_| ParseError::AmbiguousFraming(format!("chunk size out of range: {digits}")))?;

        if size == 0 {
            let (trailers, terminated) = HttpHeaders::read_block(&mut self.cursor)?;
            if !terminated {
                // the blank line closing the trailers is still owed
                return Err(self.truncated(self.decoded + 1, self.decoded));
            }
            crate::log::trace!("last chunk read, {} trailer fields", trailers.len());
            self.layout.last_chunk = size_line;
            self.layout.trailers = trailers;
            self.finish();
        } else {
            crate::log::trace!("chunk of {size} bytes");
            self.layout.chunks.push(Chunk { size_line, len: 0 });
            self.progress = Progress::Chunked(ChunkPhase::Data {
                size,
                remaining: size,
            });
        }
        Ok(())
    }

    /// Read the whole body into a detached buffer.
    ///
    /// Fails with `BodyAlreadyConsumed` if any of it was read before.
    pub fn eager(&mut self) -> Result<EagerBody, ParseError> {
        if self.started {
            return Err(ParseError::BodyAlreadyConsumed);
        }
        let mut content = match self.framing {
            Framing::ContentLength(len) => Vec::with_capacity(len.min(64 * 1024) as usize),
            _ => Vec::new(),
        };
        let mut buf = [0u8; COPY_BUFFER_SIZE];
        loop {
            let n = self.read_body(&mut buf)?;
            if n == 0 {
                break;
            }
            content.extend_from_slice(&buf[..n]);
        }
        let chunked = match self.framing {
            Framing::Chunked => Some(std::mem::take(&mut self.layout)),
            _ => None,
        };
        Ok(EagerBody { content, chunked })
    }

    pub fn into_bytes(mut self) -> Result<Vec<u8>, ParseError> {
        self.eager().map(EagerBody::into_bytes)
    }

    pub fn into_string(mut self, charset: Charset) -> Result<String, ParseError> {
        self.eager()?.as_string(charset)
    }

    /// Read and drop whatever is left of the body so the source can be
    /// reused. Returns the number of decoded bytes dropped.
    pub fn skip(&mut self) -> Result<u64, ParseError> {
        let mut skipped = 0;
        let mut buf = [0u8; COPY_BUFFER_SIZE];
        loop {
            let n = self.read_body(&mut buf)?;
            if n == 0 {
                return Ok(skipped);
            }
            skipped += n as u64;
        }
    }

    /// Stream the body to `out` in wire form. Consumes the body.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> Result<(), ParseError> {
        if self.started {
            return Err(ParseError::BodyAlreadyConsumed);
        }
        if self.framing == Framing::Chunked {
            // the chunk layout is only known once the last chunk is read
            return Ok(self.eager()?.write_to(out)?);
        }
        let mut buf = [0u8; COPY_BUFFER_SIZE];
        loop {
            let n = self.read_body(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            out.write_all(&buf[..n])?;
        }
    }
}

impl<R: BufRead> Read for LazyBody<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_body(buf).map_err(ParseError::into_io)
    }
}

impl<R> fmt::Debug for LazyBody<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBody")
            .field("framing", &self.framing)
            .field("started", &self.started)
            .field("finished", &(self.progress == Progress::Done))
            .finish_non_exhaustive()
    }
}

/// Source type of a message that no longer refers to where it was parsed
/// from. Reads as an empty stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Detached;

impl Read for Detached {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Ok(0)
    }
}

impl BufRead for Detached {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        Ok(&[])
    }

    fn consume(&mut self, _amt: usize) {}
}

/// Body of a message: none, still in the source, or materialized.
pub enum Body<R> {
    Absent,
    Lazy(LazyBody<R>),
    Eager(EagerBody),
}

impl<R> Body<R> {
    pub fn is_present(&self) -> bool {
        !matches!(self, Body::Absent)
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, Body::Lazy(_))
    }

    pub fn as_eager(&self) -> Option<&EagerBody> {
        match self {
            Body::Eager(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_lazy_mut(&mut self) -> Option<&mut LazyBody<R>> {
        match self {
            Body::Lazy(body) => Some(body),
            _ => None,
        }
    }
}

impl<R: BufRead> Body<R> {
    /// Bind a body to the rest of the source according to `framing`.
    pub(crate) fn framed(cursor: ByteCursor<R>, framing: Framing) -> Self {
        match framing {
            Framing::Absent => Body::Absent,
            framing => Body::Lazy(LazyBody::new(cursor, framing)),
        }
    }

    /// Promote a lazy body in place. `None` when there is no body.
    pub fn make_eager(&mut self) -> Result<Option<&EagerBody>, ParseError> {
        if let Body::Lazy(lazy) = self {
            let eager = lazy.eager()?;
            *self = Body::Eager(eager);
        }
        Ok(self.as_eager())
    }

    /// The same body with no tie to the source.
    pub fn detach(self) -> Result<Body<Detached>, ParseError> {
        Ok(match self {
            Body::Absent => Body::Absent,
            Body::Lazy(mut lazy) => Body::Eager(lazy.eager()?),
            Body::Eager(eager) => Body::Eager(eager),
        })
    }

    /// Wire form of the body. Consumes a lazy body.
    pub fn write_to<W: Write>(&mut self, out: &mut W) -> Result<(), ParseError> {
        match self {
            Body::Absent => Ok(()),
            Body::Lazy(lazy) => lazy.write_to(out),
            Body::Eager(eager) => Ok(eager.write_to(out)?),
        }
    }
}

impl Clone for LazyBody<Detached> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
            framing: self.framing,
            progress: self.progress,
            started: self.started,
            decoded: self.decoded,
            layout: self.layout.clone(),
        }
    }
}

impl Clone for Body<Detached> {
    fn clone(&self) -> Self {
        match self {
            Body::Absent => Body::Absent,
            Body::Lazy(lazy) => Body::Lazy(lazy.clone()),
            Body::Eager(eager) => Body::Eager(eager.clone()),
        }
    }
}

/// Lazy bodies never compare equal: their content is not known yet.
impl<R> PartialEq for Body<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Body::Absent, Body::Absent) => true,
            (Body::Eager(a), Body::Eager(b)) => a == b,
            _ => false,
        }
    }
}

impl<R> fmt::Debug for Body<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Absent => f.write_str("Absent"),
            Body::Lazy(lazy) => f.debug_tuple("Lazy").field(lazy).finish(),
            Body::Eager(eager) => f.debug_tuple("Eager").field(eager).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::start_line::HttpVersion;

    fn status(code: u16) -> StatusLine {
        StatusLine::new(HttpVersion::HTTP_1_1, code, "")
    }

    fn lazy(data: &[u8], framing: Framing) -> LazyBody<&[u8]> {
        LazyBody::new(ByteCursor::new(data), framing)
    }

    #[test]
    fn no_body_statuses_ignore_framing_headers() {
        let headers = HttpHeaders::new().with("Content-Length", "10");
        for code in [100, 101, 199, 204, 304] {
            assert_eq!(response_framing(&status(code), None, &headers).unwrap(), Framing::Absent);
        }
        assert_eq!(
            response_framing(&status(200), None, &headers).unwrap(),
            Framing::ContentLength(10)
        );
    }

    #[test]
    fn head_and_connect_responses_have_no_body() {
        let headers = HttpHeaders::new().with("Transfer-Encoding", "chunked");
        assert_eq!(response_framing(&status(200), Some("head"), &headers).unwrap(), Framing::Absent);
        assert_eq!(response_framing(&status(200), Some("CONNECT"), &headers).unwrap(), Framing::Absent);
        assert_eq!(response_framing(&status(407), Some("CONNECT"), &headers).unwrap(), Framing::Chunked);
    }

    #[test]
    fn chunked_wins_over_content_length() {
        let headers = HttpHeaders::new()
            .with("Content-Length", "3")
            .with("Transfer-Encoding", "gzip, Chunked");
        assert_eq!(request_framing(&headers).unwrap(), Framing::Chunked);
    }

    #[test]
    fn response_without_framing_is_close_delimited() {
        let headers = HttpHeaders::new();
        assert_eq!(response_framing(&status(200), None, &headers).unwrap(), Framing::CloseDelimited);
        let gzip = HttpHeaders::new().with("Transfer-Encoding", "gzip");
        assert_eq!(response_framing(&status(200), None, &gzip).unwrap(), Framing::CloseDelimited);
    }

    #[test]
    fn request_without_framing_has_no_body() {
        assert_eq!(request_framing(&HttpHeaders::new()).unwrap(), Framing::Absent);
        let gzip = HttpHeaders::new().with("Transfer-Encoding", "gzip");
        assert_eq!(request_framing(&gzip).unwrap_err().kind(), ErrorKind::AmbiguousFraming);
    }

    #[test]
    fn content_length_follows_a_non_chunked_coding() {
        let headers = HttpHeaders::new()
            .with("Transfer-Encoding", "gzip")
            .with("Content-Length", "3");
        assert_eq!(request_framing(&headers).unwrap(), Framing::ContentLength(3));
        assert_eq!(
            response_framing(&status(200), None, &headers).unwrap(),
            Framing::ContentLength(3)
        );
    }

    #[test]
    fn content_length_must_be_plain_digits() {
        for value in ["-1", "+5", "abc", "", "1.0", "99999999999999999999999"] {
            let headers = HttpHeaders::new().with("Content-Length", value);
            let err = request_framing(&headers).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::AmbiguousFraming, "{value:?}");
        }
    }

    #[test]
    fn content_length_values_must_agree() {
        let agree = HttpHeaders::new().with("Content-Length", "5, 5").with("content-length", "5");
        assert_eq!(request_framing(&agree).unwrap(), Framing::ContentLength(5));
        let disagree = HttpHeaders::new().with("Content-Length", "5").with("Content-Length", "6");
        assert_eq!(request_framing(&disagree).unwrap_err().kind(), ErrorKind::AmbiguousFraming);
    }

    #[test]
    fn length_body_stops_at_its_end() {
        let mut source = &b"hello world"[..];
        let mut body = LazyBody::new(ByteCursor::new(&mut source), Framing::ContentLength(5));
        assert_eq!(body.eager().unwrap().as_bytes(), b"hello");
        assert!(body.is_finished());
        drop(body);
        assert_eq!(source, b" world");
    }

    #[test]
    fn length_body_reports_truncation() {
        let mut body = lazy(b"abc", Framing::ContentLength(10));
        let err = body.eager().unwrap_err();
        assert!(matches!(
            err,
            ParseError::TruncatedInput {
                expected: 10,
                received: 3
            }
        ));
    }

    #[test]
    fn close_delimited_reads_to_end() {
        let body = lazy(b"all the rest", Framing::CloseDelimited);
        assert_eq!(body.into_string(Charset::Utf8).unwrap(), "all the rest");
    }

    #[test]
    fn second_read_is_rejected() {
        let mut body = lazy(b"abcdef", Framing::ContentLength(6));
        let mut first = [0u8; 2];
        assert_eq!(body.read(&mut first).unwrap(), 2);
        assert_eq!(body.eager().unwrap_err().kind(), ErrorKind::BodyAlreadyConsumed);
        assert_eq!(
            body.write_to(&mut Vec::<u8>::new()).unwrap_err().kind(),
            ErrorKind::BodyAlreadyConsumed
        );
    }

    #[test]
    fn decodes_chunks_and_keeps_layout() {
        let wire = b"5;ext=1\r\nhello\r\n6\r\n world\r\n0\r\nExpires: never\r\n\r\nNEXT";
        let mut source = &wire[..];
        let mut body = LazyBody::new(ByteCursor::new(&mut source), Framing::Chunked);
        let eager = body.eager().unwrap();
        drop(body);
        assert_eq!(eager.as_bytes(), b"hello world");
        assert_eq!(eager.trailers().unwrap().first("expires"), Some("never"));
        assert_eq!(source, b"NEXT");

        let mut out = Vec::new();
        eager.write_to(&mut out).unwrap();
        assert_eq!(out, &wire[..wire.len() - 4]);
    }

    #[test]
    fn chunk_framing_is_normalized_to_crlf() {
        let mut body = lazy(b"3\nabc\n0\n\n", Framing::Chunked);
        let eager = body.eager().unwrap();
        let mut out = Vec::new();
        eager.write_to(&mut out).unwrap();
        assert_eq!(out, b"3\r\nabc\r\n0\r\n\r\n");
    }

    #[test]
    fn chunked_read_through_io_read() {
        let mut body = lazy(b"2\r\nab\r\n3\r\ncde\r\n0\r\n\r\n", Framing::Chunked);
        let mut text = String::new();
        body.read_to_string(&mut text).unwrap();
        assert_eq!(text, "abcde");
        assert!(body.is_finished());
    }

    #[test]
    fn bad_chunk_size_is_ambiguous() {
        let mut body = lazy(b"zz\r\nabc\r\n0\r\n\r\n", Framing::Chunked);
        assert_eq!(body.eager().unwrap_err().kind(), ErrorKind::AmbiguousFraming);
    }

    #[test]
    fn missing_crlf_after_chunk_is_ambiguous() {
        let mut body = lazy(b"3\r\nabcX\r\n0\r\n\r\n", Framing::Chunked);
        assert_eq!(body.eager().unwrap_err().kind(), ErrorKind::AmbiguousFraming);
    }

    #[test]
    fn truncated_chunk_is_reported() {
        let mut body = lazy(b"a\r\nshort", Framing::Chunked);
        let err = body.eager().unwrap_err();
        assert!(matches!(
            err,
            ParseError::TruncatedInput {
                expected: 10,
                received: 5
            }
        ));

        let mut body = lazy(b"3\r\nabc\r\n", Framing::Chunked);
        assert_eq!(body.eager().unwrap_err().kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn last_chunk_needs_its_closing_blank_line() {
        for data in [&b"3\r\nabc\r\n0\r\n"[..], b"3\r\nabc\r\n0\r\nX-Sum: 1\r\n"] {
            let mut body = lazy(data, Framing::Chunked);
            let err = body.eager().unwrap_err();
            assert!(
                matches!(err, ParseError::TruncatedInput { expected: 4, received: 3 }),
                "{data:?}: {err:?}"
            );
        }
    }

    #[test]
    fn io_read_surfaces_truncation_as_unexpected_eof() {
        let mut body = lazy(b"abc", Framing::ContentLength(4));
        let mut all = Vec::new();
        let err = body.read_to_end(&mut all).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn skip_drains_the_body() {
        let mut source = &b"4\r\nskip\r\n0\r\n\r\nGET / HTTP/1.1"[..];
        let mut body = LazyBody::new(ByteCursor::new(&mut source), Framing::Chunked);
        assert_eq!(body.skip().unwrap(), 4);
        drop(body);
        assert_eq!(source, b"GET / HTTP/1.1");
    }

    #[test]
    fn make_eager_promotes_in_place() {
        let mut body = Body::framed(ByteCursor::new(&b"abc"[..]), Framing::ContentLength(3));
        assert!(body.is_lazy());
        assert_eq!(body.make_eager().unwrap().unwrap().as_bytes(), b"abc");
        assert!(!body.is_lazy());
        // promoting again is a no-op
        assert_eq!(body.make_eager().unwrap().unwrap().as_bytes(), b"abc");
    }

    #[test]
    fn absent_framing_binds_no_body() {
        let mut body = Body::framed(ByteCursor::new(&b"ignored"[..]), Framing::Absent);
        assert!(!body.is_present());
        assert!(body.make_eager().unwrap().is_none());
    }

    #[test]
    fn charsets() {
        assert_eq!(Charset::from_label("UTF-8"), Some(Charset::Utf8));
        assert_eq!(Charset::from_label("Latin1"), Some(Charset::Iso8859_1));
        assert_eq!(Charset::from_label("klingon"), None);

        let body = EagerBody::new(vec![0x63, 0x61, 0x66, 0xe9]);
        assert_eq!(body.as_string(Charset::Iso8859_1).unwrap(), "café");
        assert_eq!(body.as_string(Charset::Utf8).unwrap_err().kind(), ErrorKind::Decode);
        assert_eq!(body.as_string(Charset::UsAscii).unwrap_err().kind(), ErrorKind::Decode);
    }
}
