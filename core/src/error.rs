//! Error types for raw HTTP parsing.
//!
//! # Design
//! Every failure is reported as a `ParseError`, synchronously, from the
//! operation that detected it. Nothing is downgraded to a default: a
//! malformed `Content-Length` fails the parse instead of meaning "no body".
//! `ErrorKind` is the fieldless discriminant, handy for matching in tests
//! and for crossing the C boundary as a plain integer.

use std::io;

/// Errors returned while parsing a message or reading its body.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// The source ended before any start line was found.
    #[error("no content: the source ended before a start line")]
    EmptyMessage,

    /// Missing tokens, bad version syntax or a status code that is not
    /// exactly three digits.
    #[error("malformed start line: {0}")]
    MalformedStartLine(String),

    /// A header line without a `:` separator or with an empty name.
    #[error("malformed header line {line}: {content:?}")]
    MalformedHeaderLine { line: usize, content: String },

    /// A `CR` not followed by `LF`, or a bare `LF` when those are not allowed.
    #[error("invalid line ending at line {line}")]
    InvalidLineEnding { line: usize },

    /// Conflicting or unparsable framing information.
    #[error("ambiguous framing: {0}")]
    AmbiguousFraming(String),

    /// The request target cannot be turned into an absolute URI.
    #[error("cannot determine target host: {0}")]
    UnresolvableTarget(String),

    /// The source ended before the framing-mandated number of bytes.
    #[error("truncated input: expected {expected} bytes, received {received}")]
    TruncatedInput { expected: u64, received: u64 },

    /// A lazy body was read twice, or the source moved past it.
    #[error("body already consumed")]
    BodyAlreadyConsumed,

    /// The body bytes are not valid in the requested charset.
    #[error("body is not valid {charset}")]
    Decode { charset: &'static str },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Fieldless discriminant of `ParseError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    EmptyMessage = 1,
    MalformedStartLine = 2,
    MalformedHeaderLine = 3,
    InvalidLineEnding = 4,
    AmbiguousFraming = 5,
    UnresolvableTarget = 6,
    TruncatedInput = 7,
    BodyAlreadyConsumed = 8,
    Decode = 9,
    Io = 10,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::EmptyMessage => ErrorKind::EmptyMessage,
            ParseError::MalformedStartLine(_) => ErrorKind::MalformedStartLine,
            ParseError::MalformedHeaderLine { .. } => ErrorKind::MalformedHeaderLine,
            ParseError::InvalidLineEnding { .. } => ErrorKind::InvalidLineEnding,
            ParseError::AmbiguousFraming(_) => ErrorKind::AmbiguousFraming,
            ParseError::UnresolvableTarget(_) => ErrorKind::UnresolvableTarget,
            ParseError::TruncatedInput { .. } => ErrorKind::TruncatedInput,
            ParseError::BodyAlreadyConsumed => ErrorKind::BodyAlreadyConsumed,
            ParseError::Decode { .. } => ErrorKind::Decode,
            ParseError::Io(_) => ErrorKind::Io,
        }
    }

    /// Convert into an `io::Error` for use behind `std::io::Read`.
    ///
    /// An `Io` variant is unwrapped so the original error kind survives.
    pub(crate) fn into_io(self) -> io::Error {
        match self {
            ParseError::Io(e) => e,
            e @ ParseError::TruncatedInput { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_line_number() {
        let err = ParseError::MalformedHeaderLine {
            line: 3,
            content: "no separator".to_string(),
        };
        assert_eq!(err.to_string(), "malformed header line 3: \"no separator\"");
        assert_eq!(err.kind(), ErrorKind::MalformedHeaderLine);
    }

    #[test]
    fn truncation_maps_to_unexpected_eof() {
        let err = ParseError::TruncatedInput {
            expected: 10,
            received: 4,
        };
        assert_eq!(err.into_io().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err = ParseError::from(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.into_io().kind(), io::ErrorKind::ConnectionReset);
    }
}
