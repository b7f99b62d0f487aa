//! Request-line and status-line parsing.
//!
//! # Design
//! The method is an opaque token so new verbs parse without a code change.
//! The request target is stored verbatim together with its form; it is
//! never rewritten, which keeps serialization byte-exact. Only the request
//! side defaults a missing version to `HTTP/1.1`.

use std::fmt;

use crate::error::ParseError;

/// `HTTP/<major>.<minor>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HttpVersion {
    pub major: u8,
    pub minor: u8,
}

impl HttpVersion {
    pub const HTTP_1_0: HttpVersion = HttpVersion { major: 1, minor: 0 };
    pub const HTTP_1_1: HttpVersion = HttpVersion { major: 1, minor: 1 };

    pub fn parse(token: &str) -> Result<Self, ParseError> {
        match token.as_bytes() {
            [b'H', b'T', b'T', b'P', b'/', major, b'.', minor]
                if major.is_ascii_digit() && minor.is_ascii_digit() =>
            {
                Ok(HttpVersion {
                    major: major - b'0',
                    minor: minor - b'0',
                })
            }
            _ => Err(ParseError::MalformedStartLine(format!(
                "invalid HTTP version: {token:?}"
            ))),
        }
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        HttpVersion::HTTP_1_1
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

/// Shape of a request target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetForm {
    /// `/path?query`
    Origin,
    /// `scheme://authority/path?query`
    Absolute,
    /// `host:port`, as used by CONNECT.
    Authority,
    /// `*`, as used by server-wide OPTIONS.
    Asterisk,
}

/// Request target exactly as it appeared on the request line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestTarget {
    value: String,
    form: TargetForm,
}

impl RequestTarget {
    pub fn new(value: &str) -> Self {
        let form = if value.starts_with('/') {
            TargetForm::Origin
        } else if value == "*" {
            TargetForm::Asterisk
        } else if value.contains("://") {
            TargetForm::Absolute
        } else {
            TargetForm::Authority
        };
        Self {
            value: value.to_string(),
            form,
        }
    }

    pub fn form(&self) -> TargetForm {
        self.form
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// `method SP target [SP version]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestLine {
    method: String,
    target: RequestTarget,
    version: HttpVersion,
}

impl RequestLine {
    pub fn new(method: &str, target: RequestTarget, version: HttpVersion) -> Self {
        Self {
            method: method.to_string(),
            target,
            version,
        }
    }

    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();
        let (method, target, version) = match parts.as_slice() {
            [method, target] => (*method, *target, HttpVersion::default()),
            [method, target, version] => (*method, *target, HttpVersion::parse(version)?),
            _ => {
                return Err(ParseError::MalformedStartLine(format!(
                    "expected `method target [version]`, got {line:?}"
                )))
            }
        };
        if !is_token(method) {
            return Err(ParseError::MalformedStartLine(format!("invalid method: {method:?}")));
        }
        if target.is_empty() || target.bytes().any(|b| b.is_ascii_control()) {
            return Err(ParseError::MalformedStartLine(format!(
                "invalid request target: {target:?}"
            )));
        }
        Ok(RequestLine::new(method, RequestTarget::new(target), version))
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &RequestTarget {
        &self.target
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn is_method(&self, method: &str) -> bool {
        self.method.eq_ignore_ascii_case(method)
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.version)
    }
}

/// `version SP status-code [SP reason]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusLine {
    version: HttpVersion,
    status_code: u16,
    /// `None` when the line ends right after the code, `Some("")` when the
    /// separator is there but the reason is empty.
    reason: Option<String>,
}

impl StatusLine {
    /// An empty `reason` writes no separator after the code.
    pub fn new(version: HttpVersion, status_code: u16, reason: &str) -> Self {
        Self {
            version,
            status_code,
            reason: (!reason.is_empty()).then(|| reason.to_string()),
        }
    }

    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let Some((version, rest)) = line.split_once(' ') else {
            return Err(ParseError::MalformedStartLine(format!(
                "expected `version status [reason]`, got {line:?}"
            )));
        };
        let version = HttpVersion::parse(version)?;
        let (code, reason) = match rest.split_once(' ') {
            Some((code, reason)) => (code, Some(reason)),
            None => (rest, None),
        };
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::MalformedStartLine(format!("invalid status code: {code:?}")));
        }
        let status_code = code
            .parse()
            .map_err(|_| ParseError::MalformedStartLine(format!("invalid status code: {code:?}")))?;
        Ok(StatusLine {
            version,
            status_code,
            reason: reason.map(str::to_string),
        })
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or("")
    }

    pub fn is_informational(&self) -> bool {
        (100..200).contains(&self.status_code)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.version, self.status_code)?;
        if let Some(reason) = &self.reason {
            write!(f, " {reason}")?;
        }
        Ok(())
    }
}

/// Which side of the exchange a message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

/// First line of any HTTP/1.x message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StartLine {
    Request(RequestLine),
    Status(StatusLine),
}

impl StartLine {
    pub fn parse(line: &[u8], kind: MessageKind) -> Result<Self, ParseError> {
        let line = line_text(line)?;
        match kind {
            MessageKind::Request => RequestLine::parse(line).map(StartLine::Request),
            MessageKind::Response => StatusLine::parse(line).map(StartLine::Status),
        }
    }

    pub fn version(&self) -> HttpVersion {
        match self {
            StartLine::Request(line) => line.version(),
            StartLine::Status(line) => line.version(),
        }
    }
}

impl fmt::Display for StartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartLine::Request(line) => line.fmt(f),
            StartLine::Status(line) => line.fmt(f),
        }
    }
}

/// A start line as text; anything but UTF-8 is malformed.
pub(crate) fn line_text(line: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(line)
        .map_err(|_| ParseError::MalformedStartLine("start line is not valid UTF-8".to_string()))
}

/// RFC 9110 `token`: one or more `tchar`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
                )
        })
}
