//! Absolute URI of a request, built from its target and `Host` header.
//!
//! # Syntax Component
//!
//! ```not_rust
//!   http://user@example.com:8042/over/there?name=ferret#nose
//!   \__/   \__/ \_________/ \__/\_________/ \_________/ \__/
//!    |      |        |       |       |           |       |
//! scheme userinfo   host   port    path        query  fragment
//! ```
//!
//! Nothing here decodes or encodes percent escapes.

use std::fmt;

use crate::error::ParseError;
use crate::headers::HttpHeaders;
use crate::log;
use crate::options::ParseOptions;
use crate::start_line::{RequestLine, TargetForm};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    scheme: String,
    userinfo: Option<String>,
    host: String,
    port: Option<u16>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Uri {
    /// Parse `scheme://authority[path][?query][#fragment]`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let Some((scheme, rest)) = value.split_once("://") else {
            return Err(format!("missing scheme in {value:?}"));
        };
        if !is_scheme(scheme) {
            return Err(format!("invalid scheme {scheme:?}"));
        }
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let (userinfo, authority) = match authority.rsplit_once('@') {
            Some((userinfo, host)) => (Some(userinfo.to_string()), host),
            None => (None, authority),
        };
        let (host, port) = split_host_port(authority)?;
        let (path, query, fragment) = split_path(tail);
        Ok(Uri {
            scheme: scheme.to_ascii_lowercase(),
            userinfo,
            host,
            port,
            path,
            query,
            fragment,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port as written, even when it is the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Port that differs from the scheme's well-known one, if any.
    fn explicit_port(&self) -> Option<u16> {
        self.port.filter(|port| Some(*port) != default_port(&self.scheme))
    }

    /// `host[:port]`, default port omitted. This is what a `Host` header
    /// for this URI carries.
    pub fn authority(&self) -> String {
        match self.explicit_port() {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(userinfo) = &self.userinfo {
            write!(f, "{userinfo}@")?;
        }
        write!(f, "{}", self.authority())?;
        f.write_str(&self.path)?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

pub fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        _ => None,
    }
}

fn is_scheme(s: &str) -> bool {
    let mut bytes = s.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// `host[:port]`, with bracketed IPv6 literals kept intact.
fn split_host_port(authority: &str) -> Result<(String, Option<u16>), String> {
    let (host, port) = if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => {
                let (host, rest) = authority.split_at(end + 1);
                match rest {
                    "" => (host, None),
                    _ => match rest.strip_prefix(':') {
                        Some(port) => (host, Some(port)),
                        None => return Err(format!("invalid authority {authority:?}")),
                    },
                }
            }
            None => return Err(format!("unterminated IPv6 literal in {authority:?}")),
        }
    } else {
        match authority.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };
    if host.is_empty() || host.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
        return Err(format!("invalid host in {authority:?}"));
    }
    let port = match port {
        None | Some("") => None,
        // `u16::from_str` would also take a leading `+`.
        Some(port) if port.bytes().all(|b| b.is_ascii_digit()) => match port.parse::<u16>() {
            Ok(port) => Some(port),
            Err(_) => return Err(format!("invalid port in {authority:?}")),
        },
        Some(_) => return Err(format!("invalid port in {authority:?}")),
    };
    Ok((host.to_string(), port))
}

/// Split `path[?query][#fragment]`.
fn split_path(tail: &str) -> (String, Option<String>, Option<String>) {
    let (rest, fragment) = match tail.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment.to_string())),
        None => (tail, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query.to_string())),
        None => (rest, None),
    };
    (path.to_string(), query, fragment)
}

/// Build the absolute URI of a request.
///
/// An absolute-form target stands on its own; a `Host` header is synthesized
/// from it when missing. Every other form needs exactly one `Host` header.
pub fn resolve(
    line: &RequestLine,
    headers: &mut HttpHeaders,
    options: &ParseOptions,
) -> Result<Uri, ParseError> {
    let target = line.target();
    let hosts = headers.get("Host").len();

    if target.form() == TargetForm::Absolute {
        let uri = Uri::parse(target.as_str())
            .map_err(|e| ParseError::MalformedStartLine(format!("invalid URI: {e}")))?;
        if hosts == 0 {
            if !options.insert_host_header_if_missing {
                return Err(ParseError::UnresolvableTarget("Host header is missing".to_string()));
            }
            let host = uri.authority();
            log::debug!("synthesizing Host header {host:?} from {target}");
            match options.host_header_position {
                Some(index) => headers.insert(index, "Host", &host),
                None => headers.push("Host", &host),
            }
        } else if hosts > 1 {
            return Err(ParseError::UnresolvableTarget(
                "more than one Host header specified".to_string(),
            ));
        }
        return Ok(uri);
    }

    let host = match headers.get("Host").as_slice() {
        [] => {
            return Err(ParseError::UnresolvableTarget(format!(
                "Host header is missing and {target:?} names no host"
            )))
        }
        [host] => host.trim().to_string(),
        _ => {
            return Err(ParseError::UnresolvableTarget(
                "more than one Host header specified".to_string(),
            ))
        }
    };
    let (host, port) = split_host_port(&host)
        .map_err(|e| ParseError::UnresolvableTarget(format!("invalid Host header: {e}")))?;
    let (path, query, fragment) = match target.form() {
        TargetForm::Origin => split_path(target.as_str()),
        _ => (String::new(), None, None),
    };
    Ok(Uri {
        scheme: options.default_scheme.clone(),
        userinfo: None,
        host,
        port,
        path,
        query,
        fragment,
    })
}
