//! Raw HTTP/1.x message parsing and serialization.
//!
//! # Overview
//! Reads requests and responses from strings, files or any `BufRead`
//! stream and writes them back byte for byte. The crate never opens a
//! connection: the caller owns the transport and hands over the bytes
//! (host-does-IO pattern), so the same parser serves sockets, fixtures and
//! captured traffic alike.
//!
//! # Design
//! - `RawHttp` runs one pass per message: start line, headers, URI
//!   resolution (requests), body framing.
//! - A parsed message keeps its body in the source (`LazyBody`) until the
//!   caller reads it, so a keep-alive stream can be parsed message after
//!   message. `eagerly` reads the body and detaches the message.
//! - Headers are stored as written, in order, duplicates included.
//!   Serialization trusts them and recomputes nothing.
//!
//! ```
//! use rawhttp_core::RawHttp;
//!
//! let mut request = RawHttp::new()
//!     .parse_request_str("GET /hello\nHost: www.example.com\n\n")
//!     .unwrap();
//! assert_eq!(request.uri().to_string(), "http://www.example.com/hello");
//! assert_eq!(
//!     request.to_bytes().unwrap(),
//!     b"GET /hello HTTP/1.1\r\nHost: www.example.com\r\n\r\n"
//! );
//! ```

pub mod body;
pub mod cursor;
pub mod error;
pub mod headers;
mod log;
pub mod message;
pub mod options;
pub mod parser;
pub mod start_line;
pub mod uri;

pub use body::{Body, Charset, Detached, EagerBody, Framing, LazyBody};
pub use cursor::ByteCursor;
pub use error::{ErrorKind, ParseError};
pub use headers::HttpHeaders;
pub use message::{RawRequest, RawResponse};
pub use options::ParseOptions;
pub use parser::RawHttp;
pub use start_line::{HttpVersion, RequestLine, RequestTarget, StartLine, StatusLine, TargetForm};
pub use uri::Uri;
