//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible fields: `*mut c_char`
//! for text, `FfiBytes` for binary data that may contain NUL, and tagged
//! enums with explicit discriminants. Conversion functions live here to
//! keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{c_void, CString};
use std::os::raw::c_char;

use rawhttp_core::{Detached, ErrorKind, HttpHeaders, ParseError, RawHttp, RawRequest, RawResponse};

/// Opaque handle to a `RawHttp` parser. C callers receive a pointer to this
/// and pass it back into every parse function.
pub struct FfiRawHttp {
    pub(crate) inner: RawHttp,
}

/// Copy `s` into a C string. Interior NUL bytes are dropped.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    CString::new(s.replace('\0', "")).map_or(std::ptr::null_mut(), CString::into_raw)
}

/// Free a string made by `c_string`. Null is ignored.
pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Plain data
// ---------------------------------------------------------------------------

/// An owned byte buffer. `data` is null when `len` is 0.
#[repr(C)]
pub struct FfiBytes {
    pub data: *mut u8,
    pub len: usize,
}

impl FfiBytes {
    pub(crate) fn empty() -> Self {
        FfiBytes {
            data: std::ptr::null_mut(),
            len: 0,
        }
    }

    pub(crate) fn from_vec(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        let boxed = bytes.into_boxed_slice();
        let len = boxed.len();
        FfiBytes {
            data: Box::into_raw(boxed) as *mut u8,
            len,
        }
    }

    /// Release the buffer. Must only be called once per `from_vec`.
    pub(crate) fn free(&self) {
        if !self.data.is_null() && self.len > 0 {
            drop(unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.data, self.len)) });
        }
    }
}

/// A single header field as a pair of C strings.
///
/// C strings cannot hold NUL, so any NUL byte in the field is left out of
/// `name` and `value`. The `wire` buffer of the message keeps it.
#[repr(C)]
pub struct FfiHeader {
    pub name: *mut c_char,
    pub value: *mut c_char,
}

/// Header fields in wire order. `items` is null when `len` is 0.
#[repr(C)]
pub struct FfiHeaderList {
    pub items: *mut FfiHeader,
    pub len: u32,
}

impl FfiHeaderList {
    fn from_core(headers: &HttpHeaders) -> Self {
        let mut items: Vec<FfiHeader> = headers
            .iter()
            .map(|(name, value)| FfiHeader {
                name: c_string(name),
                value: c_string(value),
            })
            .collect();
        if items.is_empty() {
            return FfiHeaderList {
                items: std::ptr::null_mut(),
                len: 0,
            };
        }
        items.shrink_to_fit();
        let len = items.len() as u32;
        let ptr = items.as_mut_ptr();
        std::mem::forget(items);
        FfiHeaderList { items: ptr, len }
    }

    pub(crate) fn free(&self) {
        if self.items.is_null() || self.len == 0 {
            return;
        }
        let items =
            unsafe { Vec::from_raw_parts(self.items, self.len as usize, self.len as usize) };
        for header in &items {
            free_c_string(header.name);
            free_c_string(header.value);
        }
    }
}

/// A parsed request with its body read and its wire form rendered.
#[repr(C)]
pub struct FfiRequest {
    pub method: *mut c_char,
    pub target: *mut c_char,
    pub uri: *mut c_char,
    pub version_major: u8,
    pub version_minor: u8,
    pub headers: FfiHeaderList,
    pub has_body: bool,
    /// Decoded body content.
    pub body: FfiBytes,
    /// The whole message serialized with `CRLF` line endings.
    pub wire: FfiBytes,
}

impl FfiRequest {
    pub(crate) fn from_core(mut request: RawRequest<Detached>) -> Result<Self, ParseError> {
        let wire = request.to_bytes()?;
        let body = request
            .body()
            .as_eager()
            .map_or_else(Vec::new, |body| body.as_bytes().to_vec());
        let version = request.version();
        Ok(FfiRequest {
            method: c_string(request.method()),
            target: c_string(request.target().as_str()),
            uri: c_string(&request.uri().to_string()),
            version_major: version.major,
            version_minor: version.minor,
            headers: FfiHeaderList::from_core(request.headers()),
            has_body: request.has_body(),
            body: FfiBytes::from_vec(body),
            wire: FfiBytes::from_vec(wire),
        })
    }

    fn free(&self) {
        free_c_string(self.method);
        free_c_string(self.target);
        free_c_string(self.uri);
        self.headers.free();
        self.body.free();
        self.wire.free();
    }
}

/// A parsed response with its body read and its wire form rendered.
#[repr(C)]
pub struct FfiResponse {
    pub version_major: u8,
    pub version_minor: u8,
    pub status_code: u16,
    pub reason: *mut c_char,
    pub headers: FfiHeaderList,
    pub has_body: bool,
    /// Decoded body content.
    pub body: FfiBytes,
    /// The whole message serialized with `CRLF` line endings.
    pub wire: FfiBytes,
}

impl FfiResponse {
    pub(crate) fn from_core(mut response: RawResponse<Detached>) -> Result<Self, ParseError> {
        let wire = response.to_bytes()?;
        let body = response
            .body()
            .as_eager()
            .map_or_else(Vec::new, |body| body.as_bytes().to_vec());
        let version = response.version();
        Ok(FfiResponse {
            version_major: version.major,
            version_minor: version.minor,
            status_code: response.status_code(),
            reason: c_string(response.reason()),
            headers: FfiHeaderList::from_core(response.headers()),
            has_body: response.has_body(),
            body: FfiBytes::from_vec(body),
            wire: FfiBytes::from_vec(wire),
        })
    }

    fn free(&self) {
        free_c_string(self.reason);
        self.headers.free();
        self.body.free();
        self.wire.free();
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiParseResult`. Values 1 to 10 match
/// `rawhttp_core::ErrorKind`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
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
    Panic = 11,
    NullArg = 12,
    /// An argument was present but unusable, e.g. a method that is not UTF-8.
    InvalidArg = 13,
}

impl From<ErrorKind> for FfiErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::EmptyMessage => FfiErrorCode::EmptyMessage,
            ErrorKind::MalformedStartLine => FfiErrorCode::MalformedStartLine,
            ErrorKind::MalformedHeaderLine => FfiErrorCode::MalformedHeaderLine,
            ErrorKind::InvalidLineEnding => FfiErrorCode::InvalidLineEnding,
            ErrorKind::AmbiguousFraming => FfiErrorCode::AmbiguousFraming,
            ErrorKind::UnresolvableTarget => FfiErrorCode::UnresolvableTarget,
            ErrorKind::TruncatedInput => FfiErrorCode::TruncatedInput,
            ErrorKind::BodyAlreadyConsumed => FfiErrorCode::BodyAlreadyConsumed,
            ErrorKind::Decode => FfiErrorCode::Decode,
            ErrorKind::Io => FfiErrorCode::Io,
        }
    }
}

/// Tag that tells `rawhttp_free_result` what `FfiParseResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Request = 1,
    Response = 2,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to an `FfiRequest` or `FfiResponse` (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiParseResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiParseResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiParseResult {
            error_code,
            error_message,
            data_tag,
            data,
        }))
    }

    pub(crate) fn ok_request(request: FfiRequest) -> *mut Self {
        let data = Box::into_raw(Box::new(request)) as *mut c_void;
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), FfiDataTag::Request, data)
    }

    pub(crate) fn ok_response(response: FfiResponse) -> *mut Self {
        let data = Box::into_raw(Box::new(response)) as *mut c_void;
        Self::boxed(FfiErrorCode::Ok, std::ptr::null_mut(), FfiDataTag::Response, data)
    }

    /// Build an error result from a `ParseError`.
    pub(crate) fn from_error(err: ParseError) -> *mut Self {
        Self::boxed(
            err.kind().into(),
            c_string(&err.to_string()),
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(&format!("null argument: {name}")),
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for an argument that cannot be used.
    pub(crate) fn invalid_arg(name: &str, reason: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::InvalidArg,
            c_string(&format!("invalid argument {name}: {reason}")),
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg),
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Free the payload and message, not the envelope itself.
    pub(crate) fn free_fields(&self) {
        free_c_string(self.error_message);
        if self.data.is_null() {
            return;
        }
        match self.data_tag {
            FfiDataTag::Request => {
                let request = unsafe { Box::from_raw(self.data as *mut FfiRequest) };
                request.free();
            }
            FfiDataTag::Response => {
                let response = unsafe { Box::from_raw(self.data as *mut FfiResponse) };
                response.free();
            }
            FfiDataTag::None => {}
        }
    }
}
