//! C-ABI wrapper around `rawhttp-core`.
//!
//! # Overview
//! Exposes eager parsing of raw HTTP/1.x requests and responses through
//! `extern "C"` functions, so any language with a C FFI can read messages
//! from bytes it received itself and get back their parts and exact wire
//! form.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Input is a pointer and a length; the bytes are only borrowed for the
//!   duration of the call. Everything returned is detached from them.
//! - A single `FfiParseResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `rawhttp_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use rawhttp_core::{ParseOptions, RawHttp};

use types::*;

// ---------------------------------------------------------------------------
// Parser lifecycle
// ---------------------------------------------------------------------------

/// Create a parser with the default (lenient) options.
///
/// The caller must free the returned pointer with `rawhttp_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rawhttp_new() -> *mut FfiRawHttp {
    catch_unwind(|| Box::into_raw(Box::new(FfiRawHttp { inner: RawHttp::new() })))
        .unwrap_or(std::ptr::null_mut())
}

/// Create a parser from a JSON options document, e.g.
/// `{"allow_newline_without_return": false}`. Missing fields keep their
/// defaults.
///
/// Returns null if `options_json` is null or not valid options JSON.
#[unsafe(no_mangle)]
pub extern "C" fn rawhttp_new_with_options(options_json: *const c_char) -> *mut FfiRawHttp {
    catch_unwind(|| {
        if options_json.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(json) = unsafe { CStr::from_ptr(options_json) }.to_str() else {
            return std::ptr::null_mut();
        };
        match ParseOptions::from_json(json) {
            Ok(options) => Box::into_raw(Box::new(FfiRawHttp {
                inner: RawHttp::with_options(options),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a parser created by `rawhttp_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rawhttp_free(parser: *mut FfiRawHttp) {
    if !parser.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(parser) });
        });
    }
}

// ---------------------------------------------------------------------------
// Parse functions
// ---------------------------------------------------------------------------

/// Borrow the caller's input. A null pointer is only allowed with length 0.
fn input<'a>(data: *const u8, len: usize) -> Option<&'a [u8]> {
    if data.is_null() {
        return (len == 0).then_some(&[][..]);
    }
    Some(unsafe { std::slice::from_raw_parts(data, len) })
}

/// Parse a request from `len` bytes at `data`, reading its body.
///
/// Returns a result with `data_tag = Request` on success.
#[unsafe(no_mangle)]
pub extern "C" fn rawhttp_parse_request(
    parser: *const FfiRawHttp,
    data: *const u8,
    len: usize,
) -> *mut FfiParseResult {
    catch_unwind(|| {
        if parser.is_null() {
            return FfiParseResult::null_arg("parser");
        }
        let Some(bytes) = input(data, len) else {
            return FfiParseResult::null_arg("data");
        };
        let parser = unsafe { &*parser };
        match parser
            .inner
            .parse_request_eagerly(bytes)
            .and_then(FfiRequest::from_core)
        {
            Ok(request) => FfiParseResult::ok_request(request),
            Err(e) => FfiParseResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiParseResult::panic("panic in rawhttp_parse_request"))
}

/// Parse a response from `len` bytes at `data`, reading its body.
///
/// `request_method` is the method of the request being answered; it may be
/// null when unknown. Pass `"HEAD"` so a `Content-Length` is not mistaken
/// for a body. A method that is not UTF-8 fails with `InvalidArg`.
/// Returns a result with `data_tag = Response` on success.
#[unsafe(no_mangle)]
pub extern "C" fn rawhttp_parse_response(
    parser: *const FfiRawHttp,
    data: *const u8,
    len: usize,
    request_method: *const c_char,
) -> *mut FfiParseResult {
    catch_unwind(|| {
        if parser.is_null() {
            return FfiParseResult::null_arg("parser");
        }
        let Some(bytes) = input(data, len) else {
            return FfiParseResult::null_arg("data");
        };
        let parser = unsafe { &*parser };
        let method = if request_method.is_null() {
            None
        } else {
            match unsafe { CStr::from_ptr(request_method) }.to_str() {
                Ok(method) => Some(method),
                Err(_) => return FfiParseResult::invalid_arg("request_method", "not UTF-8"),
            }
        };
        let parsed = match method {
            Some(method) => parser.inner.parse_response_to(bytes, method),
            None => parser.inner.parse_response(bytes),
        };
        match parsed
            .and_then(|response| response.eagerly())
            .and_then(FfiResponse::from_core)
        {
            Ok(response) => FfiParseResult::ok_response(response),
            Err(e) => FfiParseResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiParseResult::panic("panic in rawhttp_parse_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiParseResult` returned by any `rawhttp_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn rawhttp_free_result(result: *mut FfiParseResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        result.free_fields();
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rawhttp_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn text(ptr: *mut c_char) -> &'static str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn bytes(b: &FfiBytes) -> &'static [u8] {
        if b.data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(b.data, b.len) }
    }

    fn parse_request(parser: *const FfiRawHttp, msg: &str) -> *mut FfiParseResult {
        rawhttp_parse_request(parser, msg.as_ptr(), msg.len())
    }

    #[test]
    fn parser_new_and_free() {
        let parser = rawhttp_new();
        assert!(!parser.is_null());
        rawhttp_free(parser);
    }

    #[test]
    fn parser_free_null_is_safe() {
        rawhttp_free(std::ptr::null_mut());
        rawhttp_free_result(std::ptr::null_mut());
        rawhttp_free_string(std::ptr::null_mut());
    }

    #[test]
    fn parser_from_json_options() {
        let json = CString::new(r#"{"allow_newline_without_return": false}"#).unwrap();
        let parser = rawhttp_new_with_options(json.as_ptr());
        assert!(!parser.is_null());

        let result = parse_request(parser, "GET / HTTP/1.1\nHost: a\n\n");
        let result_ref = unsafe { &*result };
        assert_eq!(result_ref.error_code, FfiErrorCode::InvalidLineEnding);
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parser_from_bad_json_returns_null() {
        let json = CString::new("{not json").unwrap();
        assert!(rawhttp_new_with_options(json.as_ptr()).is_null());
        assert!(rawhttp_new_with_options(std::ptr::null()).is_null());
    }

    #[test]
    fn parse_request_exposes_parts() {
        let parser = rawhttp_new();
        let result = parse_request(parser, "GET /hello\nHost: www.example.com\nAccept: */*\n\n");
        let result_ref = unsafe { &*result };
        assert_eq!(result_ref.error_code, FfiErrorCode::Ok);
        assert!(result_ref.error_message.is_null());
        assert_eq!(result_ref.data_tag, FfiDataTag::Request);

        let request = unsafe { &*(result_ref.data as *const FfiRequest) };
        assert_eq!(text(request.method), "GET");
        assert_eq!(text(request.target), "/hello");
        assert_eq!(text(request.uri), "http://www.example.com/hello");
        assert_eq!((request.version_major, request.version_minor), (1, 1));
        assert_eq!(request.headers.len, 2);
        let second = unsafe { &*request.headers.items.add(1) };
        assert_eq!(text(second.name), "Accept");
        assert_eq!(text(second.value), "*/*");
        assert!(!request.has_body);
        assert_eq!(
            bytes(&request.wire),
            b"GET /hello HTTP/1.1\r\nHost: www.example.com\r\nAccept: */*\r\n\r\n"
        );

        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parse_request_reads_body() {
        let parser = rawhttp_new();
        let result = parse_request(
            parser,
            "POST /x HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello",
        );
        let result_ref = unsafe { &*result };
        let request = unsafe { &*(result_ref.data as *const FfiRequest) };
        assert!(request.has_body);
        assert_eq!(bytes(&request.body), b"hello");
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parse_request_error_carries_code_and_message() {
        let parser = rawhttp_new();
        let result = parse_request(parser, "GET /hello HTTP/1.1\r\n\r\n");
        let result_ref = unsafe { &*result };
        assert_eq!(result_ref.error_code, FfiErrorCode::UnresolvableTarget);
        assert!(result_ref.data.is_null());
        assert!(text(result_ref.error_message).contains("Host"));
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parse_request_null_args() {
        let result = parse_request(std::ptr::null(), "GET / HTTP/1.1\r\n\r\n");
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        rawhttp_free_result(result);

        let parser = rawhttp_new();
        let result = rawhttp_parse_request(parser, std::ptr::null(), 4);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::NullArg);
        rawhttp_free_result(result);

        let result = rawhttp_parse_request(parser, std::ptr::null(), 0);
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::EmptyMessage);
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parse_response_exposes_parts() {
        let parser = rawhttp_new();
        let msg = "HTTP/1.1 404 Not Found\r\nContent-Length: 4\r\n\r\nnope";
        let result = rawhttp_parse_response(parser, msg.as_ptr(), msg.len(), std::ptr::null());
        let result_ref = unsafe { &*result };
        assert_eq!(result_ref.error_code, FfiErrorCode::Ok);
        assert_eq!(result_ref.data_tag, FfiDataTag::Response);

        let response = unsafe { &*(result_ref.data as *const FfiResponse) };
        assert_eq!(response.status_code, 404);
        assert_eq!(text(response.reason), "Not Found");
        assert_eq!(bytes(&response.body), b"nope");
        assert_eq!(bytes(&response.wire), msg.as_bytes());
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parse_response_to_head_has_no_body() {
        let parser = rawhttp_new();
        let method = CString::new("HEAD").unwrap();
        let msg = "HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n";
        let result = rawhttp_parse_response(parser, msg.as_ptr(), msg.len(), method.as_ptr());
        let result_ref = unsafe { &*result };
        assert_eq!(result_ref.error_code, FfiErrorCode::Ok);
        let response = unsafe { &*(result_ref.data as *const FfiResponse) };
        assert!(!response.has_body);
        assert!(response.body.data.is_null());
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parse_response_rejects_non_utf8_method() {
        let parser = rawhttp_new();
        let method = CString::new(vec![b'H', 0xff, b'D']).unwrap();
        let msg = "HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n";
        let result = rawhttp_parse_response(parser, msg.as_ptr(), msg.len(), method.as_ptr());
        let result_ref = unsafe { &*result };
        assert_eq!(result_ref.error_code, FfiErrorCode::InvalidArg);
        assert!(result_ref.data.is_null());
        assert!(text(result_ref.error_message).contains("request_method"));
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn nul_in_header_is_kept_only_on_the_wire() {
        let parser = rawhttp_new();
        let msg = "GET / HTTP/1.1\r\nHost: a\r\nX-Odd: a\0b\r\n\r\n";
        let result = parse_request(parser, msg);
        let result_ref = unsafe { &*result };
        assert_eq!(result_ref.error_code, FfiErrorCode::Ok);
        let request = unsafe { &*(result_ref.data as *const FfiRequest) };
        let odd = unsafe { &*request.headers.items.add(1) };
        assert_eq!(text(odd.value), "ab");
        assert_eq!(bytes(&request.wire), msg.as_bytes());
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }

    #[test]
    fn parse_response_truncated_body() {
        let parser = rawhttp_new();
        let msg = "HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc";
        let result = rawhttp_parse_response(parser, msg.as_ptr(), msg.len(), std::ptr::null());
        assert_eq!(unsafe { &*result }.error_code, FfiErrorCode::TruncatedInput);
        rawhttp_free_result(result);
        rawhttp_free(parser);
    }
}
