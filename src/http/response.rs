//! HTTP response building module
//!
//! Provides builders for the status codes the file server emits. Headers added
//! here are per-response; server-wide headers are added later by the
//! finalize chain.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
    LOCATION,
};
use hyper::{Response, StatusCode};

use super::range::ByteRange;

pub type HttpResponse = Response<Full<Bytes>>;

/// Validators and type information for a file representation
#[derive(Debug, Clone)]
pub struct FileMeta<'a> {
    pub content_type: &'a str,
    pub etag: &'a str,
    pub last_modified: Option<&'a str>,
}

/// Build 200 response for a whole file
pub fn build_file_response(data: Bytes, meta: &FileMeta<'_>, is_head: bool) -> HttpResponse {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, meta.content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, meta.etag);
    if let Some(last_modified) = meta.last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 206 Partial Content response; `data` must already be the sliced range
pub fn build_partial_response(
    data: Bytes,
    meta: &FileMeta<'_>,
    range: ByteRange,
    total_size: usize,
    is_head: bool,
) -> HttpResponse {
    let body = if is_head { Bytes::new() } else { data };

    let mut builder = Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(CONTENT_TYPE, meta.content_type)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(total_size))
        .header(ACCEPT_RANGES, "bytes")
        .header(ETAG, meta.etag);
    if let Some(last_modified) = meta.last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("206", &e))
}

/// Build 304 Not Modified response
pub fn build_304_response(etag: &str, last_modified: Option<&str>) -> HttpResponse {
    let mut builder = Response::builder()
        .status(StatusCode::NOT_MODIFIED)
        .header(ETAG, etag);
    if let Some(last_modified) = last_modified {
        builder = builder.header(LAST_MODIFIED, last_modified);
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 301 redirect response
pub fn build_redirect_response(location: &str) -> HttpResponse {
    Response::builder()
        .status(StatusCode::MOVED_PERMANENTLY)
        .header(LOCATION, location)
        .header(CONTENT_LENGTH, 0)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("301", &e))
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> HttpResponse {
    let content_length = content.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("HTML", &e))
}

/// Build 403 Forbidden response
pub fn build_403_response() -> HttpResponse {
    build_text_response(StatusCode::FORBIDDEN, "403 Forbidden")
}

/// Build 404 Not Found response
pub fn build_404_response() -> HttpResponse {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> HttpResponse {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, "GET, HEAD")
        .body(Full::new(Bytes::from_static(b"405 Method Not Allowed")))
        .unwrap_or_else(|e| fallback("405", &e))
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: usize) -> HttpResponse {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain")
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .body(Full::new(Bytes::from_static(b"416 Range Not Satisfiable")))
        .unwrap_or_else(|e| fallback("416", &e))
}

fn build_text_response(status: StatusCode, text: &'static str) -> HttpResponse {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from_static(text.as_bytes())))
        .unwrap_or_else(|e| fallback(status.as_str(), &e))
}

/// Log the build error and return an empty 500
fn fallback(status: &str, error: &hyper::http::Error) -> HttpResponse {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
