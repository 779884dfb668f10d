//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, dispatch to the
//! file responder, response finalization and access logging.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, HttpResponse};
use crate::logger::{self, AccessLogEntry};
use hyper::body::Body;
use hyper::header::{IF_MODIFIED_SINCE, IF_NONE_MATCH, RANGE, REFERER, USER_AGENT};
use hyper::{HeaderMap, Method, Request, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext<'a> {
    /// Raw (percent-encoded) URI path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub range_header: Option<&'a str>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>) -> Self {
        let headers = req.headers();
        Self {
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: req.method() == Method::HEAD,
            if_none_match: header_str(headers, IF_NONE_MATCH),
            if_modified_since: header_str(headers, IF_MODIFIED_SINCE),
            range_header: header_str(headers, RANGE),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every response, including method errors, passes through the finalize chain.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<HttpResponse, Infallible> {
    let started = Instant::now();

    let mut response = match check_http_method(req.method()) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext::from_request(&req);
            static_files::serve(&ctx, &state).await
        }
    };

    state.finalize.apply(&mut response);

    if state.access_log {
        log_access(&req, &response, peer_addr, started, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Only GET and HEAD reach the file responder
fn check_http_method(method: &Method) -> Option<HttpResponse> {
    match *method {
        Method::GET | Method::HEAD => None,
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &HttpResponse,
    peer_addr: SocketAddr,
    started: Instant,
    format: &str,
) {
    logger::log_access(&access_entry(req, response, peer_addr, started), format);
}

fn access_entry<B>(
    req: &Request<B>,
    response: &HttpResponse,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let headers = req.headers();
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header_str(headers, REFERER).map(ToString::to_string);
    entry.user_agent = header_str(headers, USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn header_str(headers: &HeaderMap, name: hyper::header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
