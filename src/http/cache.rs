//! HTTP cache validation module
//!
//! Provides `ETag`/`Last-Modified` generation and conditional request handling.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::SystemTime;

/// IMF-fixdate layout used by `Last-Modified` and `If-Modified-Since`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Generate `ETag` using fast hashing
///
/// # Arguments
/// * `content` - File content
///
/// # Returns
/// Quoted `ETag` string, e.g., `"abc123def"`
pub fn generate_etag(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    let v = hasher.finish();
    format!("\"{v:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Weak validators: `W/"abc123"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Format a timestamp as an HTTP date
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(HTTP_DATE_FORMAT).to_string()
}

/// Parse an HTTP date, returning `None` if malformed
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .map(|d| d.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, HTTP_DATE_FORMAT).map(|n| n.and_utc()))
        .ok()
}

/// Decide whether a conditional GET should be answered with 304
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent. Dates compare at second precision.
pub fn is_not_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    modified: Option<SystemTime>,
) -> bool {
    if if_none_match.is_some() {
        return check_etag_match(if_none_match, etag);
    }

    let (Some(since), Some(modified)) = (if_modified_since.and_then(parse_http_date), modified)
    else {
        return false;
    };

    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}
