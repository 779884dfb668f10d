//! HTTP Range request parsing module
//!
//! Single byte-range support (RFC 7233). Multi-range requests fall back to
//! the full representation.

/// Inclusive byte range resolved against a known file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    /// Number of bytes covered; never zero
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this range
    pub fn content_range(self, total: usize) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Serve this slice with 206
    Satisfiable(ByteRange),
    /// Answer 416
    NotSatisfiable,
    /// No Range header, or one we ignore (serve the full body)
    Ignored,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end`
/// - `bytes=start-`
/// - `bytes=-suffix`
///
/// # Examples
/// ```
/// use coi_serve::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// let result = parse_range_header(Some("bytes=0-99"), 1000);
/// assert_eq!(result, RangeParseResult::Satisfiable(ByteRange { start: 0, end: 99 }));
///
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::Ignored);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::Ignored;
    };

    if spec.contains(',') {
        return RangeParseResult::Ignored;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::Ignored;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        return suffix_range(last, file_size);
    }

    let Ok(start) = first.parse::<usize>() else {
        return RangeParseResult::Ignored;
    };
    let end = if last.is_empty() {
        None
    } else {
        match last.parse::<usize>() {
            Ok(e) => Some(e),
            Err(_) => return RangeParseResult::Ignored,
        }
    };

    if end.is_some_and(|e| e < start) {
        // Syntactically invalid per RFC 7233; ignore rather than 416
        return RangeParseResult::Ignored;
    }
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last_byte = file_size - 1;
    RangeParseResult::Satisfiable(ByteRange {
        start,
        end: end.map_or(last_byte, |e| e.min(last_byte)),
    })
}

/// `bytes=-N`: the last N bytes
fn suffix_range(suffix: &str, file_size: usize) -> RangeParseResult {
    let Ok(n) = suffix.parse::<usize>() else {
        return RangeParseResult::Ignored;
    };
    if n == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Satisfiable(ByteRange {
        start: file_size.saturating_sub(n),
        end: file_size - 1,
    })
}
