//! Request path resolution
//!
//! Maps a URL path onto the document root without ever leaving it.

use percent_encoding::percent_decode_str;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Outcome of mapping a request path onto the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Regular file to serve
    File(PathBuf),
    /// Directory without an index file
    Directory(PathBuf),
    /// Directory requested without trailing slash; value is the new location
    Redirect(String),
    NotFound,
    /// Path escapes the root or contains an illegal segment
    Forbidden,
}

/// Resolve `path` (raw, still percent-encoded) under the canonical `root`
///
/// `root` must already be canonical, otherwise the containment check rejects
/// everything.
pub async fn resolve(
    root: &Path,
    path: &str,
    query: Option<&str>,
    index_files: &[String],
) -> Resolved {
    let decoded = percent_decode_str(path).decode_utf8_lossy();

    let mut target = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Resolved::Forbidden,
            _ if !is_plain_segment(segment) => return Resolved::Forbidden,
            _ => target.push(segment),
        }
    }

    // Missing files and unreadable paths look the same to the client
    let Ok(canonical) = fs::canonicalize(&target).await else {
        return Resolved::NotFound;
    };
    if !canonical.starts_with(root) {
        return Resolved::Forbidden;
    }

    let wants_directory = path.ends_with('/');

    if is_dir(&canonical).await {
        if !wants_directory {
            return Resolved::Redirect(directory_location(path, query));
        }

        for index in index_files {
            let candidate = canonical.join(index);
            if !is_file(&candidate).await {
                continue;
            }
            return match fs::canonicalize(&candidate).await {
                Ok(c) if c.starts_with(root) => Resolved::File(c),
                Ok(_) => Resolved::Forbidden,
                Err(_) => Resolved::NotFound,
            };
        }

        return Resolved::Directory(canonical);
    }

    if wants_directory {
        return Resolved::NotFound;
    }

    Resolved::File(canonical)
}

/// Same-origin `Location` for a directory requested without its trailing slash
///
/// Leading slashes collapse to one: `//host` would be read by browsers as a
/// scheme-relative URL pointing at another origin.
fn directory_location(path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    match query {
        Some(q) => format!("/{path}/?{q}"),
        None => format!("/{path}/"),
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

/// A segment that maps to exactly one normal path component
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains(['\\', '\0']) {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
