//! Static file serving module
//!
//! Turns a resolved request path into a response: file bodies with
//! validators and byte ranges, directory listings, redirects and errors.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::path::{self, Resolved};
use crate::handler::router::RequestContext;
use crate::http::response::{build_file_response, build_partial_response, FileMeta};
use crate::http::{self, cache, mime, HttpResponse, RangeParseResult};
use crate::logger;
use hyper::body::Bytes;
use std::path::Path;
use tokio::fs;

/// Serve the request path from the document root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> HttpResponse {
    let resolved = path::resolve(
        &state.root,
        ctx.path,
        ctx.query,
        &state.config.http.index_files,
    )
    .await;

    match resolved {
        Resolved::File(file) => serve_file(ctx, &file).await,
        Resolved::Directory(dir) if state.config.http.directory_listing => {
            serve_listing(ctx, &dir).await
        }
        Resolved::Directory(_) | Resolved::NotFound => http::build_404_response(),
        Resolved::Redirect(location) => http::build_redirect_response(&location),
        Resolved::Forbidden => {
            logger::log_warning(&format!("Path traversal attempt blocked: {}", ctx.path));
            http::build_403_response()
        }
    }
}

/// Serve a single file with `ETag`, `Last-Modified` and Range support
pub async fn serve_file(ctx: &RequestContext<'_>, file: &Path) -> HttpResponse {
    let data = match fs::read(file).await {
        Ok(data) => Bytes::from(data),
        Err(e) => {
            logger::log_error(&format!("Failed to read file '{}': {e}", file.display()));
            return http::build_404_response();
        }
    };

    let modified = fs::metadata(file).await.and_then(|m| m.modified()).ok();
    let last_modified = modified.map(cache::format_http_date);
    let etag = cache::generate_etag(&data);

    if cache::is_not_modified(ctx.if_none_match, ctx.if_modified_since, &etag, modified) {
        return http::build_304_response(&etag, last_modified.as_deref());
    }

    let meta = FileMeta {
        content_type: mime::content_type_for(file),
        etag: &etag,
        last_modified: last_modified.as_deref(),
    };
    let total_size = data.len();

    match http::parse_range_header(ctx.range_header, total_size) {
        RangeParseResult::Satisfiable(range) => {
            let slice = data.slice(range.start..=range.end);
            build_partial_response(slice, &meta, range, total_size, ctx.is_head)
        }
        RangeParseResult::NotSatisfiable => http::build_416_response(total_size),
        RangeParseResult::Ignored => build_file_response(data, &meta, ctx.is_head),
    }
}

/// Serve an HTML listing of a directory
pub async fn serve_listing(ctx: &RequestContext<'_>, dir: &Path) -> HttpResponse {
    match listing::read_entries(dir).await {
        Ok(entries) => http::build_html_response(listing::render(ctx.path, &entries), ctx.is_head),
        Err(e) => {
            logger::log_error(&format!("Failed to list '{}': {e}", dir.display()));
            http::build_404_response()
        }
    }
}
