//! Request handler module
//!
//! Method validation, path resolution and static file responses.

pub mod listing;
pub mod path;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, RequestContext};
