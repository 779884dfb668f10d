//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the file handler: content types,
//! validators, byte ranges, response builders and the finalize chain.

pub mod cache;
pub mod finalize;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use finalize::{FinalizeChain, ResponseHook, SetHeader};
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_304_response, build_403_response, build_404_response, build_405_response,
    build_416_response, build_html_response, build_redirect_response, HttpResponse,
};
