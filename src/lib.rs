//! Static file server for local development that adds the cross-origin
//! isolation headers (`Cross-Origin-Opener-Policy: same-origin`,
//! `Cross-Origin-Embedder-Policy: require-corp`) to every response.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

#[cfg(test)]
mod test_support;
