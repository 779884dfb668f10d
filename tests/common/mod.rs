//! Shared helpers for integration tests: scratch document roots, a running
//! server handle and a minimal raw HTTP/1.1 client.

#![allow(dead_code)]

#[path = "../../src/test_support.rs"]
mod test_support;

pub use test_support::TempDir;

use coi_serve::config::Config;
use coi_serve::server::Server;
use std::net::SocketAddr;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Loopback config on an ephemeral port serving `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.server.host = "127.0.0.1".to_string();
    config.server.port = 0;
    config.server.root = root.to_path_buf();
    config.logging.access_log = false;
    config
}

/// A server running in a background task
pub struct RunningServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<std::io::Result<()>>>,
}

impl RunningServer {
    pub async fn start(config: &Config) -> Self {
        let server = Server::bind(config).unwrap();
        let addr = server.local_addr();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(server.run_until(async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    /// Trigger shutdown and wait for the accept loop to return
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
    }
}

/// Parsed HTTP response
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// All values of a header (name compared case-insensitively)
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).first().copied()
    }

    /// Both isolation headers present exactly once with their literal values
    pub fn assert_isolated(&self) {
        assert_eq!(
            self.header_values("Cross-Origin-Opener-Policy"),
            vec!["same-origin"],
            "COOP on {} response",
            self.status
        );
        assert_eq!(
            self.header_values("Cross-Origin-Embedder-Policy"),
            vec!["require-corp"],
            "COEP on {} response",
            self.status
        );
    }
}

/// Send `method target` with extra header lines and read until the server closes
pub async fn send(addr: SocketAddr, method: &str, target: &str, extra: &[(&str, &str)]) -> RawResponse {
    try_send(addr, method, target, extra)
        .await
        .expect("server sent a complete response")
}

/// Like [`send`], but `None` when the connection is dropped without a response
pub async fn try_send(
    addr: SocketAddr,
    method: &str,
    target: &str,
    extra: &[(&str, &str)],
) -> Option<RawResponse> {
    let mut request = format!("{method} {target} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (name, value) in extra {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    if method == "POST" {
        request.push_str("Content-Length: 0\r\n");
    }
    request.push_str("\r\n");

    send_raw(addr, request.as_bytes()).await
}

/// Write `request` verbatim and read until the server closes
pub async fn send_raw(addr: SocketAddr, request: &[u8]) -> Option<RawResponse> {
    let mut stream = TcpStream::connect(addr).await.ok()?;
    // A rejected connection may be reset before the write lands
    let _ = stream.write_all(request).await;

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.ok()?;
    parse_response(&raw)
}

pub async fn get(addr: SocketAddr, target: &str) -> RawResponse {
    send(addr, "GET", target, &[]).await
}

fn parse_response(raw: &[u8]) -> Option<RawResponse> {
    let split = raw.windows(4).position(|w| w == b"\r\n\r\n")?;
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();

    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();

    Some(RawResponse {
        status,
        headers,
        body,
    })
}
