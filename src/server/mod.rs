// Server module entry point
// Binds the listener, runs the accept loop and handles shutdown signals

pub mod connection;
pub mod listener;
pub mod signal;

// Rust 不允许 loop 作为模块名（关键字），改用 server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppState, Config};

// 重新导出常用类型
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::{start_signal_handler, SignalHandler};

/// A bound, not yet running file server
///
/// Holding a `Server` means the port is bound; [`Server::run_until`] consumes
/// it and releases the port when it returns.
pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
    local_addr: SocketAddr,
}

impl Server {
    /// Resolve the document root, build the finalize chain and bind the socket.
    ///
    /// Must be called from within a Tokio runtime. Nothing is logged here; the
    /// returned error names the address that could not be bound.
    pub fn bind(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let state = AppState::new(config)?;
        let addr = config.get_socket_addr()?;

        let listener = create_listener(addr)
            .map_err(|e| std::io::Error::new(e.kind(), format!("failed to bind {addr}: {e}")))?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            state: Arc::new(state),
            local_addr,
        })
    }

    /// The bound address (useful when the configured port is 0)
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serve until `shutdown` resolves, then release the port
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let active_connections = Arc::new(AtomicUsize::new(0));
        start_server_loop(self.listener, self.state, active_connections, shutdown).await
    }
}
