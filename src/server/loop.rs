// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop on `listener` until `shutdown` completes.
///
/// The listener is dropped before this returns, on every path, so the port
/// is free for the next bind as soon as the call finishes.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    active_connections: Arc<AtomicUsize>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    logger::log_shutdown(&addr);
    Ok(())
}
