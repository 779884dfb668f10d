// Signal handling module
//
// Supported signals:
// - SIGINT:  Graceful shutdown (Ctrl+C)
// - SIGTERM: Graceful shutdown

use std::sync::Arc;
use tokio::sync::Notify;

/// Signal handler state
pub struct SignalHandler {
    /// Shutdown signal (SIGTERM, SIGINT)
    pub shutdown: Arc<Notify>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Request shutdown; a waiter that arrives later still sees it
    pub fn trigger(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once shutdown has been triggered
    pub async fn wait(&self) {
        self.shutdown.notified().await;
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start signal handlers (Unix)
///
/// Registers SIGINT and SIGTERM up front so registration failures reach the
/// caller, then waits for either in a background task.
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => println!("\n[SIGNAL] SIGINT received (Ctrl+C), shutting down..."),
            _ = sigterm.recv() => println!("\n[SIGNAL] SIGTERM received, shutting down..."),
        }
        handler.trigger();
    });

    Ok(())
}

/// Fallback for non-Unix targets - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            println!("\n[SIGNAL] Ctrl+C received, shutting down...");
            handler.trigger();
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_before_wait() {
        let handler = SignalHandler::new();
        handler.trigger();

        tokio::time::timeout(Duration::from_secs(1), handler.wait())
            .await
            .expect("wait should resolve after trigger");
    }

    #[tokio::test]
    async fn test_trigger_wakes_waiter() {
        let handler = Arc::new(SignalHandler::new());
        let waiter = {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move { handler.wait().await })
        };

        tokio::task::yield_now().await;
        handler.trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
