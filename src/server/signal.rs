// Signal handling module
//
// SIGTERM and SIGINT (Ctrl+C) request a graceful shutdown. On non-unix
// targets only Ctrl+C is watched.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger::Logger;

/// Shutdown coordination between the signal task and the accept loop
pub struct SignalHandler {
    /// Fired once when shutdown is requested
    pub shutdown: Notify,
    pub shutdown_requested: AtomicBool,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Notify::new(),
            shutdown_requested: AtomicBool::new(false),
        }
    }

    /// Ask the accept loop to stop. A later `wait` still returns immediately.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        if self.is_shutdown_requested() {
            return;
        }
        self.shutdown.notified().await;
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Register signal listeners and spawn the task that watches them
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>, logger: Arc<Logger>) -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::spawn(async move {
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        };
        logger.info(&format!("[SIGNAL] {name} received, shutting down"));
        handler.request_shutdown();
    });

    Ok(())
}

#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>, logger: Arc<Logger>) -> io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger.info("[SIGNAL] Ctrl+C received, shutting down");
            handler.request_shutdown();
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_request_before_wait_is_not_lost() {
        let handler = SignalHandler::new();
        handler.request_shutdown();
        tokio::time::timeout(Duration::from_secs(1), handler.wait())
            .await
            .unwrap();
        assert!(handler.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_wait_wakes_on_request() {
        let handler = Arc::new(SignalHandler::new());
        let waiter = Arc::clone(&handler);
        let task = tokio::spawn(async move { waiter.wait().await });

        tokio::task::yield_now().await;
        handler.request_shutdown();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
