// Server module entry
// Accept loop, per-connection serving and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

pub use listener::create_reusable_listener;
pub use signal::{start_signal_handler, SignalHandler};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::config::AppState;
use connection::accept_connection;

/// How often shutdown re-checks the in-flight connection count
const DRAIN_POLL: Duration = Duration::from_millis(50);

/// Accept connections until shutdown is requested, then give in-flight
/// connections up to `write_timeout` seconds to finish.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    signals: Arc<SignalHandler>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        state.logger.error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = signals.wait() => {
                state.logger.info("Shutdown requested, no longer accepting connections");
                break;
            }
        }
    }

    drop(listener);
    drain(&state, &active_connections).await;
    Ok(())
}

async fn drain(state: &AppState, active_connections: &AtomicUsize) {
    let deadline =
        tokio::time::Instant::now() + Duration::from_secs(state.config.performance.write_timeout);

    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            state.logger.info("All connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            state.logger.warn(&format!(
                "Shutdown deadline reached with {remaining} connection(s) still open"
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL).await;
    }
}
