//! Graceful drain of a running listener.
//!
//! Stopping first closes the listener so no new connections are accepted,
//! then waits for in-flight connections to finish. Whatever is still open
//! at the deadline is closed forcibly.

use std::time::Duration;

use axum_server::Handle;

/// Default drain deadline.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Drained,
    Forced { remaining: usize },
}

/// Stop accepting, wait up to `timeout` for open connections, then force.
pub async fn drain(handle: &Handle, timeout: Duration) -> DrainOutcome {
    // No server-side deadline; the forced close below owns it.
    handle.graceful_shutdown(None);

    match tokio::time::timeout(timeout, wait_for_connections(handle)).await {
        Ok(()) => DrainOutcome::Drained,
        Err(_) => {
            let remaining = handle.connection_count();
            if remaining == 0 {
                return DrainOutcome::Drained;
            }
            tracing::warn!(remaining, ?timeout, "Drain deadline reached, closing connections");
            handle.shutdown();
            DrainOutcome::Forced { remaining }
        }
    }
}

async fn wait_for_connections(handle: &Handle) {
    loop {
        let open = handle.connection_count();
        if open == 0 {
            return;
        }
        tracing::debug!(open, "Waiting for connections to close");
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
