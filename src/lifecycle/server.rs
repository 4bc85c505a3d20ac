//! Background serve loops.
//!
//! # Responsibilities
//! - Bind a listener before anything is spawned, so bind errors fail `start`
//! - Track a spawned serve loop together with the handle that stops it
//! - Stop within one deadline: drain, then wait for the loop to exit

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum_server::Handle;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::lifecycle::shutdown::{self, DrainOutcome};
use crate::lifecycle::LifecycleError;

/// Bind `addr` and hand back a std listener ready for axum-server.
pub async fn bind(addr: SocketAddr) -> Result<(std::net::TcpListener, SocketAddr), LifecycleError> {
    let bind_err = |source| LifecycleError::Bind { addr, source };

    let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
    let local_addr = listener.local_addr().map_err(bind_err)?;
    // into_std leaves the socket in non-blocking mode.
    let listener = listener.into_std().map_err(bind_err)?;
    Ok((listener, local_addr))
}

/// Close HTTP/1 connections whose request headers do not arrive in time.
pub fn limit_header_read(builder: &mut ConnBuilder<TokioExecutor>, timeout: Duration) {
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(timeout);
}

/// A serve loop running on its own task.
pub struct ServerTask {
    handle: Handle,
    task: JoinHandle<io::Result<()>>,
    local_addr: SocketAddr,
}

impl ServerTask {
    /// Spawn `serve`, logging how it ends under `name`.
    pub fn spawn<F>(name: &str, handle: Handle, local_addr: SocketAddr, serve: F) -> Self
    where
        F: Future<Output = io::Result<()>> + Send + 'static,
    {
        let name = name.to_string();
        let task = tokio::spawn(async move {
            let result = serve.await;
            match &result {
                Ok(()) => tracing::debug!(service = %name, "Serve loop exited"),
                Err(e) => tracing::error!(service = %name, error = %e, "Serve loop failed"),
            }
            result
        });

        Self {
            handle,
            task,
            local_addr,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Drain, then wait for the serve task. Both share one deadline; a task
    /// still running when it passes is aborted.
    pub async fn shutdown(mut self, timeout: Duration) -> Result<(), LifecycleError> {
        let deadline = Instant::now() + timeout;
        let outcome = shutdown::drain(&self.handle, timeout).await;
        let exited = tokio::time::timeout_at(deadline, &mut self.task).await;

        if exited.is_err() {
            self.task.abort();
        }
        if let DrainOutcome::Forced { remaining } = outcome {
            return Err(LifecycleError::DrainTimeout { remaining, timeout });
        }

        match exited {
            Ok(joined) => joined?.map_err(LifecycleError::Serve),
            Err(_) => Err(LifecycleError::DrainTimeout {
                remaining: self.handle.connection_count(),
                timeout,
            }),
        }
    }
}
