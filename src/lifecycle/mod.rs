//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Construct (service.rs):
//!     Config → SecurityProvider → SchemaProvider → metrics registration → Router
//!
//! Initialize → Start → Stop (service.rs, state.rs):
//!     re-provision TLS → bind (transport.rs picks TLS or plaintext) → serve in background (server.rs)
//!     → drain in-flight requests (shutdown.rs) → force close at deadline
//!
//! Hosting (registry.rs, signals.rs):
//!     start services in order → wait for SIGINT/SIGTERM → stop in reverse
//! ```
//!
//! # Design Decisions
//! - Start never blocks: serving happens on a spawned task
//! - Shutdown has timeout: forced close after deadline
//! - Callers serialize lifecycle calls; `&mut self` enforces it

pub mod registry;
pub mod server;
pub mod service;
pub mod shutdown;
pub mod signals;
pub mod state;
pub mod transport;

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinError;

use crate::security::SecurityError;

pub use registry::ServiceRegistry;
pub use server::ServerTask;
pub use service::{GraphQLService, ServiceError};
pub use shutdown::SHUTDOWN_TIMEOUT;
pub use state::{Operation, ServiceState};
pub use transport::Transport;

/// The contract a host process uses to manage sibling services.
#[async_trait]
pub trait Service: Send {
    fn name(&self) -> &str;

    /// Pre-flight setup. May be repeated before `start`.
    async fn initialize(&mut self) -> Result<(), LifecycleError>;

    /// Begin serving in the background and return.
    async fn start(&mut self) -> Result<(), LifecycleError>;

    /// Stop accepting work, drain, and release resources. A no-op when
    /// nothing is running.
    async fn stop(&mut self) -> Result<(), LifecycleError>;
}

/// Error type for lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("cannot {operation} a service that is {state}")]
    InvalidTransition {
        operation: Operation,
        state: ServiceState,
    },
    #[error("security module initialization failed: {0}")]
    Security(#[source] SecurityError),
    #[error("invalid listen address: {0}")]
    Address(#[source] io::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
    #[error("{remaining} connection(s) still open after {timeout:?}, closed forcibly")]
    DrainTimeout { remaining: usize, timeout: Duration },
    #[error("server task failed: {0}")]
    Task(#[from] JoinError),
}
