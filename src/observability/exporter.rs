//! The Prometheus scrape endpoint as a lifecycle-managed service.

use std::net::SocketAddr;

use async_trait::async_trait;
use axum_server::Handle;

use crate::lifecycle::server::{self, ServerTask};
use crate::lifecycle::{LifecycleError, Operation, Service, ServiceState, SHUTDOWN_TIMEOUT};
use crate::observability::metrics::{serve_metrics, MetricsRegistry};

pub const EXPORTER_NAME: &str = "Metrics Exporter";

pub struct MetricsExporter {
    address: SocketAddr,
    registry: MetricsRegistry,
    state: ServiceState,
    server: Option<ServerTask>,
}

impl MetricsExporter {
    pub fn new(address: SocketAddr, registry: MetricsRegistry) -> Self {
        Self {
            address,
            registry,
            state: ServiceState::Created,
            server: None,
        }
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// Bound address while running.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(ServerTask::local_addr)
    }
}

#[async_trait]
impl Service for MetricsExporter {
    fn name(&self) -> &str {
        EXPORTER_NAME
    }

    async fn initialize(&mut self) -> Result<(), LifecycleError> {
        self.state.check(Operation::Initialize)?;
        self.state = ServiceState::Initialized;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), LifecycleError> {
        self.state.check(Operation::Start)?;

        let (listener, local_addr) = server::bind(self.address).await?;
        let handle = Handle::new();
        let serve = serve_metrics(listener, self.registry.clone(), handle.clone());
        self.server = Some(ServerTask::spawn(EXPORTER_NAME, handle, local_addr, serve));
        self.state = ServiceState::Running;

        tracing::info!(address = %local_addr, "Metrics endpoint listening");
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), LifecycleError> {
        let Some(server) = self.server.take() else {
            return Ok(());
        };

        let result = server.shutdown(SHUTDOWN_TIMEOUT).await;
        self.state = ServiceState::Stopped;
        result
    }
}
