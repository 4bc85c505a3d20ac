//! The GraphQL server as a lifecycle-managed service.
//!
//! # Responsibilities
//! - Assemble security, schema, metrics and router at construction
//! - Re-provision TLS material on initialize
//! - Bind and serve in the background on start
//! - Drain and release the listener on stop

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum_server::Handle;

use crate::config::{resolve_path, GraphQLConfig};
use crate::http::{build_router, HttpOptions};
use crate::lifecycle::server::{self, limit_header_read, ServerTask};
use crate::lifecycle::shutdown::SHUTDOWN_TIMEOUT;
use crate::lifecycle::{LifecycleError, Operation, Service, ServiceState, Transport};
use crate::observability::{GraphQLMetrics, MetricsError, MetricsRegistry};
use crate::schema::{SchemaError, SchemaProvider};
use crate::security::{SecurityContext, SecurityProvider};

pub const SERVICE_NAME: &str = "GraphQL Server";

/// Construction failures. No listener exists when these occur.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("failed to initialize GraphQL schema: {0}")]
    Schema(#[from] SchemaError),
    #[error("failed to register metrics: {0}")]
    Metrics(#[from] MetricsError),
}

pub struct GraphQLService {
    name: String,
    config: GraphQLConfig,
    security: Arc<dyn SecurityProvider>,
    security_context: SecurityContext,
    router: Router,
    state: ServiceState,
    shutdown_timeout: Duration,
    server: Option<ServerTask>,
}

impl GraphQLService {
    /// Build a service in the `Created` state.
    ///
    /// A failing security provider degrades to plaintext with a warning, and
    /// is not consulted at all when `use_tls` is off. A failing schema
    /// provider fails construction.
    pub fn new(
        config: GraphQLConfig,
        security: Arc<dyn SecurityProvider>,
        schema: &dyn SchemaProvider,
        metrics: &MetricsRegistry,
    ) -> Result<Self, ServiceError> {
        let security_context = if config.use_tls {
            SecurityContext::provision(security.as_ref())
        } else {
            tracing::debug!("TLS disabled, security provider not consulted");
            SecurityContext::Unconfigured
        };

        let schema = schema.build_schema().map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize GraphQL schema");
            e
        })?;
        let metrics = GraphQLMetrics::init(metrics)?;

        tracing::info!(address = %config.address, "GraphQL server address");
        let router = build_router(schema, metrics, &HttpOptions::from(&config));

        let service = Self {
            name: SERVICE_NAME.to_string(),
            config,
            security,
            security_context,
            router,
            state: ServiceState::Created,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
            server: None,
        };
        service.transport().announce(&service.name);
        Ok(service)
    }

    /// Like [`GraphQLService::new`], reading the `[graphql]` section from a
    /// file. A missing or unreadable file falls back to defaults.
    pub fn from_path(
        path: Option<&Path>,
        security: Arc<dyn SecurityProvider>,
        schema: &dyn SchemaProvider,
        metrics: &MetricsRegistry,
    ) -> Result<Self, ServiceError> {
        Self::new(resolve_path(path).graphql, security, schema, metrics)
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn state(&self) -> ServiceState {
        self.state
    }

    pub fn config(&self) -> &GraphQLConfig {
        &self.config
    }

    pub fn security_context(&self) -> &SecurityContext {
        &self.security_context
    }

    /// The transport the listener uses, or would use if started now.
    pub fn transport(&self) -> Transport {
        Transport::select(self.config.use_tls, &self.security_context)
    }

    /// The bound address while running. Useful with port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(ServerTask::local_addr)
    }
}

#[async_trait]
impl Service for GraphQLService {
    fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&mut self) -> Result<(), LifecycleError> {
        self.state.check(Operation::Initialize)?;
        tracing::info!(service = %self.name, "Initializing GraphQL server");

        let provisioned = if self.config.use_tls {
            SecurityContext::try_provision(self.security.as_ref())
        } else {
            Ok(SecurityContext::Unconfigured)
        };

        match provisioned {
            Ok(context) => self.security_context = context,
            Err(e) if self.security_context.is_configured() => {
                tracing::error!(service = %self.name, error = %e, "Failed to initialize security module");
                return Err(LifecycleError::Security(e));
            }
            Err(e) => {
                tracing::warn!(
                    service = %self.name,
                    error = %e,
                    "Security module still unavailable, proceeding without TLS"
                );
            }
        }

        self.transport().announce(&self.name);
        self.state = ServiceState::Initialized;
        Ok(())
    }

    async fn start(&mut self) -> Result<(), LifecycleError> {
        self.state.check(Operation::Start)?;

        let addr = self.config.lookup_addr().await.map_err(LifecycleError::Address)?;
        let (listener, local_addr) = server::bind(addr).await?;
        let transport = self.transport();
        let handle = Handle::new();
        let app = self.router.clone();
        let header_timeout = Duration::from_secs(self.config.read_header_timeout_secs);

        let running = match &transport {
            Transport::Tls(material) => {
                let mut server =
                    axum_server::tls_rustls::from_tcp_rustls(listener, material.rustls_config())
                        .handle(handle.clone());
                limit_header_read(server.http_builder(), header_timeout);
                let serve = server.serve(app.into_make_service());
                ServerTask::spawn(&self.name, handle, local_addr, serve)
            }
            Transport::Plaintext(_) => {
                let mut server = axum_server::from_tcp(listener).handle(handle.clone());
                limit_header_read(server.http_builder(), header_timeout);
                let serve = server.serve(app.into_make_service());
                ServerTask::spawn(&self.name, handle, local_addr, serve)
            }
        };

        tracing::info!(
            service = %self.name,
            address = %local_addr,
            scheme = %transport,
            "GraphQL server listening"
        );

        self.server = Some(running);
        self.state = ServiceState::Running;
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), LifecycleError> {
        let Some(server) = self.server.take() else {
            tracing::debug!(service = %self.name, state = %self.state, "Stop requested while not running");
            return Ok(());
        };

        tracing::info!(service = %self.name, "Stopping GraphQL server");
        let result = server.shutdown(self.shutdown_timeout).await;
        self.state = ServiceState::Stopped;

        match &result {
            Ok(()) => tracing::info!(service = %self.name, "GraphQL server stopped"),
            Err(e) => tracing::error!(service = %self.name, error = %e, "GraphQL server did not stop cleanly"),
        }
        result
    }
}
