//! GraphQL health service.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │              GRAPHQL SERVICE                 │
//!                        │                                              │
//!     Client Request     │  ┌──────────┐   ┌─────────┐   ┌──────────┐  │
//!     ───────────────────┼─▶│ listener │──▶│  http   │──▶│  schema  │  │
//!                        │  │ TLS/mTLS │   │ router  │   │ (Query)  │  │
//!                        │  └──────────┘   └────┬────┘   └──────────┘  │
//!                        │                      │                       │
//!                        │                      ▼                       │
//!                        │               ┌─────────────┐  /metrics    │
//!                        │               │  metrics    │──────────────┼──▶ Prometheus
//!                        │               └─────────────┘              │
//!                        │                                              │
//!                        │  ┌────────────────────────────────────────┐ │
//!                        │  │  config · security · lifecycle · logs  │ │
//!                        │  └────────────────────────────────────────┘ │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use graphql_service::config::{load_config, resolve, AppConfig, DEFAULT_LOG_LEVEL};
use graphql_service::lifecycle::signals::shutdown_signal;
use graphql_service::observability::logging::{effective_level, init_tracing};
use graphql_service::observability::MetricsExporter;
use graphql_service::{
    GraphQLService, MetricsRegistry, MtlsProvider, RootSchemaProvider, ServiceRegistry,
};

#[derive(Parser)]
#[command(name = "graphql-service")]
#[command(about = "GraphQL health endpoint with optional mutual TLS", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "GRAPHQL_SERVICE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => load_config(path),
        None => Ok(AppConfig::default()),
    };
    let log_level = match &loaded {
        Ok(config) => effective_level(&config.observability.log_level),
        Err(_) => DEFAULT_LOG_LEVEL,
    };
    init_tracing(log_level)?;

    tracing::info!("graphql-service v{} starting", env!("CARGO_PKG_VERSION"));
    let config = resolve(loaded);

    let registry = MetricsRegistry::new()?;
    let security = Arc::new(MtlsProvider::from_config(&config.graphql, &config.security));
    let schema = RootSchemaProvider::from_config(&config.graphql);
    let service = GraphQLService::new(config.graphql, security, &schema, &registry)?;

    let mut services = ServiceRegistry::new();
    if config.observability.metrics_enabled {
        let address: SocketAddr = config.observability.metrics_address.parse()?;
        services.register(Box::new(MetricsExporter::new(address, registry.clone())));
    }
    services.register(Box::new(service));
    services.initialize_all().await?;
    services.start_all().await?;

    shutdown_signal().await;

    if let Err(failures) = services.stop_all().await {
        return Err(format!("{} service(s) did not stop cleanly", failures.len()).into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
