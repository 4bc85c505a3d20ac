//! GraphQL health service library.
//!
//! A lifecycle-managed GraphQL endpoint with optional mutual TLS, Prometheus
//! request metrics and file-based configuration.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod schema;
pub mod security;

pub use config::AppConfig;
pub use lifecycle::{GraphQLService, LifecycleError, Service, ServiceRegistry, ServiceState};
pub use observability::MetricsRegistry;
pub use schema::{RootSchemaProvider, SchemaProvider};
pub use security::{MtlsProvider, SecurityContext, SecurityProvider};
