//! GraphQL schema subsystem.
//!
//! # Data Flow
//! ```text
//! SchemaProvider::build
//!     → root_query.rs (status, uptime, version, serverTime)
//!     → depth / complexity limits
//!     → ServiceSchema handed to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - A schema failure is fatal: the service has nothing to serve without one
//! - The `status` field is mandatory; the built schema is checked for it

pub mod root_query;

use async_graphql::{EmptyMutation, EmptySubscription, Schema};

use crate::config::GraphQLConfig;

pub use root_query::{QueryRoot, HEALTHY_STATUS, VERSION};

/// The executable schema served on the endpoint.
pub type ServiceSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Error type for schema construction.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("{0} must be greater than zero")]
    InvalidLimit(&'static str),
    #[error("schema does not expose the `status` health field")]
    MissingHealthField,
    #[error("schema provider failed: {0}")]
    Provider(String),
}

/// Builds the query resolution object graph served by the endpoint.
pub trait SchemaProvider: Send + Sync {
    fn build_schema(&self) -> Result<ServiceSchema, SchemaError>;
}

/// Query limits applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_depth: usize,
    pub max_complexity: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        let config = GraphQLConfig::default();
        Self {
            max_depth: config.max_query_depth,
            max_complexity: config.max_query_complexity,
        }
    }
}

/// Provider for the built-in root query.
#[derive(Debug, Clone, Default)]
pub struct RootSchemaProvider {
    limits: QueryLimits,
}

impl RootSchemaProvider {
    pub fn new(limits: QueryLimits) -> Self {
        Self { limits }
    }

    pub fn from_config(config: &GraphQLConfig) -> Self {
        Self::new(QueryLimits {
            max_depth: config.max_query_depth,
            max_complexity: config.max_query_complexity,
        })
    }
}

impl SchemaProvider for RootSchemaProvider {
    fn build_schema(&self) -> Result<ServiceSchema, SchemaError> {
        if self.limits.max_depth == 0 {
            return Err(SchemaError::InvalidLimit("max_query_depth"));
        }
        if self.limits.max_complexity == 0 {
            return Err(SchemaError::InvalidLimit("max_query_complexity"));
        }

        let schema = Schema::build(QueryRoot::new(), EmptyMutation, EmptySubscription)
            .limit_depth(self.limits.max_depth)
            .limit_complexity(self.limits.max_complexity)
            .finish();

        if !schema.sdl().contains("status: String!") {
            return Err(SchemaError::MissingHealthField);
        }

        tracing::debug!(
            max_depth = self.limits.max_depth,
            max_complexity = self.limits.max_complexity,
            "GraphQL schema built"
        );
        Ok(schema)
    }
}
