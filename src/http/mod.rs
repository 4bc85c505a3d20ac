//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (accepted by the lifecycle core)
//!     → request.rs (request ID)
//!     → server.rs (trace, timeout, body limit, routing)
//!     → middleware/request_metrics.rs (duration histogram)
//!     → GraphQL execution against the schema
//!     → JSON response
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use request::{RequestUuid, X_REQUEST_ID};
pub use server::{build_router, HttpOptions, GRAPHQL_PATH};
