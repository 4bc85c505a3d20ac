//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (request-duration histogram)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, exporter.rs)
//! ```
//!
//! # Design Decisions
//! - Metrics go to an explicit registry handle, never a global recorder
//! - Registration happens during service construction, not at load time

pub mod exporter;
pub mod logging;
pub mod metrics;

pub use exporter::MetricsExporter;
pub use self::metrics::{GraphQLMetrics, MetricsError, MetricsRegistry};
