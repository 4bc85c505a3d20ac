//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Own a Prometheus recorder that is explicitly passed around, not installed globally
//! - Register metric sets once, rejecting duplicates
//! - Record request durations for the GraphQL endpoint
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `graphql_http_request_duration_seconds` (histogram): latency by method, endpoint, status

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{extract::State, http::Method, http::StatusCode, routing::get, Router};
use metrics::Unit;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use axum_server::Handle;

pub const REQUEST_DURATION_SECONDS: &str = "graphql_http_request_duration_seconds";

/// Histogram buckets tuned for typical web latencies.
const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

const KNOWN_METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "CONNECT", "TRACE",
];

const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Error type for metric registration.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("metric {0} is already registered")]
    AlreadyRegistered(&'static str),
    #[error("failed to build Prometheus recorder: {0}")]
    Build(#[from] BuildError),
}

/// A group of metrics registered together.
pub trait MetricSet {
    /// Names of every metric in the set.
    fn names(&self) -> &'static [&'static str];

    /// Emit descriptions. Runs with the registry's recorder in scope.
    fn describe(&self);
}

/// A Prometheus registry handle.
///
/// Cloning is cheap and every clone records into the same store.
#[derive(Clone)]
pub struct MetricsRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    registered: Mutex<HashSet<&'static str>>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets(&LATENCY_BUCKETS)?
            .build_recorder();
        let handle = recorder.handle();

        Ok(Self {
            inner: Arc::new(RegistryInner {
                recorder,
                handle,
                registered: Mutex::new(HashSet::new()),
            }),
        })
    }

    /// Register a metric set. Fails if any of its names is already taken.
    pub fn register(&self, set: &dyn MetricSet) -> Result<(), MetricsError> {
        {
            let mut registered = self
                .inner
                .registered
                .lock()
                .unwrap_or_else(PoisonError::into_inner);

            if let Some(name) = set.names().iter().find(|name| registered.contains(*name)) {
                return Err(MetricsError::AlreadyRegistered(*name));
            }
            registered.extend(set.names().iter().copied());
        }

        self.record(|| set.describe());
        Ok(())
    }

    /// Run `f` with this registry as the active recorder.
    pub fn record<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&self.inner.recorder, f)
    }

    /// Prometheus text exposition of everything recorded so far.
    pub fn render(&self) -> String {
        self.inner.handle.render()
    }

    pub fn run_upkeep(&self) {
        self.inner.handle.run_upkeep();
    }
}

/// Request-duration metrics for the GraphQL endpoint.
#[derive(Clone)]
pub struct GraphQLMetrics {
    registry: MetricsRegistry,
}

impl GraphQLMetrics {
    /// Register the set with `registry`. A set registered earlier by another
    /// instance is reused.
    pub fn init(registry: &MetricsRegistry) -> Result<Self, MetricsError> {
        let metrics = Self {
            registry: registry.clone(),
        };

        match registry.register(&metrics) {
            Ok(()) => Ok(metrics),
            Err(MetricsError::AlreadyRegistered(name)) => {
                tracing::debug!(metric = name, "GraphQL metrics already registered");
                Ok(metrics)
            }
            Err(e) => Err(e),
        }
    }

    /// Record the duration of one completed HTTP request.
    pub fn observe_request_duration(
        &self,
        method: &Method,
        endpoint: &str,
        status: StatusCode,
        elapsed: Duration,
    ) {
        let method = method_label(method);
        let endpoint = endpoint.to_owned();
        let status = status.as_str().to_owned();

        self.registry.record(|| {
            metrics::histogram!(
                REQUEST_DURATION_SECONDS,
                "method" => method,
                "endpoint" => endpoint,
                "status" => status
            )
            .record(elapsed.as_secs_f64());
        });
    }
}

impl MetricSet for GraphQLMetrics {
    fn names(&self) -> &'static [&'static str] {
        &[REQUEST_DURATION_SECONDS]
    }

    fn describe(&self) {
        metrics::describe_histogram!(
            REQUEST_DURATION_SECONDS,
            Unit::Seconds,
            "Duration of HTTP requests in seconds."
        );
    }
}

/// Bound label cardinality: arbitrary extension methods collapse to `OTHER`.
fn method_label(method: &Method) -> &'static str {
    KNOWN_METHODS
        .iter()
        .copied()
        .find(|known| *known == method.as_str())
        .unwrap_or("OTHER")
}

/// Serve `GET /metrics` on `listener` until `handle` shuts the server down.
/// Histogram upkeep runs for exactly as long as the server does.
pub async fn serve_metrics(
    listener: std::net::TcpListener,
    registry: MetricsRegistry,
    handle: Handle,
) -> std::io::Result<()> {
    let upkeep_registry = registry.clone();
    let upkeep = tokio::spawn(async move {
        let mut interval = tokio::time::interval(UPKEEP_INTERVAL);
        loop {
            interval.tick().await;
            upkeep_registry.run_upkeep();
        }
    });

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(registry);
    let result = axum_server::from_tcp(listener)
        .handle(handle)
        .serve(app.into_make_service())
        .await;

    upkeep.abort();
    result
}

async fn metrics_handler(State(registry): State<MetricsRegistry>) -> String {
    registry.render()
}
