//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router for the single GraphQL endpoint
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Record request durations for every routed request
//! - Execute GraphQL requests against the schema

use std::time::Duration;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::Html,
    routing::{get, post, MethodRouter},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GraphQLConfig;
use crate::http::middleware::track_request_duration;
use crate::http::request::{request_id, RequestUuid, X_REQUEST_ID};
use crate::observability::GraphQLMetrics;
use crate::schema::ServiceSchema;

/// Path of the GraphQL endpoint.
pub const GRAPHQL_PATH: &str = "/graphql";

/// Transport-independent HTTP settings.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub graphiql: bool,
    pub request_timeout: Duration,
    pub max_body_size: usize,
}

impl From<&GraphQLConfig> for HttpOptions {
    fn from(config: &GraphQLConfig) -> Self {
        Self {
            graphiql: config.graphiql,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            max_body_size: config.max_body_size,
        }
    }
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self::from(&GraphQLConfig::default())
    }
}

/// Build the router with all middleware layers.
pub fn build_router(schema: ServiceSchema, metrics: GraphQLMetrics, options: &HttpOptions) -> Router {
    let endpoint: MethodRouter<ServiceSchema> = if options.graphiql {
        get(graphiql).post(graphql_handler)
    } else {
        post(graphql_handler)
    };

    Router::new()
        .route(GRAPHQL_PATH, endpoint)
        .route_layer(middleware::from_fn_with_state(metrics, track_request_duration))
        .with_state(schema)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(X_REQUEST_ID, RequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                .layer(RequestBodyLimitLayer::new(options.max_body_size))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    options.request_timeout,
                )),
        )
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id(request),
    )
}

async fn graphql_handler(
    State(schema): State<ServiceSchema>,
    request: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(request.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MetricsRegistry;
    use crate::schema::{RootSchemaProvider, SchemaProvider};
    use axum::http::header;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(options: HttpOptions) -> (Router, MetricsRegistry) {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = GraphQLMetrics::init(&registry).unwrap();
        let schema = RootSchemaProvider::default().build_schema().unwrap();
        (build_router(schema, metrics, &options), registry)
    }

    fn query(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(GRAPHQL_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_query_returns_health_string() {
        let (app, _) = app(HttpOptions::default());
        let response = app.oneshot(query(r#"{"query":"{ status }"}"#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));
        assert_eq!(
            json_body(response).await,
            json!({ "data": { "status": "Service is healthy" } })
        );
    }

    #[tokio::test]
    async fn client_request_id_is_echoed() {
        let (app, _) = app(HttpOptions::default());
        let mut request = query(r#"{"query":"{ version }"}"#);
        request
            .headers_mut()
            .insert(X_REQUEST_ID, "req-42".parse().unwrap());

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "req-42");
    }

    #[tokio::test]
    async fn requests_are_measured_by_route() {
        let (app, registry) = app(HttpOptions::default());
        app.oneshot(query(r#"{"query":"{ status }"}"#)).await.unwrap();

        let output = registry.render();
        assert!(output.contains(r#"endpoint="/graphql""#));
        assert!(output.contains(r#"method="POST""#));
    }

    #[tokio::test]
    async fn graphiql_served_on_get() {
        let (app, _) = app(HttpOptions::default());
        let request = Request::get(GRAPHQL_PATH).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn graphiql_can_be_disabled() {
        let (app, _) = app(HttpOptions {
            graphiql: false,
            ..Default::default()
        });
        let request = Request::get(GRAPHQL_PATH).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn other_paths_are_not_routed() {
        let (app, _) = app(HttpOptions::default());
        let request = Request::post("/elsewhere").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let (app, _) = app(HttpOptions {
            max_body_size: 8,
            ..Default::default()
        });
        let response = app.oneshot(query(r#"{"query":"{ status }"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
