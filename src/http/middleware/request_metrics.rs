//! Request-duration middleware.
//! Records one histogram observation per completed request.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use crate::observability::GraphQLMetrics;

/// Must be installed with `route_layer` so the matched route is known.
pub async fn track_request_duration(
    State(metrics): State<GraphQLMetrics>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;

    metrics.observe_request_duration(&method, &endpoint, response.status(), start.elapsed());
    response
}
