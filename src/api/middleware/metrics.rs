//! HTTP metrics middleware for recording request/response metrics

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::infrastructure::observability::record_http_request;

/// Paths that are never recorded. The scrape endpoint sits outside this
/// layer and needs no entry.
const UNTRACKED_PATHS: &[&str] = &["/live"];

/// Middleware to record HTTP request metrics
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let path = extract_path(&request);

    if !is_tracked(&path) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();

    let response = next.run(request).await;

    record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}

fn is_tracked(path: &str) -> bool {
    !UNTRACKED_PATHS.contains(&path)
}

/// Matched route pattern when available, keeping label cardinality bounded
fn extract_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}
