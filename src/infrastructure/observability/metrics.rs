//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl PrometheusMetrics {
    pub fn new(handle: PrometheusHandle, path: impl Into<String>) -> Self {
        Self {
            handle: Arc::new(handle),
            path: path.into(),
        }
    }

    /// Route the scrape endpoint is served on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = PrometheusBuilder::new();

    match builder.install_recorder() {
        Ok(handle) => {
            register_default_metrics();

            let path = scrape_path(&config.path);
            tracing::info!("Prometheus metrics initialized at {}", path);

            Some(PrometheusMetrics::new(handle, path))
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

fn register_default_metrics() {
    gauge!("doc_ingest_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Configured scrape path, or the default when it is not an absolute route
fn scrape_path(configured: &str) -> String {
    let trimmed = configured.trim().trim_end_matches('/');
    if trimmed.starts_with('/') && trimmed.len() > 1 {
        trimmed.to_string()
    } else {
        tracing::warn!(path = %configured, "Invalid metrics path, using /metrics");
        "/metrics".to_string()
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path.clone();
    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let status_str = status.to_string();
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status_str),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    // Track 5xx errors separately
    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of one file's ingestion
pub fn record_ingestion(params: IngestionMetricParams) {
    let outcome = if params.success { "success" } else { "error" };
    let labels = [
        ("strategy", params.strategy.to_string()),
        ("outcome", outcome.to_string()),
    ];

    counter!("documents_ingested_total", &labels).increment(1);
    histogram!("document_ingestion_duration_seconds", "strategy" => params.strategy.to_string())
        .record(params.duration.as_secs_f64());
}

/// Parameters for ingestion metrics
pub struct IngestionMetricParams<'a> {
    pub strategy: &'a str,
    pub duration: Duration,
    pub success: bool,
}

/// Publish the number of records currently held by the registry
pub fn set_documents_registered(count: usize) {
    gauge!("documents_registered").set(count as f64);
}

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

const MAX_PATH_LABEL_LEN: usize = 50;

/// Collapse document ids into `{id}` so the path label stays low-cardinality
fn sanitize_path(path: &str) -> String {
    let path = NUMERIC_SEGMENT.replace_all(path, "/{id}$1");

    if path.len() > MAX_PATH_LABEL_LEN {
        path[..MAX_PATH_LABEL_LEN].to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_keeps_upload_routes() {
        assert_eq!(sanitize_path("/documents/upload"), "/documents/upload");
    }

    #[test]
    fn test_scrape_path() {
        assert_eq!(scrape_path("/metrics"), "/metrics");
        assert_eq!(scrape_path("/internal/metrics/"), "/internal/metrics");
        assert_eq!(scrape_path("metrics"), "/metrics");
        assert_eq!(scrape_path("/"), "/metrics");
    }

    #[test]
    fn test_sanitize_path_no_id() {
        let path = "/health";
        let sanitized = sanitize_path(path);
        assert_eq!(sanitized, "/health");
    }

    #[test]
    fn test_sanitize_path_truncates_long_paths() {
        let path = "/very/long/path/that/exceeds/the/maximum/allowed/length/for/metrics";
        let sanitized = sanitize_path(path);
        assert!(sanitized.len() <= 50);
    }

    #[test]
    fn test_sanitize_path_document_pdf() {
        assert_eq!(sanitize_path("/documents/17/pdf"), "/documents/{id}/pdf");
        assert_eq!(sanitize_path("/documents/17"), "/documents/{id}");
    }

    #[test]
    fn test_record_ingestion_without_recorder() {
        record_ingestion(IngestionMetricParams {
            strategy: "direct",
            duration: Duration::from_millis(20),
            success: true,
        });
        set_documents_registered(3);
    }
}
