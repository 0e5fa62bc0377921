use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use super::documents;
use super::health;
use super::middleware::{logging_middleware, metrics_middleware, security_headers_middleware};
use super::state::AppState;
use crate::config::{AppConfig, CorsConfig};
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
pub fn create_router(
    state: AppState,
    config: &AppConfig,
    metrics: Option<PrometheusMetrics>,
) -> Router {
    let uploads = Router::new()
        .route("/upload", post(documents::upload_documents))
        .route("/upload-and-convert", post(documents::upload_and_convert))
        .layer(DefaultBodyLimit::max(config.storage.max_upload_bytes));

    let documents = Router::new()
        .route("/", get(documents::list_documents))
        .route(
            "/{id}",
            get(documents::get_document).delete(documents::delete_document),
        )
        .route("/{id}/pdf", get(documents::download_pdf))
        .merge(uploads);

    let mut router = Router::new()
        .route("/", get(documents::root))
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/documents", documents)
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware));

    // Merged after the metrics layer so scrapes are not recorded
    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    let router = router
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http());

    match cors_layer(&config.cors) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// CORS for the configured browser origins; `None` when no origin is allowed
fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .map(|origin| origin.trim().trim_end_matches('/'))
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true),
    )
}
