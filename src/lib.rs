//! Document ingestion backend
//!
//! Accepts uploaded files, extracts their text or table rows, produces a
//! canonical PDF for each and serves records and PDFs over HTTP:
//! - Direct extraction for PDF, Word, text and spreadsheet files
//! - Cloud or local office-suite conversion for presentations
//! - In-memory document registry with sequential identifiers

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::DocumentRepository;
use infrastructure::{
    conversion::create_converter,
    document::InMemoryDocumentRepository,
    extraction::FileContentExtractor,
    ingestion::IngestionPipeline,
    rendering::LopdfRenderer,
    services::DocumentService,
    uploads::UploadStore,
};
use tracing::{info, warn};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration.
///
/// A conversion backend that cannot be set up is logged and skipped;
/// presentations then fall back to direct extraction.
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = UploadStore::new(&config.storage.uploads_dir)?;
    store.ensure_dirs().await?;
    info!(
        uploads = %store.uploads_dir().display(),
        pdfs = %store.pdf_dir().display(),
        "Upload storage ready"
    );

    let converter = match create_converter(&config.conversion).await {
        Ok(converter) => converter,
        Err(e) => {
            warn!(
                backend = ?config.conversion.backend,
                error = %e,
                "PDF conversion backend unavailable, continuing without it"
            );
            None
        }
    };

    let repository: Arc<dyn DocumentRepository> = Arc::new(InMemoryDocumentRepository::new());
    let pipeline = IngestionPipeline::new(
        Arc::new(FileContentExtractor::new()),
        Arc::new(LopdfRenderer::new()),
        converter,
        repository.clone(),
        store.pdf_dir(),
    );

    let service = DocumentService::new(
        store,
        pipeline,
        repository,
        config.storage.max_files_per_request,
    );

    Ok(AppState::new(Arc::new(service)))
}
