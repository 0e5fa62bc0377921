//! Document service: upload, ingestion and registry access

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::domain::ingestion::{validate_file_count, validate_file_name, ConvertMode};
use crate::domain::{ConverterKind, DocumentId, DocumentRecord, DocumentRepository, DomainError};
use crate::infrastructure::ingestion::IngestionPipeline;
use crate::infrastructure::observability::set_documents_registered;
use crate::infrastructure::uploads::{remove_quietly, UploadStore};

/// One file received from a client, not yet written to disk
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadRequest {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Outcome of one file in a batch upload
#[derive(Debug)]
pub struct BatchItemResult {
    pub original_file_name: String,
    pub result: Result<DocumentRecord, DomainError>,
}

/// Trait for the document service (for dependency injection)
#[async_trait::async_trait]
pub trait DocumentServiceTrait: Send + Sync + std::fmt::Debug {
    /// All records in insertion order
    async fn list(&self) -> Result<Vec<DocumentRecord>, DomainError>;

    async fn get(&self, id: DocumentId) -> Result<DocumentRecord, DomainError>;

    /// Store and ingest a single file
    async fn ingest(
        &self,
        upload: UploadRequest,
        mode: ConvertMode,
    ) -> Result<DocumentRecord, DomainError>;

    /// Ingest files one after another; a failed file never stops its siblings
    async fn ingest_batch(
        &self,
        uploads: Vec<UploadRequest>,
        mode: ConvertMode,
    ) -> Result<Vec<BatchItemResult>, DomainError>;

    /// Remove a record and, best effort, its original and canonical PDF
    async fn delete(&self, id: DocumentId) -> Result<DocumentRecord, DomainError>;

    /// Record whose canonical PDF is present on disk
    async fn pdf(&self, id: DocumentId) -> Result<DocumentRecord, DomainError>;

    /// Storage directories writable and registry reachable
    async fn check_ready(&self) -> Result<(), DomainError>;

    /// Configured conversion backend, if any
    fn converter_kind(&self) -> Option<ConverterKind>;
}

/// Document service backed by an upload store, pipeline and registry
#[derive(Debug, Clone)]
pub struct DocumentService {
    store: UploadStore,
    pipeline: IngestionPipeline,
    repository: Arc<dyn DocumentRepository>,
    max_files_per_request: usize,
}

impl DocumentService {
    pub fn new(
        store: UploadStore,
        pipeline: IngestionPipeline,
        repository: Arc<dyn DocumentRepository>,
        max_files_per_request: usize,
    ) -> Self {
        Self {
            store,
            pipeline,
            repository,
            max_files_per_request,
        }
    }

    async fn publish_count(&self) {
        if let Ok(count) = self.repository.count().await {
            set_documents_registered(count);
        }
    }

    async fn require(&self, id: DocumentId) -> Result<DocumentRecord, DomainError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Document not found"))
    }
}

#[async_trait::async_trait]
impl DocumentServiceTrait for DocumentService {
    async fn list(&self) -> Result<Vec<DocumentRecord>, DomainError> {
        self.repository.list().await
    }

    async fn get(&self, id: DocumentId) -> Result<DocumentRecord, DomainError> {
        self.require(id).await
    }

    #[instrument(skip(self, upload), fields(file = %upload.file_name, size = upload.bytes.len()))]
    async fn ingest(
        &self,
        upload: UploadRequest,
        mode: ConvertMode,
    ) -> Result<DocumentRecord, DomainError> {
        validate_file_name(&upload.file_name)?;

        let stored = self
            .store
            .persist(&upload.file_name, upload.content_type.as_deref(), &upload.bytes)
            .await?;

        let record = self.pipeline.ingest(stored, mode).await?;
        self.publish_count().await;

        Ok(record)
    }

    #[instrument(skip(self, uploads), fields(files = uploads.len()))]
    async fn ingest_batch(
        &self,
        uploads: Vec<UploadRequest>,
        mode: ConvertMode,
    ) -> Result<Vec<BatchItemResult>, DomainError> {
        validate_file_count(uploads.len(), self.max_files_per_request)?;

        let mut results = Vec::with_capacity(uploads.len());

        for upload in uploads {
            let original_file_name = upload.file_name.clone();
            let result = self.ingest(upload, mode).await;

            results.push(BatchItemResult {
                original_file_name,
                result,
            });
        }

        let succeeded = results.iter().filter(|r| r.result.is_ok()).count();
        info!(
            succeeded,
            failed = results.len() - succeeded,
            "Batch upload processed"
        );

        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: DocumentId) -> Result<DocumentRecord, DomainError> {
        let record = self
            .repository
            .remove(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Document not found"))?;

        remove_quietly(record.path()).await;
        remove_quietly(record.pdf_path()).await;
        self.publish_count().await;

        info!(id = %id, "Document deleted");
        Ok(record)
    }

    async fn pdf(&self, id: DocumentId) -> Result<DocumentRecord, DomainError> {
        let record = self.require(id).await?;
        let pdf_path: PathBuf = record.pdf_path().to_path_buf();

        if !tokio::fs::try_exists(&pdf_path).await.unwrap_or(false) {
            debug!(id = %id, path = %pdf_path.display(), "Canonical PDF missing on disk");
            return Err(DomainError::not_found("PDF not found"));
        }

        Ok(record)
    }

    async fn check_ready(&self) -> Result<(), DomainError> {
        self.store.check_writable().await?;
        self.repository.count().await?;
        Ok(())
    }

    fn converter_kind(&self) -> Option<ConverterKind> {
        self.pipeline.converter_kind()
    }
}
