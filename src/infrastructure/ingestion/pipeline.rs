//! Ingestion pipeline: uploaded file to registered document

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::domain::extraction::FileFormat;
use crate::domain::ingestion::{canonical_pdf_path, ConvertMode, IngestionStrategy, UploadedFile};
use crate::domain::{
    ContentExtractor, ConverterKind, DocumentRecord, DocumentRepository, DomainError,
    ExtractedContent, NewDocument, PdfConverter, PdfRenderer,
};
use crate::infrastructure::observability::{record_ingestion, IngestionMetricParams};
use crate::infrastructure::uploads::remove_quietly;

const PDF_MIME_TYPE: &str = "application/pdf";

/// Turns one persisted upload into a registered document with a canonical PDF
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    extractor: Arc<dyn ContentExtractor>,
    renderer: Arc<dyn PdfRenderer>,
    converter: Option<Arc<dyn PdfConverter>>,
    repository: Arc<dyn DocumentRepository>,
    pdf_dir: PathBuf,
}

impl IngestionPipeline {
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        renderer: Arc<dyn PdfRenderer>,
        converter: Option<Arc<dyn PdfConverter>>,
        repository: Arc<dyn DocumentRepository>,
        pdf_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            extractor,
            renderer,
            converter,
            repository,
            pdf_dir: pdf_dir.into(),
        }
    }

    /// The configured conversion backend, if any
    pub fn converter_kind(&self) -> Option<ConverterKind> {
        self.converter.as_ref().map(|c| c.kind())
    }

    /// Strategy this pipeline would use for a file name
    pub fn strategy_for(
        &self,
        original_file_name: &str,
        mode: ConvertMode,
    ) -> Result<IngestionStrategy, DomainError> {
        IngestionStrategy::select(
            FileFormat::from_file_name(original_file_name),
            self.converter_kind(),
            mode,
        )
    }

    /// Produce the canonical PDF and extracted content for `upload`, then
    /// register the record.
    ///
    /// On failure the stored original and any partial PDF are removed.
    #[instrument(skip_all, fields(file = %upload.original_file_name, strategy))]
    pub async fn ingest(
        &self,
        upload: UploadedFile,
        mode: ConvertMode,
    ) -> Result<DocumentRecord, DomainError> {
        let started = Instant::now();
        let pdf_path = canonical_pdf_path(&self.pdf_dir, &upload.stored_file_name);

        let strategy = match self.strategy_for(&upload.original_file_name, mode) {
            Ok(strategy) => strategy,
            Err(e) => {
                remove_quietly(&upload.path).await;
                return Err(e);
            }
        };
        tracing::Span::current().record("strategy", strategy.label());

        let result = match self.produce(strategy, &upload, &pdf_path).await {
            Ok(content) => {
                self.repository
                    .create(NewDocument {
                        original_file_name: upload.original_file_name.clone(),
                        stored_file_name: upload.stored_file_name.clone(),
                        mime_type: upload.mime_type.clone(),
                        size: upload.size,
                        path: upload.path.clone(),
                        pdf_path: pdf_path.clone(),
                        content,
                    })
                    .await
            }
            Err(e) => Err(e),
        };

        record_ingestion(IngestionMetricParams {
            strategy: strategy.label(),
            duration: started.elapsed(),
            success: result.is_ok(),
        });

        match result {
            Ok(record) => {
                info!(
                    id = %record.id(),
                    is_table = record.is_table(),
                    "Document ingested"
                );
                Ok(record)
            }
            Err(e) => {
                warn!(error = %e, "Ingestion failed, removing stored files");
                remove_quietly(&upload.path).await;
                remove_quietly(&pdf_path).await;
                Err(e)
            }
        }
    }

    async fn produce(
        &self,
        strategy: IngestionStrategy,
        upload: &UploadedFile,
        pdf_path: &Path,
    ) -> Result<ExtractedContent, DomainError> {
        let content = match strategy {
            IngestionStrategy::Direct => self.extract_and_render(upload, pdf_path).await?,
            IngestionStrategy::Convert(_) => self.convert_and_extract(upload, pdf_path).await?,
        };

        if !tokio::fs::try_exists(pdf_path).await.unwrap_or(false) {
            return Err(DomainError::render(format!(
                "Canonical PDF '{}' was not produced",
                pdf_path.display()
            )));
        }

        Ok(content)
    }

    async fn extract_and_render(
        &self,
        upload: &UploadedFile,
        pdf_path: &Path,
    ) -> Result<ExtractedContent, DomainError> {
        let content = self
            .extractor
            .extract(&upload.path, &upload.mime_type, &upload.original_file_name)
            .await?;

        match &content.table_rows {
            Some(rows) => self.renderer.render_table(rows, pdf_path).await?,
            None => self.renderer.render_text(&content.extracted_text, pdf_path).await?,
        };
        debug!(pdf = %pdf_path.display(), "Rendered canonical PDF");

        Ok(content)
    }

    async fn convert_and_extract(
        &self,
        upload: &UploadedFile,
        pdf_path: &Path,
    ) -> Result<ExtractedContent, DomainError> {
        let converter = self.converter.as_ref().ok_or_else(|| {
            DomainError::conversion_unavailable("No PDF conversion backend is configured")
        })?;

        let converted = converter.convert_to_pdf(&upload.path, pdf_path).await?;
        debug!(pdf = %converted.display(), kind = %converter.kind(), "Converted to PDF");

        // Extract from the generated PDF, never the original presentation
        let pdf_name = converted
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "canonical.pdf".to_string());

        self.extractor
            .extract(&converted, PDF_MIME_TYPE, &pdf_name)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversion::mock::MockPdfConverter;
    use crate::domain::conversion::ConversionError;
    use crate::domain::extraction::mock::MockContentExtractor;
    use crate::domain::extraction::CellValue;
    use crate::domain::rendering::mock::{MockPdfRenderer, RenderCall};
    use crate::infrastructure::document::InMemoryDocumentRepository;

    struct Fixture {
        _dir: tempfile::TempDir,
        uploads: PathBuf,
        pdfs: PathBuf,
        repository: Arc<InMemoryDocumentRepository>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let uploads = dir.path().to_path_buf();
            let pdfs = uploads.join("pdfs");
            std::fs::create_dir_all(&pdfs).unwrap();

            Self {
                _dir: dir,
                uploads,
                pdfs,
                repository: Arc::new(InMemoryDocumentRepository::new()),
            }
        }

        fn upload(&self, original: &str, stored: &str, body: &[u8]) -> UploadedFile {
            let path = self.uploads.join(stored);
            std::fs::write(&path, body).unwrap();

            UploadedFile {
                original_file_name: original.to_string(),
                stored_file_name: stored.to_string(),
                mime_type: "application/octet-stream".to_string(),
                size: body.len() as u64,
                path,
            }
        }

        fn pipeline(
            &self,
            extractor: Arc<MockContentExtractor>,
            renderer: Arc<MockPdfRenderer>,
            converter: Option<Arc<MockPdfConverter>>,
        ) -> IngestionPipeline {
            IngestionPipeline::new(
                extractor,
                renderer,
                converter.map(|c| c as Arc<dyn PdfConverter>),
                self.repository.clone(),
                &self.pdfs,
            )
        }
    }

    #[tokio::test]
    async fn test_direct_text_ingestion() {
        let fx = Fixture::new();
        let extractor = Arc::new(
            MockContentExtractor::new().with_result("notes.txt", ExtractedContent::text("hello")),
        );
        let renderer = Arc::new(MockPdfRenderer::new());
        let pipeline = fx.pipeline(extractor.clone(), renderer.clone(), None);

        let upload = fx.upload("notes.txt", "1-1.txt", b"hello");
        let record = pipeline.ingest(upload, ConvertMode::Auto).await.unwrap();

        assert_eq!(record.id().value(), 1);
        assert_eq!(record.extracted_text(), "hello");
        assert!(!record.is_table());
        assert_eq!(record.pdf_path(), fx.pdfs.join("1-1-canonical.pdf"));
        assert!(record.pdf_path().exists());
        assert_eq!(renderer.calls(), vec![RenderCall::Text("hello".to_string())]);
        assert_eq!(fx.repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_direct_table_ingestion_renders_table() {
        let fx = Fixture::new();
        let rows = vec![
            vec![CellValue::text("name"), CellValue::text("qty")],
            vec![CellValue::text("apple"), CellValue::number(3.0)],
        ];
        let extractor = Arc::new(
            MockContentExtractor::new().with_result("stock.csv", ExtractedContent::table(rows)),
        );
        let renderer = Arc::new(MockPdfRenderer::new());
        let pipeline = fx.pipeline(extractor, renderer.clone(), None);

        let upload = fx.upload("stock.csv", "1-2.csv", b"name,qty\napple,3\n");
        let record = pipeline.ingest(upload, ConvertMode::Auto).await.unwrap();

        assert!(record.is_table());
        assert_eq!(record.extracted_text(), "name\tqty\napple\t3");
        assert_eq!(renderer.calls(), vec![RenderCall::Table(2)]);
    }

    #[tokio::test]
    async fn test_presentation_is_converted_then_extracted_from_pdf() {
        let fx = Fixture::new();
        let extractor = Arc::new(MockContentExtractor::new());
        let renderer = Arc::new(MockPdfRenderer::new());
        let converter = Arc::new(MockPdfConverter::new(ConverterKind::Cloud));
        let pipeline = fx.pipeline(extractor.clone(), renderer.clone(), Some(converter.clone()));

        let upload = fx.upload("deck.pptx", "1-3.pptx", b"PK");
        let original = upload.path.clone();
        let record = pipeline.ingest(upload, ConvertMode::Auto).await.unwrap();

        let pdf = fx.pdfs.join("1-3-canonical.pdf");
        assert_eq!(converter.calls(), vec![original]);
        assert_eq!(extractor.calls(), vec![pdf.display().to_string()]);
        assert_eq!(record.extracted_text(), "content of 1-3-canonical.pdf");
        assert!(renderer.calls().is_empty());
        assert!(pdf.exists());
    }

    #[tokio::test]
    async fn test_presentation_without_backend_is_direct_in_auto_mode() {
        let fx = Fixture::new();
        let renderer = Arc::new(MockPdfRenderer::new());
        let pipeline = fx.pipeline(Arc::new(MockContentExtractor::new()), renderer.clone(), None);

        let upload = fx.upload("deck.pptx", "1-4.pptx", b"PK");
        pipeline.ingest(upload, ConvertMode::Auto).await.unwrap();

        assert_eq!(renderer.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_force_without_backend_fails_and_cleans_up() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(
            Arc::new(MockContentExtractor::new()),
            Arc::new(MockPdfRenderer::new()),
            None,
        );

        let upload = fx.upload("deck.pptx", "1-5.pptx", b"PK");
        let original = upload.path.clone();
        let err = pipeline.ingest(upload, ConvertMode::Force).await.unwrap_err();

        assert!(matches!(err, DomainError::ConversionUnavailable { .. }));
        assert!(!original.exists());
        assert_eq!(fx.repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_extraction_failure_removes_original() {
        let fx = Fixture::new();
        let extractor =
            Arc::new(MockContentExtractor::new().with_error("bad.docx", "corrupt archive"));
        let renderer = Arc::new(MockPdfRenderer::new());
        let pipeline = fx.pipeline(extractor, renderer.clone(), None);

        let upload = fx.upload("bad.docx", "1-6.docx", b"junk");
        let original = upload.path.clone();
        let err = pipeline.ingest(upload, ConvertMode::Auto).await.unwrap_err();

        assert!(matches!(err, DomainError::Extraction { .. }));
        assert!(!original.exists());
        assert!(renderer.calls().is_empty());
        assert_eq!(fx.repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_render_failure_is_not_registered() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(
            Arc::new(MockContentExtractor::new()),
            Arc::new(MockPdfRenderer::failing()),
            None,
        );

        let upload = fx.upload("a.txt", "1-7.txt", b"a");
        let err = pipeline.ingest(upload, ConvertMode::Auto).await.unwrap_err();

        assert!(matches!(err, DomainError::Render { .. }));
        assert_eq!(fx.repository.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_quota_error_is_preserved() {
        let fx = Fixture::new();
        let converter = Arc::new(
            MockPdfConverter::new(ConverterKind::Cloud)
                .with_error(ConversionError::quota_exceeded("no credits left")),
        );
        let pipeline = fx.pipeline(
            Arc::new(MockContentExtractor::new()),
            Arc::new(MockPdfRenderer::new()),
            Some(converter),
        );

        let upload = fx.upload("deck.ppt", "1-8.ppt", b"\xd0\xcf");
        let err = pipeline.ingest(upload, ConvertMode::Force).await.unwrap_err();

        assert!(err.is_quota_exceeded());
    }

    #[tokio::test]
    async fn test_strategy_for() {
        let fx = Fixture::new();
        let pipeline = fx.pipeline(
            Arc::new(MockContentExtractor::new()),
            Arc::new(MockPdfRenderer::new()),
            Some(Arc::new(MockPdfConverter::new(ConverterKind::Local))),
        );

        assert_eq!(
            pipeline.strategy_for("a.odp", ConvertMode::Auto).unwrap(),
            IngestionStrategy::Convert(ConverterKind::Local)
        );
        assert_eq!(
            pipeline.strategy_for("a.xlsx", ConvertMode::Force).unwrap(),
            IngestionStrategy::Direct
        );
        assert_eq!(pipeline.converter_kind(), Some(ConverterKind::Local));
    }
}
