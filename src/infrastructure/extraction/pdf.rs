//! PDF text extractor

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::extraction::{ExtractedContent, FormatExtractor};
use crate::domain::DomainError;

/// Extracts embedded text from digital-native PDFs.
///
/// Scanned or malformed PDFs yield empty text, not an error. Only a failure to
/// read the file itself is reported.
#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

/// Text of an in-memory PDF, or empty when the document has none we can read
pub fn pdf_text_from_bytes(bytes: &[u8]) -> String {
    // pdf-extract panics on some malformed inputs
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(error = %e, "PDF text extraction failed, using empty text");
            String::new()
        }
        Err(_) => {
            warn!("PDF text extraction panicked, using empty text");
            String::new()
        }
    }
}

#[async_trait]
impl FormatExtractor for PdfTextExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::io(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        let text = tokio::task::spawn_blocking(move || pdf_text_from_bytes(&bytes))
            .await
            .map_err(|e| DomainError::internal(format!("PDF extraction task failed: {}", e)))?;

        Ok(ExtractedContent::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_pdf_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        tokio::fs::write(&path, b"this is not a pdf").await.unwrap();

        let content = PdfTextExtractor::new().extract(&path).await.unwrap();

        assert_eq!(content.extracted_text, "");
        assert!(!content.is_table());
    }

    #[tokio::test]
    async fn test_missing_pdf_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PdfTextExtractor::new()
            .extract(&dir.path().join("missing.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Io { .. }));
    }
}
