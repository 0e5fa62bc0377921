//! Plain text extractor

use std::path::Path;

use async_trait::async_trait;

use crate::domain::extraction::{ExtractedContent, FormatExtractor};
use crate::domain::DomainError;

/// Reads a file verbatim as text.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so this also
/// serves as the fallback for unknown extensions.
#[derive(Debug, Clone, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FormatExtractor for PlainTextExtractor {
    fn supported_extensions(&self) -> &[&str] {
        &["txt"]
    }

    async fn extract(&self, path: &Path) -> Result<ExtractedContent, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DomainError::io(format!("Failed to read '{}': {}", path.display(), e))
        })?;

        Ok(ExtractedContent::text(String::from_utf8_lossy(&bytes)))
    }
}
