//! Content extractor traits and types

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;

use super::table::{flatten_rows, TableRows};
use crate::domain::DomainError;

/// Result of extracting a file: flattened text, plus rows for tabular input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    pub extracted_text: String,
    pub table_rows: Option<TableRows>,
}

impl ExtractedContent {
    /// Plain text content
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            extracted_text: text.into(),
            table_rows: None,
        }
    }

    /// Tabular content; the text is the tab/newline flattening of the rows
    pub fn table(rows: TableRows) -> Self {
        Self {
            extracted_text: flatten_rows(&rows),
            table_rows: Some(rows),
        }
    }

    pub fn is_table(&self) -> bool {
        self.table_rows.is_some()
    }
}

/// Extracts content from a file on disk, dispatching on the original file name
#[async_trait]
pub trait ContentExtractor: Send + Sync + Debug {
    async fn extract(
        &self,
        file_path: &Path,
        mime_type: &str,
        original_file_name: &str,
    ) -> Result<ExtractedContent, DomainError>;
}

/// Extractor for one family of file formats
#[async_trait]
pub trait FormatExtractor: Send + Sync + Debug {
    /// Get supported file extensions (e.g., ["txt"])
    fn supported_extensions(&self) -> &[&str];

    /// Extract content from the file at `path`
    async fn extract(&self, path: &Path) -> Result<ExtractedContent, DomainError>;

    /// Check if this extractor supports a given filename
    fn supports_file(&self, filename: &str) -> bool {
        let ext = super::format::file_extension(filename).unwrap_or_default();

        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&ext))
    }
}
