//! Canonical PDF renderer backed by lopdf

pub mod layout;
mod writer;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lopdf::content::Content;
use tracing::debug;

use crate::domain::extraction::TableRows;
use crate::domain::rendering::PdfRenderer;
use crate::domain::DomainError;

pub use layout::{layout_table, layout_text, PageSize};
pub use writer::write_pdf;

/// Renders text and tables into PDFs on a blocking worker thread
#[derive(Debug, Clone, Default)]
pub struct LopdfRenderer;

impl LopdfRenderer {
    pub fn new() -> Self {
        Self
    }

    async fn render<F>(&self, output: &Path, size: PageSize, layout: F) -> Result<PathBuf, DomainError>
    where
        F: FnOnce() -> Vec<Content> + Send + 'static,
    {
        let output = output.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let pages = layout();
            debug!(path = %output.display(), pages = pages.len(), "Writing canonical PDF");
            write_pdf(pages, size, &output).map(|_| output)
        })
        .await
        .map_err(|e| DomainError::internal(format!("PDF render task failed: {}", e)))?
    }
}

#[async_trait]
impl PdfRenderer for LopdfRenderer {
    async fn render_text(&self, text: &str, output: &Path) -> Result<PathBuf, DomainError> {
        let text = text.to_string();
        self.render(output, layout::text::PAGE, move || layout_text(&text))
            .await
    }

    async fn render_table(&self, rows: &TableRows, output: &Path) -> Result<PathBuf, DomainError> {
        let rows = rows.clone();
        self.render(output, layout::table::PAGE, move || layout_table(&rows))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::CellValue;

    #[tokio::test]
    async fn test_render_text_writes_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("notes-canonical.pdf");

        let path = LopdfRenderer::new()
            .render_text("Hello, canonical world", &output)
            .await
            .unwrap();

        assert_eq!(path, output);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
    }

    #[tokio::test]
    async fn test_render_empty_text_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty-canonical.pdf");

        LopdfRenderer::new().render_text("", &output).await.unwrap();

        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[tokio::test]
    async fn test_render_table_paginates() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("table-canonical.pdf");
        let rows: TableRows = (0..100)
            .map(|i| vec![CellValue::Int(i), CellValue::text("value")])
            .collect();

        LopdfRenderer::new().render_table(&rows, &output).await.unwrap();

        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 100usize.div_ceil(layout::table_rows_per_page()));
    }

    #[tokio::test]
    async fn test_render_failure_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("no-such-dir").join("x.pdf");

        let err = LopdfRenderer::new().render_text("x", &output).await.unwrap_err();
        assert!(matches!(err, DomainError::Render { .. }));
    }
}
