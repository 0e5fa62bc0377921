//! Canonical PDF rendering capability

use std::fmt::Debug;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::extraction::TableRows;
use crate::domain::DomainError;

/// Renders extracted content into a PDF file on disk
#[async_trait]
pub trait PdfRenderer: Send + Sync + Debug {
    /// Single column of body text; empty text yields a blank page
    async fn render_text(&self, text: &str, output: &Path) -> Result<PathBuf, DomainError>;

    /// Fixed grid with a shaded header row
    async fn render_table(&self, rows: &TableRows, output: &Path) -> Result<PathBuf, DomainError>;
}
