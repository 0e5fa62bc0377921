//! Content extractor implementations

mod doc;
mod office;
mod pdf;
mod table;
mod text;

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::extraction::{ContentExtractor, ExtractedContent, FileFormat, FormatExtractor};
use crate::domain::DomainError;

pub use doc::{doc_text, LegacyDocExtractor};
pub use office::{docx_text, presentation_text, DocxExtractor, PresentationExtractor, PRESENTATION_PLACEHOLDER};
pub use pdf::{pdf_text_from_bytes, PdfTextExtractor};
pub use table::{extract_table_and_text, TableExtraction, TableExtractor};
pub use text::PlainTextExtractor;

#[cfg(test)]
pub use office::fixtures as office_fixtures;

/// Content extractor that dispatches on the original file name's extension
#[derive(Debug, Clone, Default)]
pub struct FileContentExtractor {
    text: PlainTextExtractor,
    pdf: PdfTextExtractor,
    docx: DocxExtractor,
    doc: LegacyDocExtractor,
    presentation: PresentationExtractor,
    table: TableExtractor,
}

impl FileContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    fn extractor_for(&self, format: FileFormat) -> &dyn FormatExtractor {
        match format {
            FileFormat::PlainText | FileFormat::Other => &self.text,
            FileFormat::Pdf => &self.pdf,
            FileFormat::Docx => &self.docx,
            FileFormat::Doc => &self.doc,
            FileFormat::Ppt | FileFormat::Pptx | FileFormat::Odp => &self.presentation,
            FileFormat::Csv | FileFormat::Xls | FileFormat::Xlsx => &self.table,
        }
    }
}

#[async_trait]
impl ContentExtractor for FileContentExtractor {
    async fn extract(
        &self,
        file_path: &Path,
        mime_type: &str,
        original_file_name: &str,
    ) -> Result<ExtractedContent, DomainError> {
        let format = FileFormat::from_file_name(original_file_name);
        debug!(
            path = %file_path.display(),
            mime_type = %mime_type,
            format = ?format,
            "Extracting content"
        );

        self.extractor_for(format).extract(file_path).await
    }
}
