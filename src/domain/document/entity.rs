//! Document record entity

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::extraction::{ExtractedContent, TableRows};
use crate::domain::DomainError;

/// Maximum number of characters kept in a record preview
pub const PREVIEW_MAX_CHARS: usize = 500;

/// Marker appended to a truncated preview
pub const PREVIEW_TRUNCATION_MARKER: &str = "...";

/// Sequential document identifier, unique within a process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Create an identifier from a positive integer
    pub fn new(value: u64) -> Result<Self, DomainError> {
        if value == 0 {
            return Err(DomainError::invalid_id("Document ID must be a positive integer"));
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl FromStr for DocumentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<u64>().map_err(|_| {
            DomainError::invalid_id(format!("Invalid document ID '{}': expected a positive integer", s))
        })?;

        Self::new(value)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build the preview shown for a document: the first characters of the text,
/// with a marker appended when the text was cut.
pub fn build_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], PREVIEW_TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Everything needed to register a document, minus its identifier
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub original_file_name: String,
    pub stored_file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub path: PathBuf,
    pub pdf_path: PathBuf,
    pub content: ExtractedContent,
}

/// A registered document.
///
/// Records are immutable once created; the canonical PDF path is fixed at
/// creation and the record only ever leaves the registry through a delete.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    id: DocumentId,
    original_file_name: String,
    stored_file_name: String,
    mime_type: String,
    size: u64,
    path: PathBuf,
    pdf_path: PathBuf,
    extracted_text: String,
    preview: String,
    table_rows: Option<TableRows>,
    created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Assemble a record from a freshly assigned id and the ingestion output
    pub fn new(id: DocumentId, document: NewDocument) -> Self {
        let ExtractedContent {
            extracted_text,
            table_rows,
        } = document.content;
        let preview = build_preview(&extracted_text);

        Self {
            id,
            original_file_name: document.original_file_name,
            stored_file_name: document.stored_file_name,
            mime_type: document.mime_type,
            size: document.size,
            path: document.path,
            pdf_path: document.pdf_path,
            extracted_text,
            preview,
            table_rows,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn original_file_name(&self) -> &str {
        &self.original_file_name
    }

    pub fn stored_file_name(&self) -> &str {
        &self.stored_file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pdf_path(&self) -> &Path {
        &self.pdf_path
    }

    pub fn extracted_text(&self) -> &str {
        &self.extracted_text
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn is_table(&self) -> bool {
        self.table_rows.is_some()
    }

    pub fn table_rows(&self) -> Option<&TableRows> {
        self.table_rows.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Public download location of the canonical PDF
    pub fn pdf_url(&self) -> String {
        format!("/documents/{}/pdf", self.id)
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn text_document(name: &str, text: &str) -> NewDocument {
        NewDocument {
            original_file_name: name.to_string(),
            stored_file_name: format!("1700000000000-42-{}", name),
            mime_type: "text/plain".to_string(),
            size: text.len() as u64,
            path: PathBuf::from(format!("/tmp/uploads/{}", name)),
            pdf_path: PathBuf::from(format!("/tmp/uploads/pdfs/{}-canonical.pdf", name)),
            content: ExtractedContent::text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::CellValue;

    #[test]
    fn test_document_id_parse() {
        assert_eq!("42".parse::<DocumentId>().unwrap().value(), 42);
        assert!("0".parse::<DocumentId>().is_err());
        assert!("-3".parse::<DocumentId>().is_err());
        assert!("abc".parse::<DocumentId>().is_err());
        assert!("".parse::<DocumentId>().is_err());
    }

    #[test]
    fn test_preview_short_text_is_unchanged() {
        assert_eq!(build_preview(""), "");
        assert_eq!(build_preview("hello"), "hello");

        let exact = "a".repeat(PREVIEW_MAX_CHARS);
        assert_eq!(build_preview(&exact), exact);
    }

    #[test]
    fn test_preview_long_text_is_truncated() {
        let text = "b".repeat(PREVIEW_MAX_CHARS + 1);
        let preview = build_preview(&text);

        assert_eq!(preview.len(), PREVIEW_MAX_CHARS + PREVIEW_TRUNCATION_MARKER.len());
        assert!(preview.ends_with("b..."));
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        let text = "é".repeat(PREVIEW_MAX_CHARS + 10);
        let preview = build_preview(&text);

        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 3);
    }

    #[test]
    fn test_record_from_text_document() {
        let id = DocumentId::new(3).unwrap();
        let record = DocumentRecord::new(id, fixtures::text_document("notes.txt", "hello"));

        assert_eq!(record.id(), id);
        assert_eq!(record.preview(), "hello");
        assert!(!record.is_table());
        assert!(record.table_rows().is_none());
        assert_eq!(record.pdf_url(), "/documents/3/pdf");
    }

    #[test]
    fn test_record_from_table_document() {
        let rows = vec![
            vec![CellValue::text("Name"), CellValue::text("Age")],
            vec![CellValue::text("John"), CellValue::Int(30)],
        ];
        let mut document = fixtures::text_document("people.csv", "");
        document.content = ExtractedContent::table(rows.clone());

        let record = DocumentRecord::new(DocumentId::new(1).unwrap(), document);

        assert!(record.is_table());
        assert_eq!(record.table_rows(), Some(&rows));
        assert_eq!(record.extracted_text(), "Name\tAge\nJohn\t30");
    }
}
