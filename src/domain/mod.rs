//! Domain layer - Core business logic and entities

pub mod conversion;
pub mod document;
pub mod error;
pub mod extraction;
pub mod ingestion;
pub mod rendering;

pub use conversion::{ConversionError, ConverterKind, PdfConverter};
pub use document::{
    build_preview, DocumentId, DocumentRecord, DocumentRepository, NewDocument,
};
pub use error::DomainError;
pub use extraction::{
    CellValue, ContentExtractor, ExtractedContent, FileFormat, FormatExtractor, TableRows,
};
pub use ingestion::{canonical_pdf_path, ConvertMode, IngestionStrategy, UploadedFile};
pub use rendering::PdfRenderer;
