//! Document ingestion domain types
//!
//! This module provides:
//! - `IngestionStrategy` selection for an uploaded file
//! - `UploadedFile` and canonical PDF naming
//! - Upload validation helpers

mod strategy;
mod upload;
pub mod validation;

pub use strategy::{ConvertMode, IngestionStrategy};
pub use upload::{canonical_pdf_path, UploadedFile, CANONICAL_PDF_SUFFIX};
pub use validation::{validate_file_count, validate_file_name};
