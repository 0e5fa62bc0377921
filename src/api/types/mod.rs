//! API request and response types

pub mod document;
pub mod error;
pub mod path;

pub use document::{
    BatchUploadItem, BatchUploadResponse, DeleteResponse, DocumentDetail, DocumentListItem,
    DocumentListResponse, DocumentSummary, UploadResponse,
};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use path::DocumentIdPath;
