//! Infrastructure services

mod document_service;

pub use document_service::{
    BatchItemResult, DocumentService, DocumentServiceTrait, UploadRequest,
};
