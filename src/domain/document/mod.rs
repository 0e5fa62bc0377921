//! Document domain module

mod entity;
pub mod repository;

pub use entity::{
    build_preview, DocumentId, DocumentRecord, NewDocument, PREVIEW_MAX_CHARS,
    PREVIEW_TRUNCATION_MARKER,
};
pub use repository::DocumentRepository;

#[cfg(test)]
pub use entity::fixtures;
