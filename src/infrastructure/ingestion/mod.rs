//! Document ingestion infrastructure

pub mod pipeline;

pub use pipeline::IngestionPipeline;
