//! Infrastructure layer - External service implementations

pub mod conversion;
pub mod document;
pub mod extraction;
pub mod ingestion;
pub mod logging;
pub mod observability;
pub mod rendering;
pub mod services;
pub mod uploads;
