//! Document registry trait

use std::fmt::Debug;

use async_trait::async_trait;

use super::{DocumentId, DocumentRecord, NewDocument};
use crate::domain::DomainError;

/// Registry of ingested documents.
///
/// Implementations assign identifiers atomically on insert; identifiers are
/// never reused, even after the record they named has been removed.
#[async_trait]
pub trait DocumentRepository: Send + Sync + Debug {
    /// Assign the next identifier and store the record
    async fn create(&self, document: NewDocument) -> Result<DocumentRecord, DomainError>;

    /// Get a record by ID
    async fn get(&self, id: DocumentId) -> Result<Option<DocumentRecord>, DomainError>;

    /// List all records in insertion order
    async fn list(&self) -> Result<Vec<DocumentRecord>, DomainError>;

    /// Remove a record, returning it if it existed
    async fn remove(&self, id: DocumentId) -> Result<Option<DocumentRecord>, DomainError>;

    /// Number of registered records
    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }
}
