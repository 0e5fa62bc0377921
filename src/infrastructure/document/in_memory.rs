//! In-memory document registry implementation

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::document::{DocumentId, DocumentRecord, DocumentRepository, NewDocument};
use crate::domain::error::DomainError;

/// In-memory implementation of DocumentRepository.
///
/// Records are keyed by id, so iteration order is insertion order.
#[derive(Debug)]
pub struct InMemoryDocumentRepository {
    documents: Arc<RwLock<BTreeMap<DocumentId, DocumentRecord>>>,
    next_id: AtomicU64,
}

impl InMemoryDocumentRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryDocumentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: NewDocument) -> Result<DocumentRecord, DomainError> {
        let id = DocumentId::new(self.next_id.fetch_add(1, Ordering::SeqCst))?;
        let record = DocumentRecord::new(id, document);

        let mut documents = self.documents.write().await;
        documents.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: DocumentId) -> Result<Option<DocumentRecord>, DomainError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<DocumentRecord>, DomainError> {
        let documents = self.documents.read().await;
        Ok(documents.values().cloned().collect())
    }

    async fn remove(&self, id: DocumentId) -> Result<Option<DocumentRecord>, DomainError> {
        let mut documents = self.documents.write().await;
        Ok(documents.remove(&id))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let documents = self.documents.read().await;
        Ok(documents.len())
    }
}
