//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::DocumentServiceTrait;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub document_service: Arc<dyn DocumentServiceTrait>,
}

impl AppState {
    pub fn new(document_service: Arc<dyn DocumentServiceTrait>) -> Self {
        Self { document_service }
    }
}
