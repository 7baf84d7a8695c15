use crate::store::{KvStore, MemoryStore, NullStore};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Backs the organization-scoped validation-request routes
    pub requests: Arc<dyn KvStore>,
    /// Backs the post routes
    pub posts: Arc<dyn KvStore>,
}

impl AppState {
    /// Post routes never persist, so they always get a `NullStore`
    pub fn new(requests: Arc<dyn KvStore>) -> Self {
        Self {
            requests,
            posts: Arc::new(NullStore),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}
