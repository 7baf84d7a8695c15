//! Key-value storage collaborators.
//!
//! Handlers only talk to [`KvStore`]; the concrete adapter is chosen at
//! startup from configuration.

#[cfg(test)]
pub mod failing;
pub mod memory;
pub mod null;
pub mod spanner;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use null::NullStore;
pub use spanner::SpannerStore;

/// String-keyed, string-valued store
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Insert or overwrite `key`
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Every key starting with `prefix`, in ascending lexicographic order
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Remove `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}
