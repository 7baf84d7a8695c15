use anyhow::Result;
use async_trait::async_trait;

use super::KvStore;

/// Store that keeps nothing.
///
/// Backs the post routes: writes succeed and are dropped, reads and listings
/// always come back empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait]
impl KvStore for NullStore {
    async fn put(&self, key: &str, _value: &str) -> Result<()> {
        tracing::debug!("Discarding write for key: {}", key);
        Ok(())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn list(&self, _prefix: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}
