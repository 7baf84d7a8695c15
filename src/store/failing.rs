use anyhow::{Result, bail};
use async_trait::async_trait;

use super::KvStore;

/// Store whose every operation fails, for exercising 500 paths
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn put(&self, key: &str, _value: &str) -> Result<()> {
        bail!("store unavailable while writing {}", key)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        bail!("store unavailable while reading {}", key)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        bail!("store unavailable while listing {}", prefix)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        bail!("store unavailable while deleting {}", key)
    }
}
