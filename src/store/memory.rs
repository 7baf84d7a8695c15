use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::KvStore;

/// In-process ordered store for local development and tests
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        tracing::debug!("Stored key: {}", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self.entries.read().await;
        let keys: Vec<String> = entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();

        tracing::debug!("Listed {} keys with prefix: {}", keys.len(), prefix);
        Ok(keys)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        tracing::debug!("Deleted key: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let store = MemoryStore::new();
        store.put("a", "1").await.unwrap();
        store.put("a", "2").await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some("2".to_string()));
        assert_eq!(store.get("b").await.unwrap(), None);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_prefix_scoped_and_ascending() {
        let store = MemoryStore::new();
        for key in ["org:b:2", "org:a:1", "orga:x:1", "org:b:1", "other:a:1"] {
            store.put(key, "v").await.unwrap();
        }

        let keys = store.list("org:").await.unwrap();
        assert_eq!(keys, vec!["org:a:1", "org:b:1", "org:b:2"]);

        let keys = store.list("org:b:").await.unwrap();
        assert_eq!(keys, vec!["org:b:1", "org:b:2"]);

        assert!(store.list("missing:").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() {
        let store = MemoryStore::new();
        store.put("a", "1").await.unwrap();

        store.delete("a").await.unwrap();
        store.delete("a").await.unwrap();
        assert_eq!(store.len().await, 0);
    }
}
