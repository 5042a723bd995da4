/// In-memory revocation store with TTL semantics, for tests and local
/// development. Entries expire on access, mirroring the observable behavior
/// of Redis TTLs closely enough for the authority's needs.
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{RevocationStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(entry: &(String, Instant)) -> bool {
        Instant::now() < entry.1
    }
}

#[async_trait]
impl RevocationStore for MemoryStore {
    async fn put_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        let expires = Instant::now() + Duration::from_secs(ttl_seconds);
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        entries.insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        match entries.get(key) {
            Some(entry) if Self::live(entry) => Ok(true),
            Some(_) => {
                entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        match entries.remove(key) {
            Some(entry) => Ok(Self::live(&entry)),
            None => Ok(false),
        }
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        let mut entries = self.entries.lock().expect("memory store lock poisoned");
        entries.retain(|_, entry| Instant::now() < entry.1);
        Ok(entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, (value, _))| (key.clone(), value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_exists_delete() {
        let store = MemoryStore::new();
        store.put_with_ttl("refresh:t1", "42", 60).await.unwrap();

        assert!(store.exists("refresh:t1").await.unwrap());
        assert!(store.delete("refresh:t1").await.unwrap());
        assert!(!store.exists("refresh:t1").await.unwrap());
        // Deleting again reports that nothing was removed
        assert!(!store.delete("refresh:t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_dead_on_arrival() {
        let store = MemoryStore::new();
        store.put_with_ttl("blacklist:t1", "1", 0).await.unwrap();
        assert!(!store.exists("blacklist:t1").await.unwrap());
    }

    #[tokio::test]
    async fn test_scan_prefix_filters() {
        let store = MemoryStore::new();
        store.put_with_ttl("refresh:a", "1", 60).await.unwrap();
        store.put_with_ttl("refresh:b", "2", 60).await.unwrap();
        store.put_with_ttl("blacklist:c", "1", 60).await.unwrap();

        let mut entries = store.scan_prefix("refresh:").await.unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec![
                ("refresh:a".to_string(), "1".to_string()),
                ("refresh:b".to_string(), "2".to_string()),
            ]
        );
    }
}
