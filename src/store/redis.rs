/// Redis-backed revocation store.
///
/// Wraps a multiplexed `ConnectionManager`; every operation clones the
/// manager, so the store is freely shareable across request handlers.
/// Key expiry rides on Redis TTLs, there is no sweeper.
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::{RevocationStore, StoreError};

const SCAN_PAGE_SIZE: usize = 100;

pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Connect to Redis and build the shared connection manager.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid redis url: {}", e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl RevocationStore for RedisStore {
    async fn put_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(exists)
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: u32 = conn
            .del(key)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(removed > 0)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix);
        let mut entries = Vec::new();
        let mut cursor: u64 = 0;

        // Cursor-paged SCAN; keys observed once the scan has passed their
        // slot are not revisited, so entries created mid-scan may be missed.
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_PAGE_SIZE)
                .query_async(&mut conn)
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;

            for key in keys {
                // The key may expire between SCAN and GET; skip it then.
                let value: Option<String> = conn
                    .get(&key)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                if let Some(value) = value {
                    entries.push((key, value));
                }
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(entries)
    }
}
