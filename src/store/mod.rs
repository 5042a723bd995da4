//! Revocation store: a shared key/value store with per-key TTL.
//!
//! The same store backs two record families:
//! - `refresh:<token>` -> owning user id; presence means the refresh token
//!   is currently honorable.
//! - `blacklist:<token>` -> sentinel; presence means the access token must
//!   be rejected even if otherwise valid.
//!
//! The store is an injected capability so the authority can run against
//! Redis in production and [`MemoryStore`] in tests.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Capability set required from the backing store. Atomicity of each
/// individual operation is delegated entirely to the implementation.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Set `key` to `value`, expiring automatically after `ttl_seconds`.
    async fn put_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64)
        -> Result<(), StoreError>;

    /// Whether a live entry exists for `key`.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove `key`. Returns true iff an entry was actually removed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Enumerate live `(key, value)` entries whose key starts with `prefix`.
    /// Used only by bulk revoke-all; O(number of matching keys).
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, String)>, StoreError>;
}

/// Refresh-token allow-list keys.
pub struct RefreshTokenKey;

impl RefreshTokenKey {
    pub const PREFIX: &'static str = "refresh:";

    pub fn storage(token: &str) -> String {
        format!("{}{}", Self::PREFIX, token)
    }

    /// Recover the raw token from a storage key.
    pub fn token(key: &str) -> Option<&str> {
        key.strip_prefix(Self::PREFIX)
    }
}

/// Access-token deny-list keys.
pub struct BlacklistKey;

impl BlacklistKey {
    pub const PREFIX: &'static str = "blacklist:";

    pub fn storage(token: &str) -> String {
        format!("{}{}", Self::PREFIX, token)
    }
}
