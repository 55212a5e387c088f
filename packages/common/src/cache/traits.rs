use std::time::Duration;

use async_trait::async_trait;

use super::error::CacheError;

/// Key/value cache with per-entry expiry.
///
/// Implementations must make each operation atomic on its own; callers never
/// combine them under a lock.
#[async_trait]
pub trait ListCache: Send + Sync {
    /// Return the cached value, or `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove a key. Removing a missing key is not an error.
    async fn invalidate(&self, key: &str) -> Result<(), CacheError>;
}
