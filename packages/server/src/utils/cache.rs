use std::future::Future;
use std::time::Duration;

use common::cache::ListCache;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Cache key holding the full song list.
pub const SONGS_KEY: &str = "songs";
/// Cache key holding the setlist list (with creator names).
pub const SETLISTS_KEY: &str = "setlists";

/// Read-through lookup: return the cached list under `key`, or run `load`,
/// cache its result for `ttl` and return it.
///
/// An entry that no longer deserializes is treated as a miss and overwritten.
pub async fn cached_list<T, F, Fut>(
    cache: &dyn ListCache,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<Vec<T>, AppError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, AppError>>,
{
    if let Some(raw) = cache.get(key).await? {
        match serde_json::from_str(&raw) {
            Ok(items) => {
                tracing::debug!(key, "cache hit");
                return Ok(items);
            }
            Err(e) => tracing::warn!(key, error = %e, "Discarding unreadable cache entry"),
        }
    } else {
        tracing::debug!(key, "cache miss");
    }

    let items = load().await?;
    let raw = serde_json::to_string(&items)
        .map_err(|e| AppError::Internal(format!("Cache serialization failed: {e}")))?;
    cache.set(key, &raw, ttl).await?;
    Ok(items)
}
