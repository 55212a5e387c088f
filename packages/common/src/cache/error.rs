use thiserror::Error;

/// Errors raised by a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}
