//! List cache used in front of collection queries.
//!
//! Values are opaque JSON strings stored under one key per collection; writers
//! invalidate the key so the next read recomputes it.

mod error;
mod memory;
#[cfg(feature = "redis")]
mod redis;
mod traits;

pub use error::CacheError;
pub use memory::MemoryCache;
#[cfg(feature = "redis")]
pub use self::redis::RedisCache;
pub use traits::ListCache;
