use serde::Deserialize;

/// Which cache implementation backs the list cache.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// Shared Redis instance. Required when running more than one server.
    Redis,
    /// Process-local map. Suitable for a single instance and for tests.
    Memory,
}

/// List cache configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Backend selection. Default: redis.
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackendKind,
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_cache_url")]
    pub url: String,
    /// Expiry applied to every cached list, in seconds. Default: 3600.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_backend() -> CacheBackendKind {
    CacheBackendKind::Redis
}
fn default_cache_url() -> String {
    "redis://localhost:6379".into()
}
fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            url: default_cache_url(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Uploaded file storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory uploaded files are written to. Default: "./public/uploads".
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum accepted upload size in bytes. Default: 50 MiB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

fn default_upload_dir() -> String {
    "./public/uploads".into()
}
fn default_max_upload_size() -> u64 {
    50 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            max_upload_size: default_max_upload_size(),
        }
    }
}
