use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::error::StorageError;
use super::traits::{BoxReader, StoredUpload, UploadStore};

/// Longest extension kept from an uploaded file name.
const MAX_EXTENSION_LEN: usize = 16;

/// Filesystem-backed upload store.
///
/// Files are written to `{base_path}/.tmp` first and renamed into
/// `{base_path}/{uuid}.{ext}` once complete, so a partially written upload is
/// never visible to the static file server.
pub struct FilesystemUploadStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemUploadStore {
    /// Create a new filesystem upload store, creating its directories.
    pub async fn new(base_path: impl Into<PathBuf>, max_size: u64) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

/// Build a fresh file name, keeping a sanitized extension when one is given.
///
/// Extensions are lowercased and must be short and ASCII alphanumeric;
/// anything else is dropped rather than rejected.
pub fn generate_name(extension: Option<&str>) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    match extension.map(|e| e.trim().trim_start_matches('.')) {
        Some(ext)
            if !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            format!("{id}.{}", ext.to_ascii_lowercase())
        }
        _ => id,
    }
}

#[async_trait]
impl UploadStore for FilesystemUploadStore {
    async fn put_stream(
        &self,
        extension: Option<&str>,
        mut reader: BoxReader<'_>,
    ) -> Result<StoredUpload, StorageError> {
        let temp_path = self.temp_path();
        let mut total_bytes: u64 = 0;

        let mut buf = vec![0u8; 64 * 1024]; // 64KB read buffer
        let mut temp_file = fs::File::create(&temp_path).await?;

        loop {
            let n = match reader.read(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    drop(temp_file);
                    let _ = fs::remove_file(&temp_path).await;
                    return Err(e.into());
                }
            };
            if n == 0 {
                break;
            }

            total_bytes += n as u64;
            if total_bytes > self.max_size {
                drop(temp_file);
                let _ = fs::remove_file(&temp_path).await;
                return Err(StorageError::SizeLimitExceeded {
                    actual: total_bytes,
                    limit: self.max_size,
                });
            }

            temp_file.write_all(&buf[..n]).await?;
        }

        temp_file.flush().await?;
        drop(temp_file);

        let name = generate_name(extension);
        if let Err(e) = fs::rename(&temp_path, self.base_path.join(&name)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::debug!(name = %name, size = total_bytes, "Stored upload");

        Ok(StoredUpload {
            name,
            size: total_bytes,
        })
    }
}
