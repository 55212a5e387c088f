use std::io::Cursor;

use async_trait::async_trait;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader<'a> = Box<dyn AsyncRead + Unpin + Send + 'a>;

/// A file accepted by an [`UploadStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Generated, collision-free file name (no directory component).
    pub name: String,
    /// Number of bytes written.
    pub size: u64,
}

/// Storage for user uploads. Every stored file gets a fresh unique name.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Store bytes under a new name ending in `extension` (if any).
    async fn put(
        &self,
        extension: Option<&str>,
        data: &[u8],
    ) -> Result<StoredUpload, StorageError> {
        let reader: BoxReader<'_> = Box::new(Cursor::new(data));
        self.put_stream(extension, reader).await
    }

    /// Store data from an async reader under a new name ending in `extension`.
    async fn put_stream(
        &self,
        extension: Option<&str>,
        reader: BoxReader<'_>,
    ) -> Result<StoredUpload, StorageError>;
}
