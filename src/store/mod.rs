mod key;
mod local;
pub mod models;

pub use local::LocalFileStore;
pub use models::FileRecord;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::stream::ByteStream;

/// Expiry used for signed URLs when the caller has no preference.
pub const DEFAULT_SIGNED_URL_EXPIRY: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },
    #[error("Refusing to save empty content: {0}")]
    EmptyContent(String),
    #[error("File already exists: {0}")]
    AlreadyExists(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Options for [`FileStore::save`].
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// Replace an existing file at the key. When false, an existing file is left untouched.
    pub overwrite: bool,
    /// Caller metadata (content type, tags). Backends may ignore it.
    pub metadata: Option<HashMap<String, String>>,
}

impl SaveOptions {
    pub fn overwrite() -> Self {
        Self {
            overwrite: true,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Abstraction over file storage backends.
///
/// Keys are caller-supplied relative paths. Absence is reported as `None`/`false`;
/// `Err` is reserved for invalid input, conflicts and I/O faults, all of which are
/// logged by the backend before they are returned.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Size, modification time and content type of the file at `key`.
    async fn file_info(&self, key: &str) -> Result<Option<FileRecord>, StoreError>;

    /// Open the file at `key` for reading. The caller owns the returned stream.
    async fn get(&self, key: &str) -> Result<Option<ByteStream>, StoreError>;

    /// Write `content` to `key`. The stream is consumed and dropped before returning.
    async fn save(
        &self,
        key: &str,
        content: ByteStream,
        options: SaveOptions,
    ) -> Result<(), StoreError>;

    /// Remove the file at `key`. Returns false if there was nothing to delete.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Temporary download URL, or `None` if the backend cannot issue one.
    async fn signed_url(&self, key: &str, expires_in: Duration)
        -> Result<Option<String>, StoreError>;
}
