use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use super::{key, FileRecord, FileStore, SaveOptions, StoreError};
use crate::config::StorageConfig;
use crate::stream::ByteStream;

const COPY_BUFFER_SIZE: usize = 8192;

/// Local filesystem file store.
///
/// Keys resolve to paths beneath a base directory fixed at construction. Overwrites
/// are written to a sibling temp file and renamed into place, so readers see either
/// the old content or the new content, never a mix.
///
/// There is no locking: concurrent writers to one key (in this process or another
/// sharing the directory) race, and the last rename wins.
pub struct LocalFileStore {
    base_path: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at `base_path`, creating the directory if needed.
    ///
    /// A directory that cannot be created is logged, not returned: the store is still
    /// usable as a value and each operation fails on its own once it touches the
    /// missing path. Use [`LocalFileStore::try_new`] to fail here instead.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        let base_path = base_path.as_ref().to_path_buf();
        match std::fs::create_dir_all(&base_path) {
            Ok(()) => info!(
                base_path = %base_path.display(),
                "Base file storage directory ensured"
            ),
            Err(e) => error!(
                base_path = %base_path.display(),
                error = %e,
                "Failed to ensure base file storage directory"
            ),
        }
        Self { base_path }
    }

    /// Create a store rooted at `base_path`, failing if the directory cannot be created.
    pub fn try_new<P: AsRef<Path>>(base_path: P) -> Result<Self, io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.base_path)
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        key::resolve(&self.base_path, key).inspect_err(|e| warn!(key, "{e}"))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn file_info(&self, key: &str) -> Result<Option<FileRecord>, StoreError> {
        let path = self.object_path(key)?;

        let meta = match regular_file_metadata(&path).await {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                debug!(key, path = %path.display(), "File not found");
                return Ok(None);
            }
            Err(e) => return Err(fault(key, "read file metadata", e)),
        };

        let modified_at: DateTime<Utc> = meta
            .modified()
            .map_err(|e| fault(key, "read modification time", e))?
            .into();

        Ok(Some(FileRecord::new(key, meta.len(), modified_at)))
    }

    async fn get(&self, key: &str) -> Result<Option<ByteStream>, StoreError> {
        let path = self.object_path(key)?;

        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(e) if is_absent(&e) => {
                debug!(key, path = %path.display(), "File not found");
                return Ok(None);
            }
            Err(e) => return Err(fault(key, "open file", e)),
        };

        // Directories open fine on unix; check what we actually got.
        let meta = file
            .metadata()
            .await
            .map_err(|e| fault(key, "read file metadata", e))?;
        if !meta.is_file() {
            debug!(key, path = %path.display(), "Key names a directory, not a file");
            return Ok(None);
        }

        Ok(Some(Box::new(file)))
    }

    async fn save(
        &self,
        key: &str,
        mut content: ByteStream,
        options: SaveOptions,
    ) -> Result<(), StoreError> {
        let path = self.object_path(key)?;

        // Read the first chunk up front: an empty stream must not create a file.
        let mut head = vec![0u8; COPY_BUFFER_SIZE];
        let n = content
            .read(&mut head)
            .await
            .map_err(|e| fault(key, "read content", e))?;
        if n == 0 {
            warn!(key, "Rejected empty content");
            return Err(StoreError::EmptyContent(key.to_string()));
        }
        head.truncate(n);

        if !options.overwrite {
            let exists = tokio::fs::try_exists(&path)
                .await
                .map_err(|e| fault(key, "check for existing file", e))?;
            if exists {
                return Err(conflict(key));
            }
        }

        if let Some(metadata) = &options.metadata {
            debug!(
                key,
                entries = metadata.len(),
                "Discarding metadata, not persisted by local storage"
            );
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| fault(key, "create parent directory", e))?;
            debug!(directory = %parent.display(), "Directory ensured");
        }

        let result = if options.overwrite {
            replace_file(&path, &head, &mut content).await
        } else {
            create_file(&path, &head, &mut content).await
        };

        match result {
            Ok(bytes) => {
                info!(key, bytes, path = %path.display(), "File saved");
                Ok(())
            }
            // Lost a race with another writer between the check and the create
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && !options.overwrite => {
                Err(conflict(key))
            }
            Err(e) => Err(fault(key, "save file", e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.object_path(key)?;

        let present = regular_file_metadata(&path)
            .await
            .map_err(|e| fault(key, "read file metadata", e))?
            .is_some();
        if !present {
            warn!(key, "File not found for deletion");
            return Ok(false);
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(key, "File deleted");
                Ok(true)
            }
            Err(e) if is_absent(&e) => {
                warn!(key, "File not found for deletion");
                Ok(false)
            }
            Err(e) => Err(fault(key, "delete file", e)),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let Ok(path) = self.object_path(key) else {
            return Ok(false);
        };

        let meta = regular_file_metadata(&path)
            .await
            .map_err(|e| fault(key, "check file existence", e))?;
        Ok(meta.is_some())
    }

    async fn signed_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<Option<String>, StoreError> {
        warn!(
            key,
            expires_in_secs = expires_in.as_secs(),
            "Signed URL generation not supported for local file storage"
        );
        Ok(None)
    }
}

fn conflict(key: &str) -> StoreError {
    warn!(key, "File already exists and overwrite is disabled");
    StoreError::AlreadyExists(key.to_string())
}

fn fault(key: &str, action: &str, e: io::Error) -> StoreError {
    error!(key, error = %e, "Failed to {action}");
    StoreError::Io(e)
}

fn is_absent(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Metadata for `path` if it is a regular file, `None` if nothing (or a directory) is there.
async fn regular_file_metadata(path: &Path) -> io::Result<Option<std::fs::Metadata>> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(Some(meta)),
        Ok(_) => Ok(None),
        Err(e) if is_absent(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Write a file that must not exist yet.
async fn create_file(path: &Path, head: &[u8], content: &mut ByteStream) -> io::Result<u64> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    let partial = PartialFile::new(path);

    let written = write_body(&mut file, head, content).await?;
    partial.keep();
    Ok(written)
}

/// Write to a temp file next to `path`, then rename it over `path`.
///
/// An existing file's permissions carry over to the replacement.
async fn replace_file(path: &Path, head: &[u8], content: &mut ByteStream) -> io::Result<u64> {
    let previous = regular_file_metadata(path).await?;
    let tmp = temp_path(path);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp)
        .await?;
    let partial = PartialFile::new(&tmp);

    let written = write_body(&mut file, head, content).await?;
    drop(file);
    if let Some(previous) = previous {
        tokio::fs::set_permissions(&tmp, previous.permissions()).await?;
    }
    tokio::fs::rename(&tmp, path).await?;
    partial.keep();
    Ok(written)
}

async fn write_body(file: &mut File, head: &[u8], content: &mut ByteStream) -> io::Result<u64> {
    file.write_all(head).await?;
    let rest = tokio::io::copy(content, file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(head.len() as u64 + rest)
}

/// Fixed-length sibling name, so long target names stay within the filesystem limit.
fn temp_path(path: &Path) -> PathBuf {
    path.with_file_name(format!(".{}.tmp", uuid::Uuid::new_v4()))
}

/// Removes a file this call created unless the write completed.
///
/// Covers both I/O errors and the save future being dropped mid-write.
struct PartialFile {
    path: Option<PathBuf>,
}

impl PartialFile {
    fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn keep(mut self) {
        self.path = None;
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to remove partial file");
                }
            }
        }
    }
}
