use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a stored file, computed from the filesystem on each query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// The key the file was requested by, verbatim.
    pub name: String,
    pub byte_size: u64,
    /// Guessed from the key's extension.
    pub content_type: String,
    pub modified_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(name: &str, byte_size: u64, modified_at: DateTime<Utc>) -> Self {
        let content_type = mime_guess::from_path(name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Self {
            name: name.to_string(),
            byte_size,
            content_type,
            modified_at,
        }
    }
}
