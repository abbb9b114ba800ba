//! Key to path resolution.

use std::path::{Component, Path, PathBuf};

use super::StoreError;

/// Resolve `key` to a path beneath `base`.
///
/// `.` segments are dropped. Parent segments, absolute paths and NUL bytes are
/// rejected so a key can never name anything outside `base`.
pub(crate) fn resolve(base: &Path, key: &str) -> Result<PathBuf, StoreError> {
    if key.trim().is_empty() {
        return Err(invalid(key, "key is empty"));
    }
    if key.contains('\0') {
        return Err(invalid(key, "key contains a NUL byte"));
    }

    let mut relative = PathBuf::new();
    for component in Path::new(key).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(invalid(key, "parent directory segments are not allowed"))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid(key, "absolute paths are not allowed"))
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(invalid(key, "key does not name a file"));
    }

    Ok(base.join(relative))
}

fn invalid(key: &str, reason: &'static str) -> StoreError {
    StoreError::InvalidKey {
        key: key.to_string(),
        reason,
    }
}
