//! Object store contract and filesystem implementation.
//!
//! # Invariants
//! - Keys are `/`-separated relative paths with no empty, `.` or `..`
//!   segments.
//! - `put_object` overwrites existing objects, making reruns idempotent.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::PathBuf;

/// Error raised by object store implementations.
#[derive(Debug)]
pub enum StoreError {
    InvalidKey(String),
    Io { key: String, source: std::io::Error },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid object key `{key}`"),
            Self::Io { key, source } => write!(f, "failed to write object `{key}`: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Destination for backup blobs.
pub trait ObjectStore {
    /// Stores `body` under `key`, replacing any existing object.
    fn put_object(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StoreError>;
}

/// Object store rooted at a local directory.
///
/// Content types are not persisted; the file extension carries the format.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute path an object with `key` is written to.
    pub fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(key
            .split('/')
            .fold(self.root.clone(), |path, segment| path.join(segment)))
    }
}

impl ObjectStore for FsObjectStore {
    fn put_object(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        let io_error = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&path, body).map_err(io_error)?;

        info!(
            "event=object_put module=backup status=ok key={key} bytes={} content_type={content_type}",
            body.len()
        );
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::validate_key;

    #[test]
    fn keys_reject_traversal_and_empty_segments() {
        assert!(validate_key("backups/2024-01-01/a.csv").is_ok());
        assert!(validate_key("../escape.csv").is_err());
        assert!(validate_key("/abs.csv").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("").is_err());
    }
}
