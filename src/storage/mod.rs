pub mod http;
pub mod local;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpObjectStore;
pub use local::LocalObjectStore;
pub use memory::{MemoryObjectStore, StorageCall};

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("write failed for '{key}': {reason}")]
    Write { key: String, reason: String },

    #[error("delete failed for '{url}': {reason}")]
    Delete { url: String, reason: String },

    #[error("'{0}' is not managed by this store")]
    ForeignUrl(String),

    #[error("invalid object key '{0}'")]
    InvalidKey(String),
}

/// External blob storage holding workspace images.
///
/// `put` returns the public URL of the stored object; `delete` takes that same
/// URL. Deleting an object that is already gone succeeds.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError>;

    async fn delete(&self, url: &str) -> Result<(), StorageError>;
}

/// Keys are relative paths; reject anything that could escape the store root.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Map a public URL back to its key under `base_url`
pub(crate) fn key_from_url<'a>(base_url: &str, url: &'a str) -> Result<&'a str, StorageError> {
    let key = url
        .strip_prefix(base_url)
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;
    validate_key(key)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_traversal_keys() {
        assert!(validate_key("workspaces/abc/logo.png").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/abs/path").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("").is_err());
    }

    #[test]
    fn strips_base_url() {
        let base = "https://store.example.com/blobs";
        assert_eq!(
            key_from_url(base, "https://store.example.com/blobs/workspaces/1/a.png").unwrap(),
            "workspaces/1/a.png"
        );
        assert!(matches!(
            key_from_url(base, "https://elsewhere.example.com/a.png"),
            Err(StorageError::ForeignUrl(_))
        ));
        assert!(key_from_url(base, "https://store.example.com/blobs/../secret").is_err());
    }
}
