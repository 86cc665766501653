//! Keeps a workspace's `image` column consistent with its blob in object storage.
//!
//! The row update and the blob operation are separate steps with no shared
//! transaction. The ordering used here (upload the new blob, persist, then
//! delete the superseded one) means a failure can at worst orphan a blob; it
//! never leaves the row pointing at a blob that is gone.
//!
//! Calls for a single workspace must be serialized by the caller.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::storage::{ObjectStore, StorageError};

/// An uploaded image as received from the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: Option<String>,
}

impl ImageFile {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
            filename: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// Upload failed; nothing was deleted and the row must not change.
    #[error("Failed to upload image: {0}")]
    StorageWrite(#[source] StorageError),

    /// Blob removal failed; the row must keep its image reference.
    #[error("Failed to delete image: {0}")]
    StorageDelete(#[source] StorageError),
}

/// A superseded or discarded blob that could not be removed. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCleanupWarning {
    pub url: String,
    pub reason: String,
}

impl fmt::Display for StorageCleanupWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stale image {} was not removed: {}", self.url, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub url: String,
    pub cleanup_warning: Option<StorageCleanupWarning>,
}

/// A blob uploaded but not yet referenced by its row. Finish it with
/// [`ImageReconciler::commit`] once the row holds `url`, or
/// [`ImageReconciler::discard`] if persisting failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a staged image must be committed or discarded"]
pub struct StagedImage {
    pub workspace_id: Uuid,
    pub url: String,
}

#[derive(Clone)]
pub struct ImageReconciler {
    store: Arc<dyn ObjectStore>,
}

impl ImageReconciler {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Upload for a freshly created row. No file, or an empty one, means no image.
    pub async fn create(&self, workspace_id: Uuid, file: Option<ImageFile>) -> Result<Option<String>, ImageError> {
        match file {
            Some(file) if !file.is_empty() => {
                let staged = self.stage(workspace_id, file).await?;
                Ok(Some(staged.url))
            }
            _ => Ok(None),
        }
    }

    /// Upload `file`, then delete `current` (never the other way round).
    ///
    /// The caller persists the returned URL. A failed stale-blob deletion is
    /// reported in `cleanup_warning` and does not fail the call.
    pub async fn replace(
        &self,
        workspace_id: Uuid,
        file: ImageFile,
        current: Option<&str>,
    ) -> Result<Replaced, ImageError> {
        let staged = self.stage(workspace_id, file).await?;
        let cleanup_warning = self.commit(&staged, current).await;
        Ok(Replaced {
            url: staged.url,
            cleanup_warning,
        })
    }

    pub async fn stage(&self, workspace_id: Uuid, file: ImageFile) -> Result<StagedImage, ImageError> {
        let key = image_key(workspace_id, &file);
        let size = file.len();

        let url = self
            .store
            .put(&key, file.bytes, &file.content_type)
            .await
            .map_err(|e| {
                warn!(%workspace_id, "Image upload failed: {}", e);
                ImageError::StorageWrite(e)
            })?;

        info!(%workspace_id, size, "Uploaded workspace image {}", url);
        Ok(StagedImage { workspace_id, url })
    }

    /// Remove the blob the staged image supersedes.
    pub async fn commit(&self, staged: &StagedImage, previous: Option<&str>) -> Option<StorageCleanupWarning> {
        match previous {
            Some(old) if old != staged.url => self.release(staged.workspace_id, old).await,
            _ => None,
        }
    }

    /// Drop a staged blob whose row update never happened.
    pub async fn discard(&self, staged: StagedImage) -> Option<StorageCleanupWarning> {
        self.release(staged.workspace_id, &staged.url).await
    }

    /// Delete the blob behind a workspace's image. `None` is a no-op and never
    /// touches storage. Returns whether a blob was removed.
    pub async fn delete(&self, workspace_id: Uuid, image_url: Option<&str>) -> Result<bool, ImageError> {
        let Some(url) = image_url else {
            debug!(%workspace_id, "No image to delete");
            return Ok(false);
        };

        self.store.delete(url).await.map_err(|e| {
            warn!(%workspace_id, "Image delete failed: {}", e);
            ImageError::StorageDelete(e)
        })?;

        info!(%workspace_id, "Deleted workspace image {}", url);
        Ok(true)
    }

    /// Best-effort removal; failure leaves an orphaned blob and a warning.
    pub async fn release(&self, workspace_id: Uuid, url: &str) -> Option<StorageCleanupWarning> {
        match self.store.delete(url).await {
            Ok(()) => {
                debug!(%workspace_id, "Released image {}", url);
                None
            }
            Err(e) => {
                let warning = StorageCleanupWarning {
                    url: url.to_string(),
                    reason: e.to_string(),
                };
                warn!(%workspace_id, "{}", warning);
                Some(warning)
            }
        }
    }
}

/// `workspaces/{id}/{content hash}-{millis}.{ext}`; the timestamp keeps a
/// re-upload of identical bytes from colliding with the blob it replaces.
fn image_key(workspace_id: Uuid, file: &ImageFile) -> String {
    let digest = Sha256::digest(&file.bytes);
    let hash = format!("{:x}", digest);
    format!(
        "workspaces/{}/{}-{}.{}",
        workspace_id,
        &hash[..16],
        Utc::now().timestamp_millis(),
        extension_for(&file.content_type, file.filename.as_deref())
    )
}

fn extension_for(content_type: &str, filename: Option<&str>) -> String {
    let from_type = match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/svg+xml" => Some("svg"),
        "image/avif" => Some("avif"),
        _ => None,
    };
    if let Some(ext) = from_type {
        return ext.to_string();
    }

    filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string())
}
