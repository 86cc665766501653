use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{key_from_url, validate_key, ObjectStore, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Put(String),
    Delete(String),
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, (Vec<u8>, String)>,
    calls: Vec<StorageCall>,
}

/// Blob store kept in process memory. Records every call and can be told to
/// fail writes or deletes, which makes ordering properties observable.
#[derive(Clone)]
pub struct MemoryObjectStore {
    base_url: String,
    inner: Arc<Mutex<Inner>>,
    fail_puts: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://blobs")
    }
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            inner: Arc::new(Mutex::new(Inner::default())),
            fail_puts: Arc::new(AtomicBool::new(false)),
            fail_deletes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Place an object directly, bypassing the call log
    pub fn seed(&self, key: &str, bytes: &[u8]) -> String {
        let url = format!("{}/{}", self.base_url, key);
        self.lock()
            .objects
            .insert(url.clone(), (bytes.to_vec(), "application/octet-stream".to_string()));
        url
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().objects.contains_key(url)
    }

    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn content_type(&self, url: &str) -> Option<String> {
        self.lock().objects.get(url).map(|(_, ct)| ct.clone())
    }

    pub fn calls(&self) -> Vec<StorageCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-call; the map is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, StorageError> {
        validate_key(key)?;
        let mut inner = self.lock();
        inner.calls.push(StorageCall::Put(key.to_string()));

        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StorageError::Write {
                key: key.to_string(),
                reason: "simulated storage fault".to_string(),
            });
        }

        let url = format!("{}/{}", self.base_url, key);
        inner.objects.insert(url.clone(), (bytes, content_type.to_string()));
        Ok(url)
    }

    async fn delete(&self, url: &str) -> Result<(), StorageError> {
        key_from_url(&self.base_url, url)?;
        let mut inner = self.lock();
        inner.calls.push(StorageCall::Delete(url.to_string()));

        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::Delete {
                url: url.to_string(),
                reason: "simulated storage fault".to_string(),
            });
        }

        inner.objects.remove(url);
        Ok(())
    }
}
