//! In-process adapters for the storage ports.
//!
//! Used by the server in dev mode and by tests. Failures can be injected to
//! exercise the partial-failure paths of the services.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::ports::{CollectionStore, ImageStore, ImageUpload, UploadedImage};
use crate::{GalleryError, Result};

#[derive(Default)]
pub struct InMemoryCollectionStore {
    entries: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl fmt::Debug for InMemoryCollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCollectionStore").finish_non_exhaustive()
    }
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document under `key`.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.into());
    }

    /// Makes every subsequent `set` fail until switched off again.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GalleryError::Store(format!(
                "write to {key} rejected"
            )));
        }
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ImageLedger {
    next_id: u64,
    stored: HashMap<String, UploadedImage>,
    deleted: Vec<String>,
}

/// Image host that keeps uploads in memory and serves fake urls.
#[derive(Default)]
pub struct InMemoryImageStore {
    ledger: Mutex<ImageLedger>,
    rejected_payloads: Mutex<Vec<Vec<u8>>>,
    fail_deletes: AtomicBool,
}

impl fmt::Debug for InMemoryImageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryImageStore").finish_non_exhaustive()
    }
}

impl InMemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads whose bytes equal `payload` fail.
    pub async fn reject_payload(&self, payload: impl Into<Vec<u8>>) {
        self.rejected_payloads.lock().await.push(payload.into());
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Storage ids currently held.
    pub async fn stored_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> =
            self.ledger.lock().await.stored.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Storage ids destroyed so far, in call order.
    pub async fn deleted_ids(&self) -> Vec<String> {
        self.ledger.lock().await.deleted.clone()
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn upload(&self, upload: ImageUpload<'_>) -> Result<UploadedImage> {
        if self
            .rejected_payloads
            .lock()
            .await
            .iter()
            .any(|payload| payload.as_slice() == upload.bytes)
        {
            return Err(GalleryError::ImageStore(
                "upload rejected by in-memory store".into(),
            ));
        }

        let mut ledger = self.ledger.lock().await;
        ledger.next_id += 1;
        let storage_id = format!("{}/image-{}", upload.folder, ledger.next_id);
        let image = UploadedImage {
            url: format!("https://images.invalid/{storage_id}"),
            storage_id: storage_id.clone(),
            original_filename: upload.filename.map(str::to_string),
        };
        ledger.stored.insert(storage_id.clone(), image.clone());
        debug!(storage_id = %storage_id, bytes = upload.bytes.len(), "image stored in memory");
        Ok(image)
    }

    async fn delete(&self, storage_id: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(GalleryError::ImageStore(format!(
                "delete of {storage_id} rejected"
            )));
        }
        let mut ledger = self.ledger.lock().await;
        if ledger.stored.remove(storage_id).is_none() {
            return Err(GalleryError::ImageStore(format!(
                "{storage_id} not found"
            )));
        }
        ledger.deleted.push(storage_id.to_string());
        Ok(())
    }
}
