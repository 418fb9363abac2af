use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// One image handed to the image host.
#[derive(Debug, Clone, Copy)]
pub struct ImageUpload<'a> {
    pub bytes: &'a [u8],
    pub content_type: &'a str,
    /// Logical folder the host files the image under.
    pub folder: &'a str,
    /// Client-side filename, forwarded so the host can report it back.
    pub filename: Option<&'a str>,
}

/// Result of a successful upload to the image host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub url: String,
    pub storage_id: String,
    pub original_filename: Option<String>,
}

/// Remote image hosting.
///
/// Each upload fails independently, so batch callers can continue past a
/// failed file. Delete failures are the caller's to tolerate.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, upload: ImageUpload<'_>) -> Result<UploadedImage>;

    async fn delete(&self, storage_id: &str) -> Result<()>;
}
