use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use helluo_core::{GalleryError, ImageStore, ImageUpload, Result, UploadedImage};

use crate::infra::config::CloudinaryConfig;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Signed uploads and deletions against the Cloudinary REST API.
pub struct CloudinaryImageStore {
    http: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl fmt::Debug for CloudinaryImageStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryImageStore")
            .field("cloud_name", &self.cloud_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    original_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

impl CloudinaryImageStore {
    pub fn new(config: &CloudinaryConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            base_url: API_BASE.to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    /// Points the client at another API root, e.g. a local stub.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{action}", self.base_url, self.cloud_name)
    }

    fn sign(&self, params: &[(&str, &str)]) -> String {
        signature(params, &self.api_secret)
    }

    /// Adds the auth fields shared by every signed request.
    fn signed_form(&self, params: &[(&str, &str)]) -> Form {
        let mut form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("signature", self.sign(params))
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key.to_string(), value.to_string());
        }
        form
    }

    async fn post<T: for<'de> Deserialize<'de>>(&self, action: &str, form: Form) -> Result<T> {
        let response = self
            .http
            .post(self.endpoint(action))
            .multipart(form)
            .send()
            .await
            .map_err(|e| GalleryError::ImageStore(format!("Cloudinary {action} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GalleryError::ImageStore(format!(
                "Cloudinary {action} returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GalleryError::ImageStore(format!("Cloudinary {action} response unreadable: {e}")))
    }
}

#[async_trait]
impl ImageStore for CloudinaryImageStore {
    async fn upload(&self, upload: ImageUpload<'_>) -> Result<UploadedImage> {
        let timestamp = Utc::now().timestamp().to_string();
        let params = [("folder", upload.folder), ("timestamp", timestamp.as_str())];

        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.filename.unwrap_or("upload").to_string())
            .mime_str(upload.content_type)
            .map_err(|e| GalleryError::validation(format!("Invalid content type: {e}")))?;
        let form = self.signed_form(&params).part("file", part);

        debug!(folder = %upload.folder, bytes = upload.bytes.len(), "uploading image to Cloudinary");
        let uploaded: UploadResponse = self.post("upload", form).await?;
        info!(public_id = %uploaded.public_id, "image uploaded");

        Ok(UploadedImage {
            url: uploaded.secure_url,
            storage_id: uploaded.public_id,
            original_filename: uploaded.original_filename,
        })
    }

    async fn delete(&self, storage_id: &str) -> Result<()> {
        let timestamp = Utc::now().timestamp().to_string();
        let params = [("public_id", storage_id), ("timestamp", timestamp.as_str())];

        let destroyed: DestroyResponse = self.post("destroy", self.signed_form(&params)).await?;
        if destroyed.result != "ok" {
            return Err(GalleryError::ImageStore(format!(
                "Cloudinary destroy of {storage_id} answered {}",
                destroyed.result
            )));
        }

        info!(public_id = %storage_id, "image destroyed");
        Ok(())
    }
}

/// `key=value` pairs sorted by key and joined with `&`, empty values
/// skipped, with the API secret appended.
fn string_to_sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut pairs: Vec<&(&str, &str)> =
        params.iter().filter(|(_, value)| !value.is_empty()).collect();
    pairs.sort_by_key(|(key, _)| *key);

    let joined = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("{joined}{api_secret}")
}

fn signature(params: &[(&str, &str)], api_secret: &str) -> String {
    hex::encode(Sha256::digest(string_to_sign(params, api_secret).as_bytes()))
}
