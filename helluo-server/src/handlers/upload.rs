use axum::{
    Json,
    extract::{Multipart, State},
};
use serde_json::{Value, json};

use helluo_core::ImageUpload;

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

pub const FILE_FIELD: &str = "file";

/// Uploads one image to the root folder for use by gallery entries.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        let uploaded = state
            .images
            .upload(ImageUpload {
                bytes: &bytes,
                content_type: &content_type,
                folder: &state.config.media.root_folder,
                filename: filename.as_deref(),
            })
            .await?;

        return Ok(Json(json!({
            "success": true,
            "url": uploaded.url,
            "public_id": uploaded.storage_id,
            "filename": uploaded.original_filename,
        })));
    }

    Err(AppError::bad_request("No file provided"))
}
