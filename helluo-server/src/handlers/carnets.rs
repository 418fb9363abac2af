use axum::{
    Json,
    extract::{Multipart, Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use helluo_core::IncomingFile;

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

/// Multipart field carrying carnet page files; repeated once per file.
pub const FILES_FIELD: &str = "files";

pub async fn list_carnets(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let carnets = state.carnets.list_carnets().await?;
    Ok(Json(json!({ "carnets": carnets })))
}

pub async fn ingest_carnets(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<Value>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            debug!(field = ?field.name(), "ignoring multipart field");
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        files.push(IncomingFile::new(filename, content_type, bytes.to_vec()));
    }

    let report = state.carnets.ingest(files).await?;

    Ok(Json(json!({
        "success": true,
        "uploaded": report.uploaded,
        "total": report.total,
        "results": report.results,
        "carnets": report.carnets,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCarnetQuery {
    carnet_id: Option<String>,
    page_number: Option<String>,
}

/// Deletes one page when `pageNumber` is given, otherwise the whole carnet.
pub async fn delete_carnet(
    State(state): State<AppState>,
    Query(query): Query<DeleteCarnetQuery>,
) -> AppResult<Json<Value>> {
    let carnet_id = query
        .carnet_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing carnet ID"))?;

    match query.page_number.filter(|raw| !raw.is_empty()) {
        Some(raw) => {
            let page_number: u32 = raw
                .trim()
                .parse()
                .map_err(|_| AppError::bad_request("Invalid page number"))?;
            state.carnets.delete_page(&carnet_id, page_number).await?;
        }
        None => state.carnets.delete_carnet(&carnet_id).await?,
    }

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct RenameCarnetRequest {
    id: Option<String>,
    title: Option<String>,
}

pub async fn rename_carnet(
    State(state): State<AppState>,
    Json(body): Json<RenameCarnetRequest>,
) -> AppResult<Json<Value>> {
    let id = body
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing carnet ID"))?;
    let title = body.title.unwrap_or_default();

    let carnet = state.carnets.rename_carnet(&id, &title).await?;
    Ok(Json(json!({ "success": true, "carnet": carnet })))
}
