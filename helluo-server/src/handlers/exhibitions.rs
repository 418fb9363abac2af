use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use helluo_core::model::{ExhibitionUpdate, NewExhibition};

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

pub async fn list_exhibitions(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let items = state.exhibitions.list().await?;
    Ok(Json(json!({ "items": items })))
}

pub async fn add_exhibition(
    State(state): State<AppState>,
    Json(body): Json<NewExhibition>,
) -> AppResult<Json<Value>> {
    let item = state.exhibitions.add(body).await?;
    Ok(Json(json!({ "success": true, "item": item })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateExhibitionRequest {
    id: Option<String>,
    #[serde(flatten)]
    update: ExhibitionUpdate,
}

pub async fn update_exhibition(
    State(state): State<AppState>,
    Json(body): Json<UpdateExhibitionRequest>,
) -> AppResult<Json<Value>> {
    let id = require_id(body.id)?;
    let item = state.exhibitions.update(&id, body.update).await?;
    Ok(Json(json!({ "success": true, "item": item })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteExhibitionQuery {
    id: Option<String>,
}

pub async fn delete_exhibition(
    State(state): State<AppState>,
    Query(query): Query<DeleteExhibitionQuery>,
) -> AppResult<Json<Value>> {
    let id = require_id(query.id)?;
    state.exhibitions.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}

fn require_id(id: Option<String>) -> AppResult<String> {
    id.filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing exhibition ID"))
}
