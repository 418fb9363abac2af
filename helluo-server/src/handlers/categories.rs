use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use helluo_core::model::{CategoryUpdate, NewCategory};

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let categories = state.categories.list().await?;
    Ok(Json(json!({ "categories": categories })))
}

pub async fn add_category(
    State(state): State<AppState>,
    Json(body): Json<NewCategory>,
) -> AppResult<Json<Value>> {
    let category = state.categories.add(body).await?;
    Ok(Json(json!({ "success": true, "category": category })))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    id: Option<String>,
    #[serde(flatten)]
    update: CategoryUpdate,
}

pub async fn update_category(
    State(state): State<AppState>,
    Json(body): Json<UpdateCategoryRequest>,
) -> AppResult<Json<Value>> {
    let id = require_id(body.id)?;
    let category = state.categories.update(&id, body.update).await?;
    Ok(Json(json!({ "success": true, "category": category })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteCategoryQuery {
    id: Option<String>,
}

pub async fn delete_category(
    State(state): State<AppState>,
    Query(query): Query<DeleteCategoryQuery>,
) -> AppResult<Json<Value>> {
    let id = require_id(query.id)?;
    state.categories.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}

fn require_id(id: Option<String>) -> AppResult<String> {
    id.filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::bad_request("Missing category ID"))
}
