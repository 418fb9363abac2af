use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use helluo_core::gallery::PortfolioSelector;
use helluo_core::model::NewPortfolioItem;

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let items = state.portfolio.list().await?;
    Ok(Json(json!({ "items": items })))
}

pub async fn add_item(
    State(state): State<AppState>,
    Json(body): Json<NewPortfolioItem>,
) -> AppResult<Json<Value>> {
    let item = state.portfolio.add(body).await?;
    Ok(Json(json!({ "success": true, "item": item })))
}

#[derive(Debug, Deserialize)]
pub struct RetitleRequest {
    index: Option<usize>,
    title: Option<String>,
}

pub async fn retitle_item(
    State(state): State<AppState>,
    Json(body): Json<RetitleRequest>,
) -> AppResult<Json<Value>> {
    let index = body
        .index
        .ok_or_else(|| AppError::bad_request("Missing item index"))?;
    let title = body.title.unwrap_or_default();

    let item = state.portfolio.retitle(index, &title).await?;
    Ok(Json(json!({ "success": true, "item": item })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteItemQuery {
    id: Option<String>,
    index: Option<String>,
}

/// `index` takes precedence when both selectors are given.
pub async fn delete_item(
    State(state): State<AppState>,
    Query(query): Query<DeleteItemQuery>,
) -> AppResult<Json<Value>> {
    let selector = match (
        query.index.filter(|raw| !raw.is_empty()),
        query.id.filter(|id| !id.is_empty()),
    ) {
        (Some(raw), _) => {
            let index = raw
                .trim()
                .parse()
                .map_err(|_| AppError::bad_request("Invalid index"))?;
            PortfolioSelector::Index(index)
        }
        (None, Some(id)) => PortfolioSelector::Id(id),
        (None, None) => return Err(AppError::bad_request("Missing item ID or index")),
    };

    state.portfolio.delete(selector).await?;
    Ok(Json(json!({ "success": true })))
}
