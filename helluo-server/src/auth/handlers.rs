use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::AppState;
use crate::infra::errors::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct PasswordCheck {
    #[serde(default)]
    password: Option<String>,
}

/// Lets the admin UI check a password before storing it.
pub async fn verify_password(
    State(state): State<AppState>,
    Json(body): Json<PasswordCheck>,
) -> AppResult<Json<Value>> {
    let password = body
        .password
        .filter(|password| !password.is_empty())
        .ok_or_else(|| AppError::bad_request("Password required"))?;

    if !state.is_admin_token(&password) {
        info!("admin password check failed");
        return Err(AppError::unauthorized("Invalid password"));
    }

    Ok(Json(json!({ "success": true })))
}
