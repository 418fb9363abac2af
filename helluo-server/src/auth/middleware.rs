use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::AppState;
use crate::infra::errors::AppError;

/// Rejects requests that do not carry the admin password as bearer token.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorized = extract_bearer_token(&request)
        .map(|token| state.is_admin_token(token))
        .unwrap_or(false);

    if !authorized {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected unauthorized admin request"
        );
        return Err(AppError::unauthorized("Unauthorized"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}
