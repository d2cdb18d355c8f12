pub mod export;
pub mod forge;
pub mod health;

use crate::error::AppError;
use crate::state::AppState;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

/// Reject the request unless it carries the configured bearer token.
pub(crate) fn authorize(app: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = app.token.as_deref() else {
        return Ok(());
    };
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    match presented {
        Some(token) if token == expected => Ok(()),
        Some(_) => Err(AppError::unauthorized("invalid access token")),
        None => Err(AppError::unauthorized("missing bearer token")),
    }
}
