// Shared-secret token check for the upload route

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::models::AppState;
use crate::types::{AppError, AppResult};

/// Reject the request unless its `Authorization` header equals the configured token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> AppResult<Response> {
    if let Err(e) = verify_access_token(req.headers(), &state.config.auth.access_token) {
        warn!("Rejected {} {}: {}", req.method(), req.uri().path(), e);
        return Err(e);
    }
    Ok(next.run(req).await)
}

/// The header carries the raw token, no `Bearer` prefix. Plain comparison.
pub fn verify_access_token(headers: &HeaderMap, expected: &str) -> AppResult<()> {
    let provided = match headers.get(AUTHORIZATION) {
        None => return Err(AppError::MissingToken),
        Some(value) if value.is_empty() => return Err(AppError::MissingToken),
        Some(value) => value.as_bytes(),
    };

    if provided != expected.as_bytes() {
        return Err(AppError::InvalidToken);
    }
    Ok(())
}
