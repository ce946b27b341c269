// handlers/public/auth/refresh.rs - POST /api/auth/refresh handler

use axum::extract::State;
use serde_json::Value;

use crate::auth::{rotate, CredentialStore, RefreshOutcome};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// POST /api/auth/refresh - Rotate the session cookies on demand
///
/// Uses the `refresh_token` cookie, never a request body. Outcomes:
/// - rotated: 200, both cookies rewritten
/// - rejected (missing, expired or revoked refresh token, malformed answer):
///   401, both cookies cleared
/// - backend unreachable: 503, cookies untouched
///
/// Calling this twice with a refresh token the backend has already rotated
/// away ends in the rejected branch, so the pair is never left half-written.
pub async fn refresh(
    State(state): State<AppState>,
    mut store: CredentialStore,
) -> (CredentialStore, Result<ApiResponse<Value>, ApiError>) {
    let result = match rotate(&state.backend, &mut store).await {
        RefreshOutcome::Rotated => Ok(ApiResponse::ok()),
        RefreshOutcome::Rejected => Err(ApiError::unauthorized("Session expired, please sign in again")),
        RefreshOutcome::Unavailable => Err(ApiError::service_unavailable("Server unavailable, please retry")),
    };

    (store, result)
}
