// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::auth::CredentialStore;
use crate::backend::{BackendError, LoginRequest};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// POST /api/auth/login - Exchange credentials for session cookies
///
/// Forwards the credentials to `POST {API}/auth/login`. The returned token pair
/// never reaches the browser body; it is written to the `access_token` and
/// `refresh_token` cookies instead.
///
/// Expected Input:
/// ```json
/// { "email": "ada@example.com", "password": "..." }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "success": true, "data": { "user": { ... } } }
/// ```
pub async fn login(
    State(state): State<AppState>,
    mut store: CredentialStore,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CredentialStore, ApiResponse<Value>), ApiError> {
    let Json(credentials) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let auth = state.backend.login(&credentials).await.map_err(|e| {
        tracing::info!("Login failed: {}", e);
        ApiError::from(e)
    })?;

    store
        .set(&auth.tokens.access_token, &auth.tokens.refresh_token)
        .map_err(|e| BackendError::Malformed(e.to_string()))?;
    tracing::debug!("Login succeeded");

    Ok((store, ApiResponse::success(auth.data)))
}
