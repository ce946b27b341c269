// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::auth::CredentialStore;
use crate::backend::{BackendError, RegisterRequest};
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// POST /api/auth/register - Create an account and start a session
///
/// Expected Input:
/// ```json
/// { "email": "...", "password": "...", "firstName": "Ada", "lastName": "Lovelace" }
/// ```
///
/// Responds 201 with the backend payload minus the tokens, which are set as
/// cookies exactly as on login.
pub async fn register(
    State(state): State<AppState>,
    mut store: CredentialStore,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(CredentialStore, ApiResponse<Value>), ApiError> {
    let Json(registration) = payload.map_err(|e| ApiError::invalid_json(e.body_text()))?;

    if registration.email.trim().is_empty() || registration.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let auth = state.backend.register(&registration).await?;

    store
        .set(&auth.tokens.access_token, &auth.tokens.refresh_token)
        .map_err(|e| BackendError::Malformed(e.to_string()))?;
    tracing::debug!("Account registered and signed in");

    Ok((store, ApiResponse::created(auth.data)))
}
