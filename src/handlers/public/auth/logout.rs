// handlers/public/auth/logout.rs - POST /api/auth/logout handler

use axum::extract::State;
use serde_json::Value;

use crate::auth::CredentialStore;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// POST /api/auth/logout - End the session
///
/// Tells the backend (best-effort, failures only logged) and always clears
/// both cookies.
pub async fn logout(State(state): State<AppState>, mut store: CredentialStore) -> (CredentialStore, ApiResponse<Value>) {
    if let Some(access_token) = store.get_access() {
        if let Err(e) = state.backend.logout(access_token).await {
            tracing::debug!("Backend logout failed, clearing cookies anyway: {}", e);
        }
    }

    store.clear();
    tracing::info!("Session ended");

    (store, ApiResponse::ok())
}
