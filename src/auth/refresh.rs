//! Token rotation shared by every layer that refreshes.
//!
//! The edge interceptor, the recovery endpoint, `POST /api/auth/refresh` and
//! the request proxy all rotate through [`rotate`], so a refresh always ends
//! with both cookies rewritten or both cleared.

use crate::backend::BackendClient;

use super::cookies::CredentialStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New tokens are staged on the store
    Rotated,
    /// Terminal: no refresh token, backend said no, or the answer was unusable.
    /// The store has been cleared.
    Rejected,
    /// The backend could not be reached. The store is untouched.
    Unavailable,
}

pub async fn rotate(backend: &BackendClient, store: &mut CredentialStore) -> RefreshOutcome {
    let Some(refresh_token) = store.get_refresh().map(str::to_string) else {
        store.clear();
        return RefreshOutcome::Rejected;
    };

    match backend.refresh(&refresh_token).await {
        Ok(tokens) => {
            // Backends that do not rotate refresh tokens keep the current one
            let next_refresh = tokens.refresh_token.unwrap_or(refresh_token);
            if let Err(e) = store.set(&tokens.access_token, &next_refresh) {
                tracing::warn!("Token refresh returned an unusable token: {}", e);
                store.clear();
                return RefreshOutcome::Rejected;
            }
            tracing::info!("Session tokens rotated");
            RefreshOutcome::Rotated
        }
        Err(e) if e.is_unreachable() => {
            tracing::warn!("Token refresh skipped: {}", e);
            RefreshOutcome::Unavailable
        }
        Err(e) => {
            tracing::warn!("Token refresh rejected: {}", e);
            store.clear();
            RefreshOutcome::Rejected
        }
    }
}
