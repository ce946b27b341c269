use crate::backend::{BackendClient, BackendError, User};

use super::cookies::CredentialStore;

/// The session a protected page renders with. Never stored; rebuilt from
/// `GET /users/me` on each protected navigation.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

/// Outcome of the session gate for one render
#[derive(Debug)]
pub enum SessionState {
    Valid(Session),
    /// Access token rejected; carries the path to return to after recovery
    NeedsRefresh(String),
    /// No usable session. `has_tokens` tells whether cookies still need purging.
    Invalid { has_tokens: bool },
    /// Backend unreachable
    Unavailable,
}

impl SessionState {
    /// Classification name as it shows up in logs
    pub fn classification(&self) -> &'static str {
        match self {
            SessionState::Valid(_) => "success",
            SessionState::NeedsRefresh(_) => "needs_refresh",
            SessionState::Invalid { .. } => "no_session",
            SessionState::Unavailable => "server_error",
        }
    }
}

/// Re-validate the access token against the backend and classify the result
pub async fn resolve(backend: &BackendClient, store: &CredentialStore, requested_path: &str) -> SessionState {
    let Some(access_token) = store.get_access() else {
        if store.get_refresh().is_some() {
            // The edge interceptor could not refresh; let recovery decide
            return SessionState::NeedsRefresh(requested_path.to_string());
        }
        return SessionState::Invalid { has_tokens: false };
    };

    match backend.current_user(access_token).await {
        Ok(user) => SessionState::Valid(Session {
            user,
            access_token: access_token.to_string(),
        }),
        Err(e) if e.is_unauthorized() => SessionState::NeedsRefresh(requested_path.to_string()),
        Err(BackendError::Unreachable(e)) => {
            tracing::warn!("Session check failed, backend unreachable: {}", e);
            SessionState::Unavailable
        }
        Err(e) => {
            tracing::warn!("Session check failed: {}", e);
            SessionState::Invalid { has_tokens: true }
        }
    }
}
