// handlers/public/auth/recovery.rs - GET /api/auth/session-refresh handler

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::auth::{
    redirect::{login_url, safe_path},
    rotate, CredentialStore, RefreshOutcome,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecoveryQuery {
    pub redirect: Option<String>,
    pub purge: Option<String>,
}

/// GET /api/auth/session-refresh - Session recovery
///
/// Reached by redirect from the session gate when the access token was
/// rejected. Runs a full rotation and sends the browser back to `redirect`
/// (same-origin paths only, otherwise the landing route). Any failure,
/// including an unreachable backend, ends with both cookies cleared and a
/// redirect to login.
///
/// Two guards keep this from looping with the gate:
/// - `purge=true` clears unconditionally and goes to login
/// - a live `session_recovery` marker means the tokens issued moments ago
///   were rejected again, so the session is purged instead of refreshed
pub async fn session_refresh(
    State(state): State<AppState>,
    mut store: CredentialStore,
    Query(query): Query<RecoveryQuery>,
) -> (CredentialStore, Redirect) {
    let routes = &state.config.routes;
    let target = safe_path(query.redirect.as_deref()).unwrap_or(&routes.landing).to_string();
    let purge = matches!(query.purge.as_deref(), Some("true") | Some("1"));

    if purge || store.recently_recovered() {
        tracing::info!("Purging session before login (purge={})", purge);
        store.clear();
        return (store, Redirect::temporary(&login_url(&routes.login, Some(&target))));
    }

    match rotate(&state.backend, &mut store).await {
        RefreshOutcome::Rotated => {
            store.mark_recovered();
            tracing::debug!("Session recovered, returning to {}", target);
            (store, Redirect::temporary(&target))
        }
        outcome => {
            tracing::info!("Session recovery failed ({:?}), sending to login", outcome);
            store.clear();
            (store, Redirect::temporary(&login_url(&routes.login, Some(&target))))
        }
    }
}
