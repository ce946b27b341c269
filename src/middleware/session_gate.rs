use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{
    redirect::{self, login_url, recovery_url},
    session::{self, SessionState},
    CredentialStore,
};
use crate::state::AppState;
use crate::views;

use super::edge::PATHNAME_HEADER;

/// Session gate for the protected area.
///
/// Confirms the access token with the backend before any protected page
/// renders and injects the resulting [`crate::auth::Session`] into the
/// request extensions. This layer never writes cookies: every failure that
/// needs a cookie change is delegated to the recovery endpoint.
pub async fn session_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let routes = &state.config.routes;
    let store = CredentialStore::from_headers(request.headers(), state.cookie_settings());
    let path = requested_path(&request);

    let outcome = session::resolve(&state.backend, &store, &path).await;
    tracing::debug!("Session gate for {}: {}", path, outcome.classification());

    match outcome {
        SessionState::Valid(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        SessionState::NeedsRefresh(path) => Redirect::temporary(&recovery_url(routes, &path, false)).into_response(),
        SessionState::Invalid { has_tokens: true } => {
            // Going straight to login would bounce back here while the cookies live
            Redirect::temporary(&recovery_url(routes, &path, true)).into_response()
        }
        SessionState::Invalid { has_tokens: false } => {
            Redirect::temporary(&login_url(&routes.login, Some(&path))).into_response()
        }
        SessionState::Unavailable => views::service_unavailable(&path).into_response(),
    }
}

/// The path the browser asked for, as recorded by the edge interceptor
fn requested_path(request: &Request) -> String {
    request
        .headers()
        .get(PATHNAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| redirect::safe_path(Some(value)))
        .map(str::to_string)
        .unwrap_or_else(|| redirect::path_and_query(request.uri()))
}
