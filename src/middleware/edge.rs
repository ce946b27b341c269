use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::{
    redirect::{self, login_url},
    refresh::{rotate, RefreshOutcome},
    token, CredentialStore,
};
use crate::state::AppState;

/// Request header carrying the originally requested path to later layers
pub const PATHNAME_HEADER: &str = "x-pathname";

/// Paths the interceptor never touches: the API surface and static files
pub fn is_excluded(path: &str) -> bool {
    path == "/api"
        || path.starts_with("/api/")
        || path.starts_with("/assets/")
        || path == "/favicon.ico"
        || path == "/health"
}

/// Edge interceptor, run before every page render.
///
/// Decides from the cookies alone whether to pass the request through, to
/// refresh first and bounce the browser back to the same URL, or to send it
/// to the login page.
pub async fn edge_interceptor(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if is_excluded(&path) {
        return next.run(request).await;
    }

    let routes = &state.config.routes;
    let leeway = state.config.session.expiry_leeway_secs;
    let target = redirect::path_and_query(request.uri());
    let mut store = CredentialStore::from_headers(request.headers(), state.cookie_settings());

    let access_fresh = store.get_access().is_some_and(|access| token::is_fresh(access, leeway));

    // Signed-in users have no business on the login/register pages. A stale
    // access token without a refresh token does not count as signed in.
    if (access_fresh || store.get_refresh().is_some()) && routes.is_auth_page(&path) {
        tracing::debug!("Authenticated request for {}, sending to {}", path, routes.landing);
        return Redirect::temporary(&routes.landing).into_response();
    }

    if access_fresh {
        set_pathname(&mut request, &target);
        return next.run(request).await;
    }

    if store.get_refresh().is_some() {
        match rotate(&state.backend, &mut store).await {
            RefreshOutcome::Rotated => {
                let issued_fresh = store.get_access().is_some_and(|access| token::is_fresh(access, leeway));
                if issued_fresh {
                    tracing::debug!("Refreshed at the edge, reloading {}", target);
                    return (store, Redirect::temporary(&target)).into_response();
                }

                // Redirecting would only bring us back here; continue with the new cookies instead
                tracing::warn!("Backend issued an access token that already looks expired");
                store.apply_to_request(request.headers_mut());
                set_pathname(&mut request, &target);
                let response = next.run(request).await;
                return (store, response).into_response();
            }
            RefreshOutcome::Rejected => {
                if routes.is_protected(&path) || path == "/" {
                    return (store, Redirect::temporary(&login_url(&routes.login, Some(&target)))).into_response();
                }

                // Public page: no redirect forced, but the dead cookies go
                store.apply_to_request(request.headers_mut());
                set_pathname(&mut request, &target);
                let response = next.run(request).await;
                return (store, response).into_response();
            }
            RefreshOutcome::Unavailable => {
                // Not a session failure; the session gate renders the outage
                set_pathname(&mut request, &target);
                return next.run(request).await;
            }
        }
    }

    // No refresh token: a leftover access token can never become usable again
    if store.has_tokens() {
        tracing::debug!("Dropping stale access token for {}", path);
        store.clear();
    }

    if path == "/" {
        return (store, Redirect::temporary(&routes.login)).into_response();
    }
    if routes.is_protected(&path) {
        tracing::debug!("No session for {}, redirecting to login", path);
        return (store, Redirect::temporary(&login_url(&routes.login, Some(&target)))).into_response();
    }

    store.apply_to_request(request.headers_mut());
    set_pathname(&mut request, &target);
    let response = next.run(request).await;
    (store, response).into_response()
}

fn set_pathname(request: &mut Request, target: &str) {
    if let Ok(value) = HeaderValue::from_str(target) {
        request.headers_mut().insert(HeaderName::from_static(PATHNAME_HEADER), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_exclusions() {
        assert!(is_excluded("/api"));
        assert!(is_excluded("/api/tables/users"));
        assert!(is_excluded("/assets/app.css"));
        assert!(is_excluded("/favicon.ico"));
        assert!(!is_excluded("/apiary"));
        assert!(!is_excluded("/dashboard"));
        assert!(!is_excluded("/"));
    }
}
