// handlers/protected/proxy.rs - ANY /api/*path relay

use axum::{
    body,
    extract::{Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::auth::{rotate, CredentialStore, RefreshOutcome, AUTH_REDIRECT_HEADER};
use crate::backend::{BackendError, ForwardRequest, ForwardResponse, FORWARDED_REQUEST_HEADERS};
use crate::error::ApiError;
use crate::state::AppState;

/// Prefix stripped before the path is appended to the backend base URL
const API_PREFIX: &str = "/api";

/// ANY /api/*path - Forward to `{API}/*path` with the session's bearer token
///
/// A downstream 401 triggers at most one rotation and one retry. When the
/// call is still unauthorized (or there was nothing to refresh with) both
/// cookies are cleared and the response carries `X-Auth-Redirect: true` for
/// the page script to act on. An unreachable backend is reported as 503.
///
/// Method, path, query and body pass through untouched. Request headers are
/// limited to [`FORWARDED_REQUEST_HEADERS`]; the browser's cookies never
/// reach the backend.
pub async fn proxy(State(state): State<AppState>, mut store: CredentialStore, request: Request) -> Response {
    let forward = match forward_request(request, state.config.api.max_request_size_bytes).await {
        Ok(forward) => forward,
        Err(e) => return e.into_response(),
    };

    match relay(&state, &mut store, &forward).await {
        Ok(response) => (store, into_response(response)).into_response(),
        Err(e @ ApiError::Unauthorized(_)) => {
            store.clear();
            let signal = [(HeaderName::from_static(AUTH_REDIRECT_HEADER), HeaderValue::from_static("true"))];
            (store, signal, e).into_response()
        }
        Err(e) => (store, e).into_response(),
    }
}

async fn relay(state: &AppState, store: &mut CredentialStore, forward: &ForwardRequest) -> Result<ForwardResponse, ApiError> {
    let response = state.backend.forward(forward, store.get_access()).await.map_err(unavailable)?;
    if response.status != StatusCode::UNAUTHORIZED {
        return Ok(response);
    }

    if store.get_refresh().is_none() {
        tracing::debug!("{} {} unauthorized with no refresh token", forward.method, forward.path_and_query);
        return Err(ApiError::unauthorized("Authentication required"));
    }

    match rotate(&state.backend, store).await {
        RefreshOutcome::Rotated => {}
        RefreshOutcome::Rejected => return Err(ApiError::unauthorized("Session expired, please sign in again")),
        RefreshOutcome::Unavailable => return Err(ApiError::service_unavailable("Server unavailable, please retry")),
    }

    let retried = state.backend.forward(forward, store.get_access()).await.map_err(unavailable)?;
    if retried.status == StatusCode::UNAUTHORIZED {
        tracing::info!("{} {} still unauthorized after refresh", forward.method, forward.path_and_query);
        return Err(ApiError::unauthorized("Session expired, please sign in again"));
    }

    Ok(retried)
}

/// Buffer the incoming request so it can be replayed on retry
async fn forward_request(request: Request, limit: usize) -> Result<ForwardRequest, ApiError> {
    let (parts, raw_body) = request.into_parts();

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or(API_PREFIX);
    let path_and_query = match path_and_query.strip_prefix(API_PREFIX) {
        Some(rest) if rest.starts_with('/') => rest.to_string(),
        Some(rest) => format!("/{}", rest),
        None => path_and_query.to_string(),
    };

    let body = body::to_bytes(raw_body, limit)
        .await
        .map_err(|_| ApiError::payload_too_large(format!("Request body exceeds {} bytes", limit)))?;

    let mut headers = HeaderMap::new();
    for name in FORWARDED_REQUEST_HEADERS {
        for value in parts.headers.get_all(&name) {
            headers.append(name.clone(), value.clone());
        }
    }

    Ok(ForwardRequest {
        method: parts.method,
        path_and_query,
        headers,
        body,
    })
}

fn unavailable(e: BackendError) -> ApiError {
    if e.is_unreachable() {
        tracing::warn!("Backend unreachable: {}", e);
        ApiError::service_unavailable("Server unavailable, please retry")
    } else {
        tracing::error!("Proxy request failed: {}", e);
        ApiError::from(e)
    }
}

fn into_response(response: ForwardResponse) -> Response {
    (response.status, response.headers, response.body).into_response()
}
