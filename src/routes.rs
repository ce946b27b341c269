use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{any, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::AUTH_REDIRECT_HEADER;
use crate::config::SecurityConfig;
use crate::handlers::{pages, protected, public};
use crate::middleware::{edge_interceptor, session_gate};
use crate::state::AppState;

/// Build the full gateway router.
///
/// Request flow for pages: edge interceptor → (session gate for the
/// protected area) → page handler. `/api/*` and `/health` skip the edge
/// interceptor and are handled by the credential endpoints or the proxy.
pub fn app(state: AppState) -> Router {
    let enable_request_logging = state.config.api.enable_request_logging;
    let cors = cors_layer(&state.config.security);

    let router = Router::new()
        // Public
        .route("/health", get(public::health))
        .merge(auth_routes(&state))
        // Protected API relay
        .route("/api/*path", any(protected::proxy))
        // Console pages
        .merge(page_routes(&state))
        .fallback(pages::not_found)
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), edge_interceptor));

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };
    let router = if enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/refresh", post(auth::refresh))
        .route(&state.config.routes.recovery, get(auth::session_refresh))
}

fn page_routes(state: &AppState) -> Router<AppState> {
    let routes = &state.config.routes;
    let landing = routes.landing.trim_end_matches('/');

    // Everything below the landing route passes the session gate first
    let protected = Router::new()
        .route(landing, get(pages::dashboard))
        .route(&format!("{}/*section", landing), get(pages::dashboard_section))
        .route_layer(middleware::from_fn_with_state(state.clone(), session_gate));

    Router::new()
        .route("/", get(pages::root))
        .route(&routes.login, get(pages::login_page))
        .route("/register", get(pages::register_page))
        .merge(protected)
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .expose_headers([HeaderName::from_static(AUTH_REDIRECT_HEADER)]),
    )
}
