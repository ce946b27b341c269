// handlers/pages.rs - Console page handlers
//
// The edge interceptor has already run for every route here. /dashboard and
// everything below it also sit behind the session gate, which guarantees a
// backend-confirmed Session in the request extensions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
    Extension,
};
use serde::Deserialize;

use crate::auth::{redirect::safe_path, Session};
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

impl CallbackQuery {
    /// Post-login destination, falling back to the landing route
    fn target<'a>(&'a self, landing: &'a str) -> &'a str {
        safe_path(self.callback_url.as_deref()).unwrap_or(landing)
    }
}

/// GET / - The console root only ever forwards to the landing route
pub async fn root(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.config.routes.landing)
}

/// GET /login
pub async fn login_page(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Html<String> {
    views::login_page(query.target(&state.config.routes.landing))
}

/// GET /register
pub async fn register_page(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Html<String> {
    views::register_page(query.target(&state.config.routes.landing))
}

/// GET /dashboard
pub async fn dashboard(Extension(session): Extension<Session>) -> Html<String> {
    views::dashboard_page(&session, None)
}

/// GET /dashboard/*section
pub async fn dashboard_section(Extension(session): Extension<Session>, Path(section): Path<String>) -> Html<String> {
    views::dashboard_page(&session, Some(&section))
}

pub async fn not_found() -> (StatusCode, Html<String>) {
    views::not_found()
}
