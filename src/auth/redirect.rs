use axum::http::Uri;
use url::form_urlencoded;

use crate::config::RouteConfig;

/// Query parameter carrying the post-login destination
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Accept only same-origin absolute paths as redirect targets
pub fn safe_path(candidate: Option<&str>) -> Option<&str> {
    candidate.filter(|path| path.starts_with('/') && !path.starts_with("//") && !path.contains('\\'))
}

/// Path plus query of a request URI
pub fn path_and_query(uri: &Uri) -> String {
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// Login page URL, preserving `callback` when it is a usable path
pub fn login_url(login_route: &str, callback: Option<&str>) -> String {
    match safe_path(callback).filter(|path| *path != "/" && *path != login_route) {
        Some(path) => format!(
            "{}?{}",
            login_route,
            form_urlencoded::Serializer::new(String::new())
                .append_pair(CALLBACK_PARAM, path)
                .finish()
        ),
        None => login_route.to_string(),
    }
}

/// Recovery endpoint URL that returns to `path` afterwards
pub fn recovery_url(routes: &RouteConfig, path: &str, purge: bool) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("redirect", path);
    if purge {
        query.append_pair("purge", "true");
    }
    format!("{}?{}", routes.recovery, query.finish())
}
