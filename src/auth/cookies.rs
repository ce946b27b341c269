//! Credential store backed by the `access_token` / `refresh_token` cookies.
//!
//! This is the only place that reads or writes the session cookies. Reads
//! come from the incoming `Cookie` header; writes are staged on the store and
//! emitted as `Set-Cookie` headers when the store is returned as part of a
//! response. Both token cookies are always written together.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use thiserror::Error;

use crate::backend::TokenPair;
use crate::config::SessionConfig;
use crate::state::AppState;

pub const ACCESS_COOKIE_NAME: &str = "access_token";
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";
/// Short-lived marker left by a successful recovery, see `handlers::public::auth::recovery`
pub const RECOVERY_COOKIE_NAME: &str = "session_recovery";

/// Cookie attributes derived from [`SessionConfig`]
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub access_max_age: i64,
    pub refresh_max_age: i64,
    pub recovery_max_age: i64,
}

impl From<&SessionConfig> for CookieSettings {
    fn from(config: &SessionConfig) -> Self {
        Self {
            secure: config.secure_cookies,
            access_max_age: config.access_token_max_age_secs,
            refresh_max_age: config.refresh_token_max_age_secs,
            recovery_max_age: config.recovery_window_secs,
        }
    }
}

/// A token that cannot be written as a cookie value
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{cookie} value is not a valid cookie value")]
pub struct InvalidTokenValue {
    pub cookie: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenWrite {
    Set(TokenPair),
    Clear,
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    settings: CookieSettings,
    access: Option<String>,
    refresh: Option<String>,
    recovered: bool,
    token_write: Option<TokenWrite>,
    recovery_write: Option<bool>,
}

impl CredentialStore {
    pub fn from_headers(headers: &HeaderMap, settings: &CookieSettings) -> Self {
        Self {
            settings: settings.clone(),
            access: get_cookie(headers, ACCESS_COOKIE_NAME).map(str::to_string),
            refresh: get_cookie(headers, REFRESH_COOKIE_NAME).map(str::to_string),
            recovered: get_cookie(headers, RECOVERY_COOKIE_NAME).is_some(),
            token_write: None,
            recovery_write: None,
        }
    }

    pub fn get_access(&self) -> Option<&str> {
        self.access.as_deref()
    }

    pub fn get_refresh(&self) -> Option<&str> {
        self.refresh.as_deref()
    }

    pub fn has_tokens(&self) -> bool {
        self.access.is_some() || self.refresh.is_some()
    }

    /// Replace both tokens. Nothing is staged unless both are valid cookie values.
    pub fn set(&mut self, access: &str, refresh: &str) -> Result<(), InvalidTokenValue> {
        if !is_cookie_value(access) {
            return Err(InvalidTokenValue { cookie: ACCESS_COOKIE_NAME });
        }
        if !is_cookie_value(refresh) {
            return Err(InvalidTokenValue { cookie: REFRESH_COOKIE_NAME });
        }

        self.access = Some(access.to_string());
        self.refresh = Some(refresh.to_string());
        self.token_write = Some(TokenWrite::Set(TokenPair {
            access_token: access.to_string(),
            refresh_token: refresh.to_string(),
        }));
        Ok(())
    }

    /// Expire both tokens and the recovery marker
    pub fn clear(&mut self) {
        self.access = None;
        self.refresh = None;
        self.token_write = Some(TokenWrite::Clear);
        if self.recovered || self.recovery_write == Some(true) {
            self.recovery_write = Some(false);
        }
        self.recovered = false;
    }

    /// True while the marker from a recent successful recovery is live
    pub fn recently_recovered(&self) -> bool {
        self.recovered
    }

    pub fn mark_recovered(&mut self) {
        self.recovered = true;
        self.recovery_write = Some(true);
    }

    /// Whether any `Set-Cookie` header will be emitted
    pub fn is_dirty(&self) -> bool {
        self.token_write.is_some() || self.recovery_write.is_some()
    }

    /// Rewrite the `Cookie` header of an in-flight request so that handlers
    /// further down see the current tokens.
    pub fn apply_to_request(&self, headers: &mut HeaderMap) {
        let mut pairs: Vec<String> = Vec::new();

        for value in headers.get_all(header::COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            for pair in value.split(';') {
                let pair = pair.trim();
                let name = pair.split_once('=').map(|(n, _)| n.trim()).unwrap_or(pair);
                if !pair.is_empty() && name != ACCESS_COOKIE_NAME && name != REFRESH_COOKIE_NAME {
                    pairs.push(pair.to_string());
                }
            }
        }

        if let Some(access) = &self.access {
            pairs.push(format!("{}={}", ACCESS_COOKIE_NAME, access));
        }
        if let Some(refresh) = &self.refresh {
            pairs.push(format!("{}={}", REFRESH_COOKIE_NAME, refresh));
        }

        headers.remove(header::COOKIE);
        if pairs.is_empty() {
            return;
        }
        match HeaderValue::from_str(&pairs.join("; ")) {
            Ok(value) => {
                headers.insert(header::COOKIE, value);
            }
            Err(e) => tracing::warn!("Could not rebuild Cookie header: {}", e),
        }
    }

    /// `Set-Cookie` values for every staged mutation
    pub fn set_cookie_headers(&self) -> Vec<HeaderValue> {
        let mut values = Vec::new();

        match &self.token_write {
            Some(TokenWrite::Set(pair)) => {
                values.push(self.cookie(ACCESS_COOKIE_NAME, &pair.access_token, self.settings.access_max_age));
                values.push(self.cookie(REFRESH_COOKIE_NAME, &pair.refresh_token, self.settings.refresh_max_age));
            }
            Some(TokenWrite::Clear) => {
                values.push(self.cookie(ACCESS_COOKIE_NAME, "", 0));
                values.push(self.cookie(REFRESH_COOKIE_NAME, "", 0));
            }
            None => {}
        }

        match self.recovery_write {
            Some(true) => values.push(self.cookie(RECOVERY_COOKIE_NAME, "1", self.settings.recovery_max_age)),
            Some(false) => values.push(self.cookie(RECOVERY_COOKIE_NAME, "", 0)),
            None => {}
        }

        values.into_iter().flatten().collect()
    }

    fn cookie(&self, name: &str, value: &str, max_age: i64) -> Option<HeaderValue> {
        let secure = if self.settings.secure { "; Secure" } else { "" };
        let raw = format!("{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{}", name, value, max_age.max(0), secure);

        HeaderValue::from_str(&raw)
            .map_err(|_| tracing::error!("Refusing to write cookie '{}' with an invalid value", name))
            .ok()
    }
}

impl IntoResponseParts for CredentialStore {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for value in self.set_cookie_headers() {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
        Ok(res)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CredentialStore {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(CredentialStore::from_headers(&parts.headers, state.cookie_settings()))
    }
}

/// Non-empty and made only of RFC 6265 cookie-octets
fn is_cookie_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
}

/// Read a single cookie from the request headers. Empty values count as absent.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}
