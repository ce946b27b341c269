//! HTTP client for the backend API
//!
//! Every backend call made by the gateway goes through [`BackendClient`]:
//! the credential endpoints, the whoami check of the session gate, token
//! rotation, and verbatim forwarding for the request proxy.

pub mod error;
pub mod types;

pub use error::BackendError;
pub use types::{AuthPayload, LoginRequest, RefreshedTokens, RegisterRequest, TokenPair, User};

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, StatusCode};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::config::BackendConfig;
use types::RefreshRequest;

/// End-to-end request headers relayed to the backend. Hop-by-hop headers,
/// `Cookie` and `Authorization` stay behind; the bearer comes from the session.
pub const FORWARDED_REQUEST_HEADERS: [header::HeaderName; 10] = [
    header::CONTENT_TYPE,
    header::ACCEPT,
    header::ACCEPT_LANGUAGE,
    header::IF_MATCH,
    header::IF_NONE_MATCH,
    header::IF_MODIFIED_SINCE,
    header::IF_UNMODIFIED_SINCE,
    header::RANGE,
    header::HeaderName::from_static("prefer"),
    header::HeaderName::from_static("x-request-id"),
];

/// Response headers copied from the backend onto proxied responses
const FORWARDED_RESPONSE_HEADERS: [header::HeaderName; 3] =
    [header::CONTENT_TYPE, header::CONTENT_DISPOSITION, header::CACHE_CONTROL];

/// A request to relay to the backend, kept cheap to clone for the retry
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Backend-relative path including any query string, e.g. `/tables/users?page=2`
    pub path_and_query: String,
    /// Only names from [`FORWARDED_REQUEST_HEADERS`]
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A fully buffered backend response
#[derive(Debug, Clone)]
pub struct ForwardResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("console-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Request)?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, access_token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        request
    }

    /// POST /auth/login
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthPayload, BackendError> {
        let response = self.request(Method::POST, "/auth/login", None).json(credentials).send().await?;
        AuthPayload::from_response(read_json(response).await?)
    }

    /// POST /auth/register
    pub async fn register(&self, registration: &RegisterRequest) -> Result<AuthPayload, BackendError> {
        let response = self.request(Method::POST, "/auth/register", None).json(registration).send().await?;
        AuthPayload::from_response(read_json(response).await?)
    }

    /// POST /auth/refresh
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, BackendError> {
        let response = self
            .request(Method::POST, "/auth/refresh", None)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        RefreshedTokens::from_response(read_json(response).await?)
    }

    /// POST /auth/logout. Callers treat this as best-effort.
    pub async fn logout(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self.request(Method::POST, "/auth/logout", Some(access_token)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(BackendError::Status { status, body: Value::Null })
        }
    }

    /// GET /users/me
    pub async fn current_user(&self, access_token: &str) -> Result<User, BackendError> {
        let response = self.request(Method::GET, "/users/me", Some(access_token)).send().await?;
        let value = types::unwrap_envelope(read_json(response).await?);
        serde_json::from_value(value).map_err(|e| BackendError::Malformed(format!("user record: {}", e)))
    }

    /// Relay a request verbatim, buffering the response
    pub async fn forward(&self, forward: &ForwardRequest, access_token: Option<&str>) -> Result<ForwardResponse, BackendError> {
        let mut request = self.request(forward.method.clone(), &forward.path_and_query, access_token);

        request = request.headers(forward.headers.clone());
        if !forward.body.is_empty() {
            request = request.body(forward.body.clone());
        }

        let response = request.send().await?;
        let status = response.status();

        let mut headers = HeaderMap::new();
        for name in FORWARDED_RESPONSE_HEADERS {
            if let Some(value) = response.headers().get(&name) {
                headers.insert(name, value.clone());
            }
        }

        let body = response.bytes().await?;

        Ok(ForwardResponse { status, headers, body })
    }

    /// Reachability probe for the health endpoint. Any HTTP answer counts.
    pub async fn probe(&self) -> Result<(), BackendError> {
        self.request(Method::GET, "/health", None).send().await?;
        Ok(())
    }
}

/// Decode a JSON body, turning non-2xx statuses into [`BackendError::Status`]
async fn read_json(response: Response) -> Result<Value, BackendError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        return Err(BackendError::Status { status, body });
    }

    serde_json::from_slice(&bytes).map_err(|e| BackendError::Malformed(e.to_string()))
}
