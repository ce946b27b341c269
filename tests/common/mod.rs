#![allow(dead_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use console_gateway::config::AppConfig;
use console_gateway::{app, AppState};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{header, redirect::Policy, Response};
use serde_json::json;
use wiremock::MockServer;

pub struct TestGateway {
    pub base_url: String,
    /// Mock backend API. `None` when the gateway points at a dead port.
    pub backend: Option<MockServer>,
    pub client: reqwest::Client,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn backend(&self) -> &MockServer {
        self.backend.as_ref().expect("gateway was started without a mock backend")
    }

    /// GET with the given raw `Cookie` header
    pub async fn get_with_cookies(&self, path: &str, cookies: &str) -> Result<Response> {
        let mut request = self.client.get(self.url(path));
        if !cookies.is_empty() {
            request = request.header(header::COOKIE, cookies);
        }
        Ok(request.send().await?)
    }

    pub async fn post_with_cookies(&self, path: &str, cookies: &str) -> Result<Response> {
        let mut request = self.client.post(self.url(path));
        if !cookies.is_empty() {
            request = request.header(header::COOKIE, cookies);
        }
        Ok(request.send().await?)
    }
}

/// Gateway in front of a fresh wiremock backend
pub async fn spawn_gateway() -> Result<TestGateway> {
    let backend = MockServer::start().await;
    let config = AppConfig::development().with_api_url(backend.uri());
    let mut gateway = start(config).await?;
    gateway.backend = Some(backend);
    Ok(gateway)
}

/// Gateway whose backend refuses connections
pub async fn spawn_gateway_unreachable() -> Result<TestGateway> {
    let dead_port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let mut config = AppConfig::development().with_api_url(format!("http://127.0.0.1:{}", dead_port));
    config.backend.timeout_secs = 2;
    start(config).await
}

async fn start(config: AppConfig) -> Result<TestGateway> {
    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind {}", port))?;

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app(state)).await {
            eprintln!("test gateway stopped: {}", e);
        }
    });

    let client = reqwest::Client::builder()
        .redirect(Policy::none())
        .timeout(Duration::from_secs(10))
        .build()?;

    Ok(TestGateway {
        base_url,
        backend: None,
        client,
    })
}

/// HS256 JWT expiring `ttl_secs` from now (negative for already expired)
pub fn token(subject: &str, ttl_secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + ttl_secs;
    encode(
        &Header::default(),
        &json!({ "sub": subject, "exp": exp }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("encode test token")
}

pub fn fresh_token(subject: &str) -> String {
    token(subject, 600)
}

pub fn expired_token(subject: &str) -> String {
    token(subject, -600)
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// All `Set-Cookie` header values
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// Full `Set-Cookie` line for `name`, if the response sets it
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response).into_iter().find(|cookie| cookie.starts_with(&prefix))
}

/// Value written for cookie `name`
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookie(response, name).and_then(|cookie| {
        cookie
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, value)| value.to_string())
    })
}

/// True when the response expires `name`
pub fn clears_cookie(response: &Response, name: &str) -> bool {
    set_cookie(response, name).is_some_and(|cookie| cookie.contains("Max-Age=0"))
}

/// Turn the session cookies a response wrote into a `Cookie` request header
pub fn cookie_header(response: &Response) -> String {
    set_cookies(response)
        .iter()
        .filter(|cookie| !cookie.contains("Max-Age=0"))
        .filter_map(|cookie| cookie.split(';').next())
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn user_json(email: &str) -> serde_json::Value {
    json!({
        "id": 42,
        "email": email,
        "firstName": "Ada",
        "lastName": "Lovelace",
        "role": "admin"
    })
}
