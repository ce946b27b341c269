//! Console client
//!
//! Talks to the gateway the way the console's page scripts do: it holds the
//! session cookies, sends data calls through `/api/*`, and turns the
//! gateway's `X-Auth-Redirect` signal (or a bare 401) into a login
//! navigation that remembers the current page.

pub mod context;
pub mod error;

pub use context::SessionContext;
pub use error::ClientError;

use std::time::Duration;

use reqwest::{header, redirect::Policy, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};

use crate::auth::{redirect::login_url, AUTH_REDIRECT_HEADER};
use crate::backend::{types::unwrap_envelope, RegisterRequest, User};

pub struct ConsoleClient {
    client: Client,
    base_url: String,
    login_route: String,
    current_path: String,
    context: SessionContext,
}

impl ConsoleClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Configuration(format!("not an http(s) URL: {}", base_url)));
        }

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("console-gateway-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            login_route: "/login".to_string(),
            current_path: "/".to_string(),
            context: SessionContext::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionContext {
        &self.context
    }

    /// Record the page the user is on; it becomes the `callbackUrl` of any
    /// login redirect.
    pub fn navigate(&mut self, path: impl Into<String>) {
        self.current_path = path.into();
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Sign in and load the session
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User, ClientError> {
        let request = self
            .http(Method::POST, "/api/auth/login")
            .json(&json!({ "email": email, "password": password }));
        self.authenticate(request).await
    }

    /// Create an account, which also signs in
    pub async fn register(&mut self, registration: &RegisterRequest) -> Result<&User, ClientError> {
        let request = self.http(Method::POST, "/api/auth/register").json(registration);
        self.authenticate(request).await
    }

    async fn authenticate(&mut self, request: RequestBuilder) -> Result<&User, ClientError> {
        let response = request.send().await?;
        match response.status() {
            StatusCode::UNAUTHORIZED => {
                self.context.reset();
                return Err(ClientError::InvalidCredentials);
            }
            status if !status.is_success() => return Err(error_from(response).await),
            _ => {}
        }

        self.load_session().await?;
        self.context.user().ok_or(ClientError::InvalidCredentials)
    }

    /// Ask the backend who we are. An absent session is not an error.
    pub async fn load_session(&mut self) -> Result<&SessionContext, ClientError> {
        match self.get("/users/me").await {
            Ok(value) => {
                let user: User = serde_json::from_value(unwrap_envelope(value))?;
                self.context.establish(user);
            }
            Err(ClientError::AuthRedirect { .. }) => self.context.reset(),
            Err(e) => return Err(e),
        }
        Ok(&self.context)
    }

    pub async fn get(&mut self, path: &str) -> Result<Value, ClientError> {
        self.request(Method::GET, path, None).await
    }

    /// Call `/api{path}` through the gateway proxy
    pub async fn request(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Value, ClientError> {
        let mut request = self.http(method, &format!("/api{}", path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let signalled = response
            .headers()
            .get(AUTH_REDIRECT_HEADER)
            .is_some_and(|value| value.as_bytes() == b"true");
        if signalled || response.status() == StatusCode::UNAUTHORIZED {
            self.context.reset();
            return Err(ClientError::AuthRedirect {
                login_url: login_url(&self.login_route, Some(&self.current_path)),
            });
        }

        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// End the session. Local state is reset even when the call fails.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let result = self.http(Method::POST, "/api/auth/logout").send().await;
        self.context.reset();

        let response = result?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from(response).await)
        }
    }

    fn http(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json")
    }
}

/// Map an error response, preferring the gateway's `error` message
async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| if text.is_empty() { status.to_string() } else { text });

    ClientError::from_status(status, message)
}
