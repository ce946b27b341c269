//! Console client error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway signalled that the session is gone. `login_url` carries the
    /// page to return to as `callbackUrl`.
    #[error("Session expired, sign in again at {login_url}")]
    AuthRedirect { login_url: String },

    /// Login or registration was refused
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The backend behind the gateway is down; retrying later may succeed
    #[error("Server unavailable, please retry")]
    ServiceUnavailable,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 | 413 => Self::BadRequest(message),
            404 => Self::NotFound(message),
            503 => Self::ServiceUnavailable,
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// True when the caller should send the user to the login page
    pub fn is_auth_redirect(&self) -> bool {
        matches!(self, Self::AuthRedirect { .. })
    }
}
