//! Backend client error types

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached at all (refused, timed out, DNS)
    #[error("Backend unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status
    #[error("Backend responded {status}")]
    Status { status: StatusCode, body: Value },

    /// 2xx response that does not carry what the caller needs
    #[error("Malformed backend response: {0}")]
    Malformed(String),

    /// Any other transport failure
    #[error("Backend request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl BackendError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, BackendError::Unreachable(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Status { status, .. } if *status == StatusCode::UNAUTHORIZED)
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            BackendError::Unreachable(err)
        } else {
            BackendError::Request(err)
        }
    }
}
