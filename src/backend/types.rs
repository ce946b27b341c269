use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::BackendError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Access and refresh token as issued by the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Result of `POST /auth/refresh`. The backend may or may not rotate the
/// refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Tokens from login/registration plus whatever else the backend returned
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub tokens: TokenPair,
    pub data: Value,
}

/// User record from `GET /users/me`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self.email.clone(),
        }
    }
}

/// Strip the optional `{ success, data }` envelope some backend versions use
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("success") && map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    }
}

impl AuthPayload {
    /// Split a login/register response into tokens and the remaining data
    pub fn from_response(value: Value) -> Result<Self, BackendError> {
        let Value::Object(mut map) = unwrap_envelope(value) else {
            return Err(BackendError::Malformed("expected a JSON object".to_string()));
        };

        let access_token = take_string(&mut map, "accessToken")
            .ok_or_else(|| BackendError::Malformed("missing accessToken".to_string()))?;
        let refresh_token = take_string(&mut map, "refreshToken")
            .ok_or_else(|| BackendError::Malformed("missing refreshToken".to_string()))?;

        Ok(Self {
            tokens: TokenPair { access_token, refresh_token },
            data: Value::Object(map),
        })
    }
}

impl RefreshedTokens {
    pub fn from_response(value: Value) -> Result<Self, BackendError> {
        let Value::Object(mut map) = unwrap_envelope(value) else {
            return Err(BackendError::Malformed("expected a JSON object".to_string()));
        };

        let access_token = take_string(&mut map, "accessToken")
            .ok_or_else(|| BackendError::Malformed("missing accessToken".to_string()))?;

        Ok(Self {
            access_token,
            refresh_token: take_string(&mut map, "refreshToken"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwraps_success_envelope() {
        let payload = AuthPayload::from_response(json!({
            "success": true,
            "data": { "accessToken": "a", "refreshToken": "r", "user": { "email": "x@y.z" } }
        }))
        .unwrap();

        assert_eq!(payload.tokens.access_token, "a");
        assert_eq!(payload.tokens.refresh_token, "r");
        assert_eq!(payload.data, json!({ "user": { "email": "x@y.z" } }));
    }

    #[test]
    fn test_bare_payload_is_accepted() {
        let payload = AuthPayload::from_response(json!({ "accessToken": "a", "refreshToken": "r" })).unwrap();
        assert_eq!(payload.tokens.access_token, "a");
        assert_eq!(payload.data, json!({}));
    }

    #[test]
    fn test_login_without_refresh_token_is_malformed() {
        let err = AuthPayload::from_response(json!({ "accessToken": "a" })).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_refresh_token_is_optional_on_refresh() {
        let tokens = RefreshedTokens::from_response(json!({ "accessToken": "a2" })).unwrap();
        assert_eq!(tokens.refresh_token, None);

        let err = RefreshedTokens::from_response(json!({ "success": true, "data": {} })).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));

        let err = RefreshedTokens::from_response(json!({ "accessToken": "" })).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_user_keeps_unknown_fields() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "email": "ada@example.com",
            "firstName": "Ada",
            "tenant": "acme"
        }))
        .unwrap();

        assert_eq!(user.display_name(), "Ada");
        assert_eq!(user.extra.get("tenant"), Some(&json!("acme")));
    }
}
