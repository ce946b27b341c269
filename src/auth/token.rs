//! Unverified expiry peek for access tokens.
//!
//! The signature is NOT checked here. The result only decides whether to
//! refresh before asking the backend; the backend remains the authority on
//! whether a token is valid.

use chrono::Utc;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    /// Not a JWT we can read, or no `exp` claim
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<f64>,
}

/// Freshness of `token` right now, treating it as stale `leeway_secs` early
pub fn freshness(token: &str, leeway_secs: i64) -> Freshness {
    freshness_at(token, leeway_secs, Utc::now().timestamp())
}

pub fn freshness_at(token: &str, leeway_secs: i64, now: i64) -> Freshness {
    match peek_expiry(token) {
        Some(exp) if exp - (leeway_secs as f64) > now as f64 => Freshness::Fresh,
        Some(_) => Freshness::Stale,
        None => Freshness::Unknown,
    }
}

/// Only a readable, past `exp` makes a token stale; anything we cannot
/// read is left for the backend to judge.
pub fn is_fresh(token: &str, leeway_secs: i64) -> bool {
    freshness(token, leeway_secs) != Freshness::Stale
}

fn peek_expiry(token: &str) -> Option<f64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    match decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => data.claims.exp,
        Err(e) => {
            tracing::debug!("Access token is not a readable JWT: {}", e);
            None
        }
    }
}
