//! Cookie-held JWT sessions: storage, freshness, rotation and classification

pub mod cookies;
pub mod redirect;
pub mod refresh;
pub mod session;
pub mod token;

pub use cookies::{CookieSettings, CredentialStore, InvalidTokenValue, ACCESS_COOKIE_NAME, REFRESH_COOKIE_NAME};
pub use refresh::{rotate, RefreshOutcome};
pub use session::{Session, SessionState};

/// Response header telling the browser-side caller to navigate to login
pub const AUTH_REDIRECT_HEADER: &str = "x-auth-redirect";
