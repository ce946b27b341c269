// handlers/public/auth/mod.rs - Credential endpoints
//
// All of these take a CredentialStore and hand it back as part of the
// response, so every cookie change leaves through Set-Cookie.

pub mod login;    // POST /api/auth/login - credentials in, cookies out
pub mod logout;   // POST /api/auth/logout - best-effort backend logout, clear cookies
pub mod recovery; // GET /api/auth/session-refresh - rotate and return, or purge to login
pub mod refresh;  // POST /api/auth/refresh - on-demand rotation
pub mod register; // POST /api/auth/register - create account, cookies out

pub use login::login;
pub use logout::logout;
pub use recovery::{session_refresh, RecoveryQuery};
pub use refresh::refresh;
pub use register::register;
