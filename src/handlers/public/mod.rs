// handlers/public/mod.rs - Public handlers (no session required)
//
// Security Level: None. The auth endpoints read and write the session
// cookies but never require a valid session to be called.
// Route Prefix: /health, /api/auth/*
// Middleware: none (the edge interceptor skips /api and /health)

pub mod auth;
pub mod health;

pub use auth::*;
pub use health::health;
