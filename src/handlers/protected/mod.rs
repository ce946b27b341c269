// handlers/protected/mod.rs - Cookie-authenticated handlers
//
// Security Level: session cookies, resolved to a bearer token per call
// Route Prefix: /api/* (everything not claimed by /api/auth/*)
// Middleware: none; the proxy rotates and signals X-Auth-Redirect itself

pub mod proxy;

pub use proxy::proxy;
