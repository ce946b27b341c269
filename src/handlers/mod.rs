// handlers/mod.rs - Handler tiers
//
// Public (no session) → Pages (edge interceptor, session gate on the
// protected area) → Protected (cookie session, relayed to the backend)
//
// Declare the tiers
pub mod pages;     // Server-rendered console pages (/, /login, /register, /dashboard/*)
pub mod protected; // Cookie-authenticated relay to the backend (/api/*)
pub mod public;    // No session required (/health, /api/auth/*)

// TIER LAYOUT:
//
// src/handlers/
// ├── mod.rs              ← This file
// ├── pages.rs            ← Console page handlers
// ├── public/
// │   ├── health.rs       ← GET /health
// │   └── auth/           ← Credential endpoints and session recovery
// └── protected/
//     └── proxy.rs        ← ANY /api/{path}
//
// Routes are assembled in routes.rs; middleware ordering lives there too.
