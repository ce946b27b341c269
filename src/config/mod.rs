use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub routes: RouteConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend API, without a trailing slash
    pub api_url: String,
    pub timeout_secs: u64,
}

/// Cookie lifetimes and the freshness check tuning.
///
/// The access token lifetime is a plain setting; deployments
/// have run with both 15 minute and 1 day access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub access_token_max_age_secs: i64,
    pub refresh_token_max_age_secs: i64,
    pub secure_cookies: bool,
    /// Treat an access token as stale this many seconds before its `exp`
    pub expiry_leeway_secs: i64,
    /// Lifetime of the marker cookie that bounds recovery redirects
    pub recovery_window_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    pub login: String,
    pub landing: String,
    pub recovery: String,
    pub protected_prefixes: Vec<String>,
    pub auth_pages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Backend overrides
        if let Ok(v) = env::var("API_URL") {
            self.backend.api_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("API_TIMEOUT_SECS") {
            self.backend.timeout_secs = v.parse().unwrap_or(self.backend.timeout_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_ACCESS_TOKEN_MAX_AGE_SECS") {
            self.session.access_token_max_age_secs = v.parse().unwrap_or(self.session.access_token_max_age_secs);
        }
        if let Ok(v) = env::var("SESSION_REFRESH_TOKEN_MAX_AGE_SECS") {
            self.session.refresh_token_max_age_secs = v.parse().unwrap_or(self.session.refresh_token_max_age_secs);
        }
        if let Ok(v) = env::var("SESSION_SECURE_COOKIES") {
            self.session.secure_cookies = v.parse().unwrap_or(self.session.secure_cookies);
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_LEEWAY_SECS") {
            self.session.expiry_leeway_secs = v.parse().unwrap_or(self.session.expiry_leeway_secs);
        }
        if let Ok(v) = env::var("SESSION_RECOVERY_WINDOW_SECS") {
            self.session.recovery_window_secs = v.parse().unwrap_or(self.session.recovery_window_secs);
        }

        // Route overrides
        if let Ok(v) = env::var("ROUTES_LOGIN") {
            self.routes.login = v;
        }
        if let Ok(v) = env::var("ROUTES_LANDING") {
            self.routes.landing = v;
        }
        if let Ok(v) = env::var("ROUTES_PROTECTED_PREFIXES") {
            self.routes.protected_prefixes = split_list(&v);
        }
        if let Ok(v) = env::var("ROUTES_AUTH_PAGES") {
            self.routes.auth_pages = split_list(&v);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = split_list(&v);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                api_url: "http://localhost:4000".to_string(),
                timeout_secs: 30,
            },
            session: SessionConfig {
                access_token_max_age_secs: 15 * 60,
                refresh_token_max_age_secs: 7 * 24 * 60 * 60,
                secure_cookies: false,
                expiry_leeway_secs: 10,
                recovery_window_secs: 30,
            },
            routes: RouteConfig::default(),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                api_url: "http://backend:4000".to_string(),
                timeout_secs: 15,
            },
            session: SessionConfig {
                access_token_max_age_secs: 15 * 60,
                refresh_token_max_age_secs: 7 * 24 * 60 * 60,
                secure_cookies: true,
                expiry_leeway_secs: 30,
                recovery_window_secs: 30,
            },
            routes: RouteConfig::default(),
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            backend: BackendConfig {
                api_url: "http://backend:4000".to_string(),
                timeout_secs: 10,
            },
            session: SessionConfig {
                access_token_max_age_secs: 15 * 60,
                refresh_token_max_age_secs: 7 * 24 * 60 * 60,
                secure_cookies: true,
                expiry_leeway_secs: 30,
                recovery_window_secs: 30,
            },
            routes: RouteConfig::default(),
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    /// Development defaults pointed at a specific backend. Used by tests and
    /// by `--api-url` on the command line.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.backend.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            landing: "/dashboard".to_string(),
            recovery: "/api/auth/session-refresh".to_string(),
            protected_prefixes: vec!["/dashboard".to_string()],
            auth_pages: vec!["/login".to_string(), "/register".to_string()],
        }
    }
}

impl RouteConfig {
    /// True when `path` is, or sits below, one of the protected prefixes
    pub fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes.iter().any(|prefix| {
            path == prefix || path.starts_with(&format!("{}/", prefix.trim_end_matches('/')))
        })
    }

    pub fn is_auth_page(&self, path: &str) -> bool {
        self.auth_pages.iter().any(|page| path == page)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
