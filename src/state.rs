use std::sync::Arc;

use crate::auth::CookieSettings;
use crate::backend::{BackendClient, BackendError};
use crate::config::AppConfig;

/// Shared state handed to every handler and middleware
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    cookies: Arc<CookieSettings>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, BackendError> {
        let backend = BackendClient::new(&config.backend)?;
        let cookies = CookieSettings::from(&config.session);

        Ok(Self {
            config: Arc::new(config),
            backend,
            cookies: Arc::new(cookies),
        })
    }

    pub fn cookie_settings(&self) -> &CookieSettings {
        &self.cookies
    }
}
