use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::api::Gateway;
use crate::config::AppConfig;
use crate::error::AppError;
use crate::session::CookieSettings;

/// Shared state for every route.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(gateway: Gateway, cookies: CookieSettings) -> Self {
        Self {
            gateway: Arc::new(gateway),
            cookies,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;

        let base_url = config
            .upstream
            .base_url
            .clone()
            .ok_or_else(|| AppError::Config("API_URL is required".into()))?;
        let gateway = Gateway::new(base_url, config.upstream.timeout())?;

        let cookies = CookieSettings::new(
            config.security.secret_key.as_deref(),
            config.security.session_cookie_name.clone(),
            config.security.session_ttl_hours,
            config.security.secure_cookies,
        );

        Ok(Self::new(gateway, cookies))
    }
}

// SignedCookieJar requires Key to be extractable from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookies.key.clone()
    }
}
