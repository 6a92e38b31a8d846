use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub session_cookie_name: String,
    pub session_ttl_hours: i64,
    pub secure_cookies: bool,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
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
        if let Some(port) = env::var("STANDUP_WEB_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Upstream overrides
        if let Ok(v) = env::var("API_URL") {
            if !v.trim().is_empty() {
                self.upstream.base_url = Some(v.trim().to_string());
            }
        }
        if let Ok(v) = env::var("API_TIMEOUT_SECS") {
            self.upstream.timeout_secs = v.parse().unwrap_or(self.upstream.timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            if !v.is_empty() {
                self.security.secret_key = Some(v);
            }
        }
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.security.session_cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_TTL_HOURS") {
            self.security.session_ttl_hours = v.parse().unwrap_or(self.security.session_ttl_hours);
        }
        if let Ok(v) = env::var("SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }

        self
    }

    /// Checks that everything needed to serve traffic is present.
    ///
    /// Development tolerates a missing `SECRET_KEY` (an ephemeral key is generated
    /// at startup); staging and production do not.
    pub fn validate(&self) -> Result<(), AppError> {
        let base_url = self
            .upstream
            .base_url
            .as_deref()
            .ok_or_else(|| AppError::Config("API_URL is required".into()))?;

        url::Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("API_URL is not a valid URL: {}", e)))?;

        if self.upstream.timeout_secs == 0 {
            return Err(AppError::Config("API_TIMEOUT_SECS must be greater than zero".into()));
        }

        if self.security.secret_key.is_none() && self.environment != Environment::Development {
            return Err(AppError::Config("SECRET_KEY is required outside development".into()));
        }

        if self.security.session_cookie_name.trim().is_empty() {
            return Err(AppError::Config("SESSION_COOKIE_NAME must not be empty".into()));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            upstream: UpstreamConfig {
                base_url: Some("http://localhost:8000".to_string()),
                timeout_secs: 10,
            },
            security: SecurityConfig {
                secret_key: None,
                session_cookie_name: "standup_session".to_string(),
                session_ttl_hours: 24 * 7, // 1 week
                secure_cookies: false,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            upstream: UpstreamConfig {
                base_url: None,
                timeout_secs: 10,
            },
            security: SecurityConfig {
                secret_key: None,
                session_cookie_name: "standup_session".to_string(),
                session_ttl_hours: 24,
                secure_cookies: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            upstream: UpstreamConfig {
                base_url: None,
                timeout_secs: 10,
            },
            security: SecurityConfig {
                secret_key: None,
                session_cookie_name: "standup_session".to_string(),
                session_ttl_hours: 12,
                secure_cookies: true,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
