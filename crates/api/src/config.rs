use axum::http::HeaderValue;
use cardbus_core::config::{env_or, env_string_or, ConfigError};
use cardbus_events::LifecycleConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after the server stops
    /// (default: `5`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. Cards are kept in memory when unset.
    pub database_url: Option<String>,
    /// Card lifecycle settings.
    pub lifecycle: LifecycleConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `5`                        |
    /// | `DATABASE_URL`          | unset (in-memory cards)    |
    ///
    /// plus the card variables read by [`LifecycleConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            host: env_string_or("HOST", "0.0.0.0"),
            port: env_or("PORT", 3000)?,
            cors_origins: parse_origins(&env_string_or(
                "CORS_ORIGINS",
                "http://localhost:5173",
            ))?,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30)?,
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 5)?,
            database_url,
            lifecycle: LifecycleConfig::from_env()?,
        })
    }
}

/// Split a comma-separated origin list, rejecting values that cannot be sent
/// as an `Access-Control-Allow-Origin` header.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .map_err(|e| ConfigError {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
        })
        .collect()
}
