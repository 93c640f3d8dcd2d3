use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long a pending data-access request stays open before lazy
    /// expiry (default: `7` days).
    pub request_ttl_days: i64,
    /// Pricing cache entry lifetime in seconds (default: `300`).
    pub pricing_cache_ttl_secs: u64,
    /// Default currency for zeroed balance summaries (default: `USD`).
    pub default_currency: String,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `REQUEST_TTL_DAYS`        | `7`                     |
    /// | `PRICING_CACHE_TTL_SECS`  | `300`                   |
    /// | `DEFAULT_CURRENCY`        | `USD`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let request_ttl_days: i64 = std::env::var("REQUEST_TTL_DAYS")
            .unwrap_or_else(|_| hrkey_core::request::DEFAULT_REQUEST_TTL_DAYS.to_string())
            .parse()
            .expect("REQUEST_TTL_DAYS must be a valid i64");

        let pricing_cache_ttl_secs: u64 = std::env::var("PRICING_CACHE_TTL_SECS")
            .unwrap_or_else(|_| {
                hrkey_db::pricing::DEFAULT_PRICING_CACHE_TTL
                    .as_secs()
                    .to_string()
            })
            .parse()
            .expect("PRICING_CACHE_TTL_SECS must be a valid u64");

        let default_currency =
            std::env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "USD".into());

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            request_ttl_days,
            pricing_cache_ttl_secs,
            default_currency,
            jwt,
        }
    }
}
