//! Shop server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shop server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Base URL of the external cosmetics data provider
    pub catalog_api_base: String,
    /// Language passed to the provider on every fetch
    pub catalog_language: String,
    /// Per-request timeout for feed fetches, in seconds
    pub feed_timeout_secs: u64,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// Seconds between scheduled storefront refreshes; 0 disables the task
    pub sync_interval_secs: u64,
    /// Environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            catalog_api_base: std::env::var("CATALOG_API_BASE")
                .unwrap_or_else(|_| "https://fortnite-api.com/v2".into()),
            catalog_language: std::env::var("CATALOG_LANGUAGE").unwrap_or_else(|_| "en".into()),
            feed_timeout_secs: std::env::var("FEED_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            sync_interval_secs: std::env::var("SYNC_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(86_400),
            environment,
        })
    }
}
