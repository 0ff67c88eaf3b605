//! Application state for the shop server

use sqlx::PgPool;

use crate::config::Config;
use crate::feed::FeedClient;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// External cosmetics feed client
    pub feed: FeedClient,
    /// JWT secret for user authentication
    pub jwt_secret: String,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let feed = FeedClient::new(config)?;

        Ok(Self {
            pool,
            feed,
            jwt_secret: config.jwt_secret.clone(),
        })
    }
}
