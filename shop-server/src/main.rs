//! shop-server — cosmetics catalog and storefront service
//!
//! Long-running service that:
//! - Ingests an external cosmetics provider (catalog, new items, storefront)
//! - Serves the assembled daily shop with themed sections
//! - Runs the vbucks purchase/refund ledger (JWT authenticated)

mod api;
mod auth;
mod config;
mod db;
mod error;
mod feed;
mod shop;
mod state;
mod sync;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting shop-server (env: {})", config.environment);

    // Initialize application state
    let state = AppState::new(&config).await?;

    let app = api::create_router(state.clone());

    // Periodic storefront refresh
    if config.sync_interval_secs > 0 {
        let sync_state = state.clone();
        let period = std::time::Duration::from_secs(config.sync_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match sync::sync_shop_only(&sync_state).await {
                    Ok(count) => tracing::info!("Scheduled shop sync done ({count} entries)"),
                    Err(e) => tracing::error!("Scheduled shop sync failed: {e:?}"),
                }
            }
        });
    } else {
        tracing::info!("Scheduled shop sync disabled (SYNC_INTERVAL_SECS=0)");
    }

    // Start HTTP server
    let http_addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("shop-server HTTP listening on {http_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
