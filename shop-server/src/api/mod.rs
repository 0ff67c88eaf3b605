//! API routes for the shop server

pub mod auth;
pub mod cosmetics;
pub mod health;
pub mod shop;
pub mod users;

use axum::routing::{get, post};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::state::AppState;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Account endpoints (no auth)
    let accounts = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    // Catalog browsing and ingestion
    let catalog = Router::new()
        .route("/cosmetics", get(cosmetics::list))
        .route("/cosmetics/sync", post(cosmetics::sync))
        .route("/cosmetics/new", get(cosmetics::list_new))
        .route("/cosmetics/on-sale", get(cosmetics::list_on_sale))
        .route("/cosmetics/featured", get(cosmetics::list_on_sale))
        .route("/cosmetics/stats/summary", get(cosmetics::stats))
        .route("/cosmetics/{id}", get(cosmetics::get_one));

    // Storefront: viewing is public, the ledger requires a token
    let storefront = Router::new()
        .route("/shop/buy", post(shop::buy))
        .route("/shop/refund", post(shop::refund))
        .route("/shop/history", get(shop::history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route("/shop/current", get(shop::current));

    let users = Router::new()
        .route("/users", get(users::list))
        .route("/users/{id}", get(users::get_one))
        .route("/users/{id}/cosmetics", get(users::cosmetics));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(accounts)
        .merge(catalog)
        .merge(storefront)
        .merge(users)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
