//! User API handlers
//!
//! GET /users                — page-numbered account listing
//! GET /users/{id}           — one account
//! GET /users/{id}/cosmetics — the account's active locker

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use shared::error::{ApiError, ApiResult};
use shared::models::PublicUser;
use shared::response::Paginated;

use crate::db;
use crate::db::users::OwnedCosmetic;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Paginated<PublicUser>>> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if page < 1 {
        return Err(ApiError::validation("page must be at least 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    let (users, total) = db::users::list(&state.pool, page, limit)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(Paginated::new(users, page, limit, total)))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PublicUser>> {
    let Some(user) = db::users::find_public(&state.pool, id)
        .await
        .map_err(ApiError::from)?
    else {
        return Err(ApiError::not_found("User"));
    };
    Ok(Json(user))
}

pub async fn cosmetics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<OwnedCosmetic>>> {
    if db::users::find_public(&state.pool, id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("User"));
    }
    let owned = db::users::owned_cosmetics(&state.pool, id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(owned))
}
