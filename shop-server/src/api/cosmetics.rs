//! Catalog API handlers
//!
//! GET  /cosmetics               — filtered, paginated listing
//! POST /cosmetics/sync          — pull the external feeds
//! GET  /cosmetics/new           — items flagged new by the last sync
//! GET  /cosmetics/on-sale       — items currently priced in the shop
//! GET  /cosmetics/stats/summary — catalog breakdown
//! GET  /cosmetics/{id}          — one item with bundles and shop appearances

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use shared::error::{ApiError, ApiResult};
use shared::models::{Bundle, Category, CosmeticWithVariant, ShopEntry};
use shared::response::Page;

use crate::db;
use crate::db::cosmetics::{CosmeticFilter, StatsSummary};
use crate::state::AppState;
use crate::sync;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;
const DETAIL_SHOP_APPEARANCES: i64 = 5;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    pub category: Option<Category>,
    pub rarity: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub is_new: Option<bool>,
    pub is_on_sale: Option<bool>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn page_params(limit: Option<i64>, offset: Option<i64>) -> ApiResult<(i64, i64)> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let offset = offset.unwrap_or(0);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    if offset < 0 {
        return Err(ApiError::validation("offset must not be negative"));
    }
    Ok((limit, offset))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Page<CosmeticWithVariant>>> {
    let (limit, offset) = page_params(query.limit, query.offset)?;
    let filter = CosmeticFilter {
        category: query.category,
        rarity: query.rarity,
        item_type: query.item_type,
        is_new: query.is_new,
        is_on_sale: query.is_on_sale,
        search: query.search,
    };

    let (items, total) = db::cosmetics::list(&state.pool, &filter, limit, offset)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(Page::new(items, total, limit, offset)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

pub async fn list_new(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<CosmeticWithVariant>>> {
    let (limit, offset) = page_params(query.limit, query.offset)?;
    let (items, total) = db::cosmetics::list_new(&state.pool, limit, offset)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(Page::new(items, total, limit, offset)))
}

pub async fn list_on_sale(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<CosmeticWithVariant>>> {
    let (limit, offset) = page_params(query.limit, query.offset)?;
    let (items, total) = db::cosmetics::list_on_sale(&state.pool, limit, offset)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(Page::new(items, total, limit, offset)))
}

/// Detail view: the item plus the bundles containing it and its latest
/// storefront appearances
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticDetail {
    #[serde(flatten)]
    pub cosmetic: CosmeticWithVariant,
    pub bundles: Vec<Bundle>,
    pub shop_appearances: Vec<ShopEntry>,
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CosmeticDetail>> {
    let Some(cosmetic) = db::cosmetics::find_by_id(&state.pool, &id)
        .await
        .map_err(ApiError::from)?
    else {
        return Err(ApiError::not_found("Cosmetic"));
    };

    let bundles = db::bundles::for_cosmetic(&state.pool, &id)
        .await
        .map_err(ApiError::from)?;
    let shop_appearances =
        db::shop_entries::recent_for_cosmetic(&state.pool, &id, DETAIL_SHOP_APPEARANCES)
            .await
            .map_err(ApiError::from)?;

    Ok(Json(CosmeticDetail {
        cosmetic,
        bundles,
        shop_appearances,
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub message: String,
    pub catalog_items: usize,
    pub new_items: usize,
    pub shop_entries: usize,
}

pub async fn sync(State(state): State<AppState>) -> ApiResult<Json<SyncResponse>> {
    let report = sync::sync_all(&state).await.map_err(ApiError::from)?;
    Ok(Json(SyncResponse {
        message: "Sync complete".into(),
        catalog_items: report.catalog_items,
        new_items: report.new_items,
        shop_entries: report.shop_entries,
    }))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<StatsSummary>> {
    let summary = db::cosmetics::stats(&state.pool)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_defaults_and_bounds() {
        assert_eq!(page_params(None, None).unwrap(), (50, 0));
        assert_eq!(page_params(Some(200), Some(10)).unwrap(), (200, 10));
        assert!(page_params(Some(0), None).is_err());
        assert!(page_params(Some(201), None).is_err());
        assert!(page_params(None, Some(-1)).is_err());
    }

    #[test]
    fn list_query_accepts_camel_case() {
        let q: ListQuery = serde_json::from_value(serde_json::json!({
            "category": "BR",
            "type": "Outfit",
            "isNew": true,
            "isOnSale": false,
            "search": "peely",
            "limit": 10
        }))
        .unwrap();
        assert_eq!(q.category, Some(Category::Br));
        assert_eq!(q.item_type.as_deref(), Some("Outfit"));
        assert_eq!(q.is_new, Some(true));
        assert_eq!(q.is_on_sale, Some(false));
        assert_eq!(q.limit, Some(10));
    }
}
