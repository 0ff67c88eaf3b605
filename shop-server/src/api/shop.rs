//! Storefront API handlers
//!
//! GET  /shop/current — assembled shop view, personalized when a userId is given
//! POST /shop/buy     — purchase one cosmetic or bundle (authenticated)
//! POST /shop/refund  — refund one cosmetic or bundle (authenticated)
//! GET  /shop/history — the caller's transaction ledger (authenticated)

use axum::Extension;
use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::error::{ApiError, ApiResult};
use shared::models::{HistoryEntry, PublicUser, ShopView};

use crate::auth::UserIdentity;
use crate::state::AppState;
use crate::{db, shop};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentShopQuery {
    pub user_id: Option<Uuid>,
}

pub async fn current(
    State(state): State<AppState>,
    Query(query): Query<CurrentShopQuery>,
) -> ApiResult<Json<ShopView>> {
    let view = shop::current_shop(&state.pool, query.user_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(view))
}

/// Exactly one of the two ids must be set
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerRequest {
    pub cosmetic_id: Option<String>,
    pub bundle_id: Option<Uuid>,
}

enum LedgerTarget {
    Cosmetic(String),
    Bundle(Uuid),
}

fn ledger_target(req: LedgerRequest) -> ApiResult<LedgerTarget> {
    match (req.cosmetic_id, req.bundle_id) {
        (Some(id), None) => Ok(LedgerTarget::Cosmetic(id)),
        (None, Some(id)) => Ok(LedgerTarget::Bundle(id)),
        _ => Err(ApiError::validation(
            "Provide either cosmeticId or bundleId",
        )),
    }
}

#[derive(Serialize)]
pub struct LedgerResponse {
    pub success: bool,
    pub user: PublicUser,
}

pub async fn buy(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<LedgerRequest>,
) -> ApiResult<Json<LedgerResponse>> {
    let user = match ledger_target(req)? {
        LedgerTarget::Cosmetic(id) => db::ledger::buy_cosmetic(&state.pool, identity.user_id, &id)
            .await
            .map_err(ApiError::from)?,
        LedgerTarget::Bundle(id) => db::ledger::buy_bundle(&state.pool, identity.user_id, id)
            .await
            .map_err(ApiError::from)?,
    };
    Ok(Json(LedgerResponse {
        success: true,
        user,
    }))
}

pub async fn refund(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(req): Json<LedgerRequest>,
) -> ApiResult<Json<LedgerResponse>> {
    let user = match ledger_target(req)? {
        LedgerTarget::Cosmetic(id) => {
            db::ledger::refund_cosmetic(&state.pool, identity.user_id, &id)
                .await
                .map_err(ApiError::from)?
        }
        LedgerTarget::Bundle(id) => db::ledger::refund_bundle(&state.pool, identity.user_id, id)
            .await
            .map_err(ApiError::from)?,
    };
    Ok(Json(LedgerResponse {
        success: true,
        user,
    }))
}

pub async fn history(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let entries = db::ledger::history(&state.pool, identity.user_id)
        .await
        .map_err(ApiError::from)?;
    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_target_requires_exactly_one_id() {
        assert!(matches!(
            ledger_target(LedgerRequest {
                cosmetic_id: Some("CID_1".into()),
                bundle_id: None,
            }),
            Ok(LedgerTarget::Cosmetic(_))
        ));
        assert!(matches!(
            ledger_target(LedgerRequest {
                cosmetic_id: None,
                bundle_id: Some(Uuid::new_v4()),
            }),
            Ok(LedgerTarget::Bundle(_))
        ));
        assert!(ledger_target(LedgerRequest::default()).is_err());
        assert!(
            ledger_target(LedgerRequest {
                cosmetic_id: Some("CID_1".into()),
                bundle_id: Some(Uuid::new_v4()),
            })
            .is_err()
        );
    }
}
