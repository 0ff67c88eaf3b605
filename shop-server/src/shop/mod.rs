//! Storefront assembly
//!
//! `current_shop` loads the active offers, resolves each against the
//! catalog and the viewer's ownership, and groups the tiles into themed
//! and fixed sections.

pub mod sections;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{ShopItem, ShopView};
use shared::util::next_shop_refresh;

use crate::db;
use crate::error::ServiceResult;
use sections::OwnedMap;

/// Assemble the current shop view. `user_id` personalizes ownership and
/// refundability flags; anonymous viewers get `owned: false` everywhere.
pub async fn current_shop(pool: &PgPool, user_id: Option<Uuid>) -> ServiceResult<ShopView> {
    let now = Utc::now();
    let entries = db::shop_entries::active(pool, now).await?;

    let owned: OwnedMap = match user_id {
        Some(id) => db::users::owned_active(pool, id).await?,
        None => OwnedMap::new(),
    };

    let mut items: Vec<ShopItem> = Vec::with_capacity(entries.len());
    for entry in &entries {
        if let Some(bundle_id) = entry.bundle_id {
            match db::bundles::with_items(pool, bundle_id).await? {
                Some(b) => items.push(sections::resolve_bundle_item(
                    entry,
                    &b.bundle,
                    &b.cosmetics,
                    &owned,
                )),
                None => tracing::warn!(
                    "Offer {} references missing bundle {bundle_id}",
                    entry.offer_id
                ),
            }
            continue;
        }

        let Some(item_id) = entry.single_item_id() else {
            tracing::warn!("Offer {} has no sellable reference", entry.offer_id);
            continue;
        };
        match db::cosmetics::find_by_id(pool, item_id).await? {
            Some(cosmetic) => items.push(sections::resolve_single_item(entry, &cosmetic, &owned)),
            None => tracing::warn!(
                "Offer {} references missing cosmetic {item_id}",
                entry.offer_id
            ),
        }
    }

    let total_items = items.len();
    Ok(ShopView {
        refresh_date: next_shop_refresh(now),
        sections: sections::group_items(items),
        total_items,
    })
}
