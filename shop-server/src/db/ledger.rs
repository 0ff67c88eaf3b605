//! Ownership ledger and transaction engine
//!
//! Every operation is one sqlx transaction. The user row is locked
//! (`FOR UPDATE`) before any check, so concurrent operations on the same
//! user serialize and the check-then-write sequences below stay race-free.
//! The partial unique index on active ownership is the structural backstop.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction as PgTx};
use uuid::Uuid;

use shared::error::ApiError;
use shared::models::{
    Bundle, HistoryEntry, HistoryItem, PublicUser, Transaction, TransactionType,
};

use crate::db::users::variant_image;
use crate::error::ServiceResult;

/// Price fallback for an item whose variant carries no price
const ITEM_PRICE_FALLBACK: i64 = 500;
/// Price fallback for a bundle with no stored price
const BUNDLE_PRICE_FALLBACK: i64 = 1000;

struct LockedUser {
    vbucks: i64,
}

/// Lock the user row for the remainder of the transaction
async fn lock_user(tx: &mut PgTx<'_, Postgres>, user_id: Uuid) -> ServiceResult<LockedUser> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT vbucks FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await?;
    let (vbucks,) = row.ok_or_else(|| ApiError::not_found("User"))?;
    Ok(LockedUser { vbucks })
}

/// Apply a balance delta. The non-negative guard is part of the UPDATE, so
/// the balance can never go below zero even if a caller skips its own check.
async fn adjust_balance(
    tx: &mut PgTx<'_, Postgres>,
    user_id: Uuid,
    delta: i64,
) -> ServiceResult<PublicUser> {
    let user: Option<PublicUser> = sqlx::query_as(
        "UPDATE users SET vbucks = vbucks + $2 WHERE id = $1 AND vbucks + $2 >= 0 \
         RETURNING id, email, vbucks, created_at",
    )
    .bind(user_id)
    .bind(delta)
    .fetch_optional(&mut **tx)
    .await?;
    user.ok_or_else(|| ApiError::forbidden("Insufficient vbucks balance").into())
}

async fn record_transaction(
    tx: &mut PgTx<'_, Postgres>,
    user_id: Uuid,
    cosmetic_id: Option<&str>,
    bundle_id: Option<Uuid>,
    amount: i64,
    tx_type: TransactionType,
) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO transactions (user_id, cosmetic_id, bundle_id, amount, tx_type) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(cosmetic_id)
    .bind(bundle_id)
    .bind(amount)
    .bind(tx_type)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Buy one cosmetic: balance check, debit, active ownership row and a
/// PURCHASE ledger entry, all-or-nothing.
pub async fn buy_cosmetic(
    pool: &PgPool,
    user_id: Uuid,
    cosmetic_id: &str,
) -> ServiceResult<PublicUser> {
    let mut tx = pool.begin().await?;

    let user = lock_user(&mut tx, user_id).await?;

    let price_row: Option<(Option<i64>,)> = sqlx::query_as(
        "SELECT v.price FROM cosmetics c \
         LEFT JOIN cosmetic_variants v ON v.cosmetic_id = c.id WHERE c.id = $1",
    )
    .bind(cosmetic_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (price,) = price_row.ok_or_else(|| ApiError::not_found("Cosmetic"))?;
    let price = price.unwrap_or(ITEM_PRICE_FALLBACK);

    let (already_owned,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM user_cosmetics \
         WHERE user_id = $1 AND cosmetic_id = $2 AND is_active)",
    )
    .bind(user_id)
    .bind(cosmetic_id)
    .fetch_one(&mut *tx)
    .await?;
    if already_owned {
        return Err(ApiError::conflict("Cosmetic already owned").into());
    }

    if user.vbucks < price {
        return Err(ApiError::forbidden("insufficient balance for this item").into());
    }

    let updated = adjust_balance(&mut tx, user_id, -price).await?;

    sqlx::query("INSERT INTO user_cosmetics (user_id, cosmetic_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(cosmetic_id)
        .execute(&mut *tx)
        .await?;

    record_transaction(
        &mut tx,
        user_id,
        Some(cosmetic_id),
        None,
        price,
        TransactionType::Purchase,
    )
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Buy a bundle: one debit of the bundle price, one ownership row per
/// not-yet-owned contained item (tagged with the bundle id), one PURCHASE
/// ledger entry.
pub async fn buy_bundle(pool: &PgPool, user_id: Uuid, bundle_id: Uuid) -> ServiceResult<PublicUser> {
    let mut tx = pool.begin().await?;

    let user = lock_user(&mut tx, user_id).await?;

    let bundle: Option<(Option<i64>,)> =
        sqlx::query_as("SELECT price FROM bundles WHERE id = $1")
            .bind(bundle_id)
            .fetch_optional(&mut *tx)
            .await?;
    let (bundle_price,) = bundle.ok_or_else(|| ApiError::not_found("Bundle"))?;
    let price = bundle_price.unwrap_or(BUNDLE_PRICE_FALLBACK);

    let to_buy: Vec<(String,)> = sqlx::query_as(
        "SELECT bc.cosmetic_id FROM bundle_cosmetics bc \
         WHERE bc.bundle_id = $1 AND NOT EXISTS ( \
             SELECT 1 FROM user_cosmetics uc \
             WHERE uc.user_id = $2 AND uc.cosmetic_id = bc.cosmetic_id AND uc.is_active)",
    )
    .bind(bundle_id)
    .bind(user_id)
    .fetch_all(&mut *tx)
    .await?;

    if to_buy.is_empty() {
        return Err(ApiError::conflict("All items of this bundle are already owned").into());
    }

    if user.vbucks < price {
        return Err(ApiError::forbidden("insufficient balance for this bundle").into());
    }

    let updated = adjust_balance(&mut tx, user_id, -price).await?;

    for (cosmetic_id,) in &to_buy {
        sqlx::query(
            "INSERT INTO user_cosmetics (user_id, cosmetic_id, bundle_id) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(cosmetic_id)
        .bind(bundle_id)
        .execute(&mut *tx)
        .await?;
    }

    record_transaction(
        &mut tx,
        user_id,
        None,
        Some(bundle_id),
        price,
        TransactionType::Purchase,
    )
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Refund one cosmetic: deactivate the ownership row, credit the item
/// price, append a REFUND ledger entry. Items acquired through a bundle
/// must be refunded via the bundle.
pub async fn refund_cosmetic(
    pool: &PgPool,
    user_id: Uuid,
    cosmetic_id: &str,
) -> ServiceResult<PublicUser> {
    let mut tx = pool.begin().await?;

    lock_user(&mut tx, user_id).await?;

    let owned: Option<(i64, Option<Uuid>)> = sqlx::query_as(
        "SELECT id, bundle_id FROM user_cosmetics \
         WHERE user_id = $1 AND cosmetic_id = $2 AND is_active",
    )
    .bind(user_id)
    .bind(cosmetic_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (ownership_id, via_bundle) =
        owned.ok_or_else(|| ApiError::not_found("Owned cosmetic"))?;

    if via_bundle.is_some() {
        return Err(ApiError::business_rule(
            "This item was purchased in a bundle; refund the whole bundle instead",
        )
        .into());
    }

    let (price,): (Option<i64>,) =
        sqlx::query_as("SELECT price FROM cosmetic_variants WHERE cosmetic_id = $1")
            .bind(cosmetic_id)
            .fetch_optional(&mut *tx)
            .await?
            .unwrap_or((None,));
    let price = price.unwrap_or(ITEM_PRICE_FALLBACK);

    sqlx::query("UPDATE user_cosmetics SET is_active = FALSE, refunded_at = now() WHERE id = $1")
        .bind(ownership_id)
        .execute(&mut *tx)
        .await?;

    let updated = adjust_balance(&mut tx, user_id, price).await?;

    record_transaction(
        &mut tx,
        user_id,
        Some(cosmetic_id),
        None,
        price,
        TransactionType::Refund,
    )
    .await?;

    tx.commit().await?;
    Ok(updated)
}

/// Refund a bundle: deactivate every still-active item acquired through
/// it and credit exactly what the original purchase debited.
pub async fn refund_bundle(
    pool: &PgPool,
    user_id: Uuid,
    bundle_id: Uuid,
) -> ServiceResult<PublicUser> {
    let mut tx = pool.begin().await?;

    lock_user(&mut tx, user_id).await?;

    let purchase: Option<(i64,)> = sqlx::query_as(
        "SELECT amount FROM transactions \
         WHERE user_id = $1 AND bundle_id = $2 AND tx_type = 'PURCHASE' \
         ORDER BY created_at DESC LIMIT 1",
    )
    .bind(user_id)
    .bind(bundle_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (refund_amount,) = purchase.ok_or_else(|| ApiError::not_found("Bundle purchase"))?;

    let deactivated = sqlx::query(
        "UPDATE user_cosmetics SET is_active = FALSE, refunded_at = now() \
         WHERE user_id = $1 AND bundle_id = $2 AND is_active",
    )
    .bind(user_id)
    .bind(bundle_id)
    .execute(&mut *tx)
    .await?;

    if deactivated.rows_affected() == 0 {
        return Err(ApiError::business_rule("No active items from this bundle remain").into());
    }

    let updated = adjust_balance(&mut tx, user_id, refund_amount).await?;

    record_transaction(
        &mut tx,
        user_id,
        None,
        Some(bundle_id),
        refund_amount,
        TransactionType::Refund,
    )
    .await?;

    tx.commit().await?;
    Ok(updated)
}

#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    id: i64,
    user_id: Uuid,
    cosmetic_id: Option<String>,
    bundle_id: Option<Uuid>,
    amount: i64,
    tx_type: TransactionType,
    created_at: DateTime<Utc>,
    cosmetic_name: Option<String>,
    cosmetic_type: Option<String>,
    cosmetic_rarity: Option<String>,
    variant_kind: Option<String>,
    variant_data: Option<serde_json::Value>,
    bundle_name: Option<String>,
    bundle_info: Option<String>,
    bundle_image_url: Option<String>,
    bundle_price: Option<i64>,
}

impl HistoryRow {
    fn into_entry(self) -> HistoryEntry {
        let cosmetic = match (&self.cosmetic_id, self.cosmetic_name) {
            (Some(id), Some(name)) => Some(HistoryItem {
                id: id.clone(),
                name,
                item_type: self.cosmetic_type,
                rarity: self.cosmetic_rarity,
                image: variant_image(self.variant_kind.as_deref(), self.variant_data),
            }),
            _ => None,
        };

        let bundle = match (self.bundle_id, self.bundle_name) {
            (Some(id), Some(name)) => Some(Bundle {
                id,
                name,
                info: self.bundle_info,
                image_url: self.bundle_image_url,
                price: self.bundle_price,
            }),
            _ => None,
        };

        HistoryEntry {
            transaction: Transaction {
                id: self.id,
                user_id: self.user_id,
                cosmetic_id: self.cosmetic_id,
                bundle_id: self.bundle_id,
                amount: self.amount,
                tx_type: self.tx_type,
                created_at: self.created_at,
            },
            cosmetic,
            bundle,
        }
    }
}

/// Full ledger of a user with resolved item/bundle display data,
/// newest first.
pub async fn history(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<HistoryEntry>> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
        "SELECT t.id, t.user_id, t.cosmetic_id, t.bundle_id, t.amount, t.tx_type, t.created_at, \
                c.name AS cosmetic_name, c.item_type AS cosmetic_type, \
                c.rarity AS cosmetic_rarity, \
                v.kind AS variant_kind, v.data AS variant_data, \
                b.name AS bundle_name, b.info AS bundle_info, \
                b.image_url AS bundle_image_url, b.price AS bundle_price \
         FROM transactions t \
         LEFT JOIN cosmetics c ON c.id = t.cosmetic_id \
         LEFT JOIN cosmetic_variants v ON v.cosmetic_id = t.cosmetic_id \
         LEFT JOIN bundles b ON b.id = t.bundle_id \
         WHERE t.user_id = $1 \
         ORDER BY t.created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(HistoryRow::into_entry).collect())
}
