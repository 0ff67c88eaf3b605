//! User database operations

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{Category, PublicUser, STARTING_VBUCKS, User};

use crate::error::ServiceResult;

pub async fn create(pool: &PgPool, email: &str, password_hash: &str) -> ServiceResult<PublicUser> {
    let user = sqlx::query_as(
        "INSERT INTO users (email, password, vbucks) VALUES ($1, $2, $3) \
         RETURNING id, email, vbucks, created_at",
    )
    .bind(email)
    .bind(password_hash)
    .bind(STARTING_VBUCKS)
    .fetch_one(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> ServiceResult<Option<User>> {
    let user = sqlx::query_as(
        "SELECT id, email, password, vbucks, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_public(pool: &PgPool, id: Uuid) -> ServiceResult<Option<PublicUser>> {
    let user = sqlx::query_as("SELECT id, email, vbucks, created_at FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Page of users plus the total count, 1-based page numbering
pub async fn list(pool: &PgPool, page: i64, limit: i64) -> ServiceResult<(Vec<PublicUser>, i64)> {
    let offset = (page - 1) * limit;
    let users = sqlx::query_as(
        "SELECT id, email, vbucks, created_at FROM users \
         ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    Ok((users, total))
}

/// Actively-owned cosmetic ids mapped to the bundle they came from, if any
pub async fn owned_active(
    pool: &PgPool,
    user_id: Uuid,
) -> ServiceResult<HashMap<String, Option<Uuid>>> {
    let rows: Vec<(String, Option<Uuid>)> = sqlx::query_as(
        "SELECT cosmetic_id, bundle_id FROM user_cosmetics \
         WHERE user_id = $1 AND is_active",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

/// One actively-owned cosmetic with display data, for the profile view
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCosmetic {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub category: Category,
    #[serde(skip)]
    pub kind: Option<String>,
    #[serde(skip)]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub is_new: Option<bool>,
    pub is_on_sale: Option<bool>,
    pub acquired_at: DateTime<Utc>,
    pub bundle_id: Option<Uuid>,
}

pub async fn owned_cosmetics(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<OwnedCosmetic>> {
    let mut rows: Vec<OwnedCosmetic> = sqlx::query_as(
        "SELECT c.id, c.name, c.item_type, c.rarity, c.category, \
                v.kind, v.data, NULL::TEXT AS image, v.is_new, v.is_on_sale, \
                uc.acquired_at, uc.bundle_id \
         FROM user_cosmetics uc \
         JOIN cosmetics c ON c.id = uc.cosmetic_id \
         LEFT JOIN cosmetic_variants v ON v.cosmetic_id = c.id \
         WHERE uc.user_id = $1 AND uc.is_active \
         ORDER BY uc.acquired_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    for row in &mut rows {
        row.image = variant_image(row.kind.as_deref(), row.data.take());
    }
    Ok(rows)
}

/// Display image from a stored variant payload; None when the payload is
/// absent or malformed.
pub fn variant_image(kind: Option<&str>, data: Option<serde_json::Value>) -> Option<String> {
    use shared::models::{CosmeticVariant, VariantDetails};

    let details = VariantDetails::from_parts(kind?, data?).ok()?;
    let variant = CosmeticVariant {
        details,
        price: None,
        is_new: false,
        is_on_sale: false,
    };
    variant.image().map(str::to_string)
}
