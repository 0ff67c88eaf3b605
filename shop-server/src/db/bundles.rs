//! Bundle database operations

use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{Bundle, BundleWithItems, CosmeticWithVariant};

use crate::db::cosmetics::{COSMETIC_COLS, CosmeticRow};
use crate::error::ServiceResult;

/// Upsert a provider-declared bundle, keyed by name
pub async fn upsert_explicit(
    pool: &PgPool,
    name: &str,
    info: Option<&str>,
    image_url: Option<&str>,
    price: Option<i64>,
) -> ServiceResult<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO bundles (name, info, image_url, price)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (name)
        DO UPDATE SET
            info = EXCLUDED.info, image_url = EXCLUDED.image_url,
            price = EXCLUDED.price
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(info)
    .bind(image_url)
    .bind(price)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Upsert a synthesized bundle. Only the price moves on re-ingestion; the
/// synthetic name and info stay as first written.
pub async fn upsert_implicit(
    pool: &PgPool,
    name: &str,
    info: &str,
    price: Option<i64>,
) -> ServiceResult<Uuid> {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO bundles (name, info, price)
        VALUES ($1, $2, $3)
        ON CONFLICT (name)
        DO UPDATE SET price = EXCLUDED.price
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(info)
    .bind(price)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn link_cosmetic(pool: &PgPool, bundle_id: Uuid, cosmetic_id: &str) -> ServiceResult<()> {
    sqlx::query(
        "INSERT INTO bundle_cosmetics (bundle_id, cosmetic_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(bundle_id)
    .bind(cosmetic_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> ServiceResult<Option<Bundle>> {
    let bundle = sqlx::query_as("SELECT id, name, info, image_url, price FROM bundles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(bundle)
}

/// Contained cosmetics with variants, in link order
pub async fn items(pool: &PgPool, bundle_id: Uuid) -> ServiceResult<Vec<CosmeticWithVariant>> {
    let rows: Vec<CosmeticRow> = sqlx::query_as(&format!(
        "SELECT {COSMETIC_COLS} FROM bundle_cosmetics bc \
         JOIN cosmetics c ON c.id = bc.cosmetic_id \
         LEFT JOIN cosmetic_variants v ON v.cosmetic_id = c.id \
         WHERE bc.bundle_id = $1 ORDER BY c.id"
    ))
    .bind(bundle_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(CosmeticRow::into_model).collect())
}

pub async fn with_items(pool: &PgPool, bundle_id: Uuid) -> ServiceResult<Option<BundleWithItems>> {
    let Some(bundle) = find_by_id(pool, bundle_id).await? else {
        return Ok(None);
    };
    let cosmetics = items(pool, bundle_id).await?;
    Ok(Some(BundleWithItems { bundle, cosmetics }))
}

/// Bundles a cosmetic appears in
pub async fn for_cosmetic(pool: &PgPool, cosmetic_id: &str) -> ServiceResult<Vec<Bundle>> {
    let bundles = sqlx::query_as(
        "SELECT b.id, b.name, b.info, b.image_url, b.price FROM bundles b \
         JOIN bundle_cosmetics bc ON bc.bundle_id = b.id \
         WHERE bc.cosmetic_id = $1 ORDER BY b.name",
    )
    .bind(cosmetic_id)
    .fetch_all(pool)
    .await?;
    Ok(bundles)
}
