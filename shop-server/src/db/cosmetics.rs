//! Cosmetic catalog database operations

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use shared::models::{Category, Cosmetic, CosmeticVariant, CosmeticWithVariant, VariantDetails};

use crate::error::ServiceResult;

/// Flat join row of a cosmetic and its (optional) variant
#[derive(Debug, sqlx::FromRow)]
pub struct CosmeticRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub series: Option<String>,
    pub set_name: Option<String>,
    pub category: Category,
    pub added_at: Option<DateTime<Utc>>,
    pub shop_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub kind: Option<String>,
    pub data: Option<serde_json::Value>,
    pub price: Option<i64>,
    pub is_new: Option<bool>,
    pub is_on_sale: Option<bool>,
}

impl CosmeticRow {
    pub fn into_model(self) -> CosmeticWithVariant {
        let variant = match (self.kind, self.data) {
            (Some(kind), Some(data)) => match VariantDetails::from_parts(&kind, data) {
                Ok(details) => Some(CosmeticVariant {
                    details,
                    price: self.price,
                    is_new: self.is_new.unwrap_or(false),
                    is_on_sale: self.is_on_sale.unwrap_or(false),
                }),
                Err(e) => {
                    tracing::warn!("Malformed variant payload for cosmetic {}: {e}", self.id);
                    None
                }
            },
            _ => None,
        };

        CosmeticWithVariant {
            cosmetic: Cosmetic {
                id: self.id,
                name: self.name,
                description: self.description,
                item_type: self.item_type,
                rarity: self.rarity,
                series: self.series,
                set_name: self.set_name,
                category: self.category,
                added_at: self.added_at,
                shop_history: self.shop_history,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            variant,
        }
    }
}

pub const COSMETIC_COLS: &str = "c.id, c.name, c.description, c.item_type, c.rarity, c.series, \
     c.set_name, c.category, c.added_at, c.shop_history, c.created_at, c.updated_at, \
     v.kind, v.data, v.price, v.is_new, v.is_on_sale";

const FROM_JOINED: &str =
    " FROM cosmetics c LEFT JOIN cosmetic_variants v ON v.cosmetic_id = c.id";

/// Catalog listing filters. All optional; `is_new`/`is_on_sale` implicitly
/// require a variant row to exist.
#[derive(Debug, Default)]
pub struct CosmeticFilter {
    pub category: Option<Category>,
    pub rarity: Option<String>,
    pub item_type: Option<String>,
    pub is_new: Option<bool>,
    pub is_on_sale: Option<bool>,
    pub search: Option<String>,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &CosmeticFilter) {
    qb.push(" WHERE TRUE");
    if let Some(category) = filter.category {
        qb.push(" AND c.category = ");
        qb.push_bind(category);
    }
    if let Some(rarity) = &filter.rarity {
        qb.push(" AND c.rarity ILIKE ");
        qb.push_bind(format!("%{rarity}%"));
    }
    if let Some(item_type) = &filter.item_type {
        qb.push(" AND c.item_type ILIKE ");
        qb.push_bind(format!("%{item_type}%"));
    }
    if let Some(is_new) = filter.is_new {
        qb.push(" AND v.is_new = ");
        qb.push_bind(is_new);
    }
    if let Some(is_on_sale) = filter.is_on_sale {
        qb.push(" AND v.is_on_sale = ");
        qb.push_bind(is_on_sale);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{search}%");
        qb.push(" AND (c.name ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR c.description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

/// Filtered catalog page plus the total matching count
pub async fn list(
    pool: &PgPool,
    filter: &CosmeticFilter,
    limit: i64,
    offset: i64,
) -> ServiceResult<(Vec<CosmeticWithVariant>, i64)> {
    let mut qb = QueryBuilder::new(format!("SELECT {COSMETIC_COLS}{FROM_JOINED}"));
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY c.created_at DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows: Vec<CosmeticRow> = qb.build_query_as().fetch_all(pool).await?;

    let mut count_qb = QueryBuilder::new(format!("SELECT COUNT(*){FROM_JOINED}"));
    push_filters(&mut count_qb, filter);
    let (total,): (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

    Ok((rows.into_iter().map(CosmeticRow::into_model).collect(), total))
}

pub async fn list_new(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> ServiceResult<(Vec<CosmeticWithVariant>, i64)> {
    let rows: Vec<CosmeticRow> = sqlx::query_as(&format!(
        "SELECT {COSMETIC_COLS}{FROM_JOINED} WHERE v.is_new \
         ORDER BY c.added_at DESC NULLS LAST LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cosmetic_variants WHERE is_new")
            .fetch_one(pool)
            .await?;

    Ok((rows.into_iter().map(CosmeticRow::into_model).collect(), total))
}

pub async fn list_on_sale(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> ServiceResult<(Vec<CosmeticWithVariant>, i64)> {
    let rows: Vec<CosmeticRow> = sqlx::query_as(&format!(
        "SELECT {COSMETIC_COLS}{FROM_JOINED} WHERE v.is_on_sale \
         ORDER BY c.updated_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let (total,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM cosmetic_variants WHERE is_on_sale")
            .fetch_one(pool)
            .await?;

    Ok((rows.into_iter().map(CosmeticRow::into_model).collect(), total))
}

pub async fn find_by_id(pool: &PgPool, id: &str) -> ServiceResult<Option<CosmeticWithVariant>> {
    let row: Option<CosmeticRow> =
        sqlx::query_as(&format!("SELECT {COSMETIC_COLS}{FROM_JOINED} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(CosmeticRow::into_model))
}

// ── Ingestion upserts ──

/// Base-row fields written by every category's upsert
#[derive(Debug)]
pub struct CosmeticUpsert {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub series: Option<String>,
    pub set_name: Option<String>,
    pub category: Category,
    pub added_at: Option<DateTime<Utc>>,
    pub shop_history: Vec<String>,
}

/// Variant-row fields; the three shop-state columns are overwritten on
/// every ingestion pass, whichever feed the item came from.
#[derive(Debug)]
pub struct VariantUpsert {
    pub details: VariantDetails,
    pub price: Option<i64>,
    pub is_new: bool,
}

impl VariantUpsert {
    pub fn is_on_sale(&self) -> bool {
        self.price.is_some_and(|p| p > 0)
    }
}

/// Write base row + variant row in one transaction. Idempotent: replaying
/// identical input changes nothing but `updated_at`.
pub async fn upsert(
    pool: &PgPool,
    base: &CosmeticUpsert,
    variant: &VariantUpsert,
) -> ServiceResult<()> {
    let payload = variant.details.payload()?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO cosmetics (
            id, name, description, item_type, rarity, series, set_name,
            category, added_at, shop_history
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (id)
        DO UPDATE SET
            name = EXCLUDED.name, description = EXCLUDED.description,
            item_type = EXCLUDED.item_type, rarity = EXCLUDED.rarity,
            series = EXCLUDED.series, set_name = EXCLUDED.set_name,
            category = EXCLUDED.category, added_at = EXCLUDED.added_at,
            shop_history = EXCLUDED.shop_history, updated_at = now()
        "#,
    )
    .bind(&base.id)
    .bind(&base.name)
    .bind(&base.description)
    .bind(&base.item_type)
    .bind(&base.rarity)
    .bind(&base.series)
    .bind(&base.set_name)
    .bind(base.category)
    .bind(base.added_at)
    .bind(&base.shop_history)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO cosmetic_variants (cosmetic_id, kind, data, price, is_new, is_on_sale)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (cosmetic_id)
        DO UPDATE SET
            kind = EXCLUDED.kind, data = EXCLUDED.data, price = EXCLUDED.price,
            is_new = EXCLUDED.is_new, is_on_sale = EXCLUDED.is_on_sale
        "#,
    )
    .bind(&base.id)
    .bind(variant.details.kind().as_str())
    .bind(&payload)
    .bind(variant.price)
    .bind(variant.is_new)
    .bind(variant.is_on_sale())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

// ── Stats ──

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentCosmetic {
    pub id: String,
    pub name: String,
    pub rarity: Option<String>,
    pub added_at: Option<DateTime<Utc>>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total: i64,
    pub by_kind: Vec<LabelCount>,
    pub by_category: Vec<LabelCount>,
    pub by_rarity: Vec<LabelCount>,
    pub recently_added: Vec<RecentCosmetic>,
}

async fn label_counts(pool: &PgPool, sql: &str) -> ServiceResult<Vec<LabelCount>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(sql).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|(label, count)| LabelCount { label, count })
        .collect())
}

/// Aggregate catalog counts plus the ten most recently added items
pub async fn stats(pool: &PgPool) -> ServiceResult<StatsSummary> {
    let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cosmetics")
        .fetch_one(pool)
        .await?;

    let by_kind = label_counts(
        pool,
        "SELECT kind, COUNT(*) FROM cosmetic_variants GROUP BY kind ORDER BY kind",
    )
    .await?;
    let by_category = label_counts(
        pool,
        "SELECT category::TEXT, COUNT(*) FROM cosmetics GROUP BY category ORDER BY category",
    )
    .await?;
    let by_rarity = label_counts(
        pool,
        "SELECT rarity, COUNT(*) FROM cosmetics WHERE rarity IS NOT NULL \
         GROUP BY rarity ORDER BY COUNT(*) DESC",
    )
    .await?;

    let rows: Vec<CosmeticRow> = sqlx::query_as(&format!(
        "SELECT {COSMETIC_COLS}{FROM_JOINED} ORDER BY c.added_at DESC NULLS LAST LIMIT 10"
    ))
    .fetch_all(pool)
    .await?;

    let recently_added = rows
        .into_iter()
        .map(CosmeticRow::into_model)
        .map(|c| RecentCosmetic {
            image: c.image().map(str::to_string),
            id: c.cosmetic.id,
            name: c.cosmetic.name,
            rarity: c.cosmetic.rarity,
            added_at: c.cosmetic.added_at,
        })
        .collect();

    Ok(StatsSummary {
        total,
        by_kind,
        by_category,
        by_rarity,
        recently_added,
    })
}
