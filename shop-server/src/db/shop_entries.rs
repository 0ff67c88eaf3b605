//! Storefront offer database operations

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shared::models::ShopEntry;

use crate::error::ServiceResult;

/// Upsert one offer, keyed by `offer_id`
pub async fn upsert(pool: &PgPool, entry: &ShopEntry) -> ServiceResult<()> {
    sqlx::query(
        r#"
        INSERT INTO shop_entries (
            offer_id, dev_name, final_price, regular_price, in_date, out_date,
            banner_text, banner_intensity, banner_backend_value,
            offer_tag_id, offer_tag_text, layout_id, layout_name, sort_priority,
            is_giftable, is_refundable,
            bundle_id, cosmetic_id, track_id, instrument_id, car_id, lego_kit_id,
            layout_background, layout_foreground, layout_banner, layout_body_image,
            layout_alignment, layout_title, layout_subtitle, layout_cta,
            display_type, tile_size, raw_data, updated_at
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
            $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
            $27, $28, $29, $30, $31, $32, $33, now()
        )
        ON CONFLICT (offer_id)
        DO UPDATE SET
            dev_name = EXCLUDED.dev_name, final_price = EXCLUDED.final_price,
            regular_price = EXCLUDED.regular_price,
            in_date = EXCLUDED.in_date, out_date = EXCLUDED.out_date,
            banner_text = EXCLUDED.banner_text,
            banner_intensity = EXCLUDED.banner_intensity,
            banner_backend_value = EXCLUDED.banner_backend_value,
            offer_tag_id = EXCLUDED.offer_tag_id,
            offer_tag_text = EXCLUDED.offer_tag_text,
            layout_id = EXCLUDED.layout_id, layout_name = EXCLUDED.layout_name,
            sort_priority = EXCLUDED.sort_priority,
            is_giftable = EXCLUDED.is_giftable,
            is_refundable = EXCLUDED.is_refundable,
            bundle_id = EXCLUDED.bundle_id, cosmetic_id = EXCLUDED.cosmetic_id,
            track_id = EXCLUDED.track_id, instrument_id = EXCLUDED.instrument_id,
            car_id = EXCLUDED.car_id, lego_kit_id = EXCLUDED.lego_kit_id,
            layout_background = EXCLUDED.layout_background,
            layout_foreground = EXCLUDED.layout_foreground,
            layout_banner = EXCLUDED.layout_banner,
            layout_body_image = EXCLUDED.layout_body_image,
            layout_alignment = EXCLUDED.layout_alignment,
            layout_title = EXCLUDED.layout_title,
            layout_subtitle = EXCLUDED.layout_subtitle,
            layout_cta = EXCLUDED.layout_cta,
            display_type = EXCLUDED.display_type, tile_size = EXCLUDED.tile_size,
            raw_data = EXCLUDED.raw_data, updated_at = now()
        "#,
    )
    .bind(&entry.offer_id)
    .bind(&entry.dev_name)
    .bind(entry.final_price)
    .bind(entry.regular_price)
    .bind(entry.in_date)
    .bind(entry.out_date)
    .bind(&entry.banner_text)
    .bind(&entry.banner_intensity)
    .bind(&entry.banner_backend_value)
    .bind(&entry.offer_tag_id)
    .bind(&entry.offer_tag_text)
    .bind(&entry.layout_id)
    .bind(&entry.layout_name)
    .bind(entry.sort_priority)
    .bind(entry.is_giftable)
    .bind(entry.is_refundable)
    .bind(entry.bundle_id)
    .bind(&entry.cosmetic_id)
    .bind(&entry.track_id)
    .bind(&entry.instrument_id)
    .bind(&entry.car_id)
    .bind(&entry.lego_kit_id)
    .bind(&entry.layout_background)
    .bind(&entry.layout_foreground)
    .bind(&entry.layout_banner)
    .bind(&entry.layout_body_image)
    .bind(&entry.layout_alignment)
    .bind(&entry.layout_title)
    .bind(&entry.layout_subtitle)
    .bind(&entry.layout_cta)
    .bind(&entry.display_type)
    .bind(&entry.tile_size)
    .bind(&entry.raw_data)
    .execute(pool)
    .await?;
    Ok(())
}

const ENTRY_COLS: &str = "offer_id, dev_name, final_price, regular_price, in_date, out_date, \
     banner_text, banner_intensity, banner_backend_value, offer_tag_id, offer_tag_text, \
     layout_id, layout_name, sort_priority, is_giftable, is_refundable, \
     bundle_id, cosmetic_id, track_id, instrument_id, car_id, lego_kit_id, \
     layout_background, layout_foreground, layout_banner, layout_body_image, \
     layout_alignment, layout_title, layout_subtitle, layout_cta, \
     display_type, tile_size, raw_data, updated_at";

/// Offers whose validity window contains `now` (both-null = always active),
/// most important first.
pub async fn active(pool: &PgPool, now: DateTime<Utc>) -> ServiceResult<Vec<ShopEntry>> {
    let entries = sqlx::query_as(&format!(
        "SELECT {ENTRY_COLS} FROM shop_entries \
         WHERE (in_date IS NULL OR in_date <= $1) AND (out_date IS NULL OR out_date >= $1) \
         ORDER BY sort_priority ASC NULLS LAST, offer_id"
    ))
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

/// Most recent offers that sold a given cosmetic directly
pub async fn recent_for_cosmetic(
    pool: &PgPool,
    cosmetic_id: &str,
    limit: i64,
) -> ServiceResult<Vec<ShopEntry>> {
    let entries = sqlx::query_as(&format!(
        "SELECT {ENTRY_COLS} FROM shop_entries \
         WHERE cosmetic_id = $1 OR track_id = $1 OR instrument_id = $1 \
            OR car_id = $1 OR lego_kit_id = $1 \
         ORDER BY in_date DESC NULLS LAST LIMIT $2"
    ))
    .bind(cosmetic_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
