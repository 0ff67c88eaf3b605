//! Ingestion pipeline: external feeds → catalog, bundles, storefront
//!
//! `sync_all` fetches the three feeds concurrently, then reconciles in a
//! strict order: full catalog, then new items, then the storefront — so
//! shop-state flags written later always win. Per-item anomalies (missing
//! display name, malformed entry) are logged and skipped; the run keeps
//! going and favors partial success.

use chrono::{DateTime, NaiveDate, Utc};

use shared::models::{Category, ShopEntry, VariantDetails};
use shared::models::cosmetic::{
    BeanDetails, BrDetails, CarDetails, InstrumentDetails, LegoItemDetails, LegoKitDetails,
    TrackDetails,
};

use crate::db;
use crate::error::ServiceResult;
use crate::feed::types::{
    BeanDto, BrItemDto, CarDto, CatalogData, InstrumentDto, LegoItemDto, LegoKitDto, ShopEntryDto,
    TrackDto,
};
use crate::state::AppState;

/// Outcome counts of one full sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    pub catalog_items: usize,
    pub new_items: usize,
    pub shop_entries: usize,
}

/// Full ingestion: catalog → new items → storefront
pub async fn sync_all(state: &AppState) -> ServiceResult<SyncReport> {
    tracing::info!("Starting full sync from the cosmetics provider");

    let (catalog, new_items, shop) = futures::try_join!(
        state.feed.fetch_catalog(),
        state.feed.fetch_new(),
        state.feed.fetch_shop(),
    )?;

    let mut report = SyncReport::default();
    report.catalog_items = sync_catalog(state, &catalog, false).await?;
    report.new_items = sync_catalog(state, &new_items, true).await?;
    report.shop_entries = sync_shop(state, shop).await?;

    tracing::info!(
        "Sync complete: {} catalog items, {} new items, {} shop entries",
        report.catalog_items,
        report.new_items,
        report.shop_entries
    );
    Ok(report)
}

/// Storefront-only refresh, used by the scheduled task
pub async fn sync_shop_only(state: &AppState) -> ServiceResult<usize> {
    let entries = state.feed.fetch_shop().await?;
    sync_shop(state, entries).await
}

async fn sync_catalog(
    state: &AppState,
    data: &CatalogData,
    is_new: bool,
) -> ServiceResult<usize> {
    let pool = &state.pool;
    let mut count = 0;

    for item in &data.br {
        count += usize::from(upsert_br(pool, item, None, is_new).await?);
    }
    for track in &data.tracks {
        upsert_track(pool, track, None, is_new).await?;
        count += 1;
    }
    for instrument in &data.instruments {
        count += usize::from(upsert_instrument(pool, instrument, None, is_new).await?);
    }
    for car in &data.cars {
        count += usize::from(upsert_car(pool, car, None, is_new).await?);
    }
    for item in &data.lego {
        upsert_lego_item(pool, item, None, is_new).await?;
        count += 1;
    }
    for kit in &data.lego_kits {
        count += usize::from(upsert_lego_kit(pool, kit, None, is_new).await?);
    }
    for bean in &data.beans {
        upsert_bean(pool, bean, None, is_new).await?;
        count += 1;
    }

    Ok(count)
}

async fn sync_shop(state: &AppState, raw_entries: Vec<serde_json::Value>) -> ServiceResult<usize> {
    let pool = &state.pool;
    tracing::info!("Storefront entries received: {}", raw_entries.len());

    let mut count = 0;
    for raw in raw_entries {
        let dto: ShopEntryDto = match serde_json::from_value(raw.clone()) {
            Ok(dto) => dto,
            Err(e) => {
                tracing::warn!("Skipping malformed shop entry: {e}");
                continue;
            }
        };
        sync_shop_entry(state, dto, raw).await?;
        count += 1;
    }

    Ok(count)
}

async fn sync_shop_entry(
    state: &AppState,
    dto: ShopEntryDto,
    raw: serde_json::Value,
) -> ServiceResult<()> {
    let pool = &state.pool;
    let offer_id = dto.offer_id.clone().unwrap_or_else(|| {
        let mut item_ids: Vec<&str> = dto.br_items.iter().map(|i| i.id.as_str()).collect();
        item_ids.extend(dto.tracks.iter().map(|t| t.id.as_str()));
        item_ids.extend(dto.instruments.iter().map(|i| i.id.as_str()));
        item_ids.extend(dto.cars.iter().map(|c| c.id.as_str()));
        item_ids.extend(dto.lego_kits.iter().map(|k| k.id.as_str()));
        fallback_offer_id(dto.dev_name.as_deref(), &item_ids)
    });

    // Provider-declared bundle
    let mut bundle_id = match dto.bundle.as_ref().and_then(|b| b.name.as_deref()) {
        Some(name) => Some(
            db::bundles::upsert_explicit(
                pool,
                name,
                dto.bundle.as_ref().and_then(|b| b.info.as_deref()),
                dto.bundle.as_ref().and_then(|b| b.image.as_deref()),
                dto.final_price,
            )
            .await?,
        ),
        None => None,
    };

    let mut cosmetic_id = None;
    let synthesize = should_synthesize_bundle(dto.br_items.len(), bundle_id.is_some());

    for item in &dto.br_items {
        if !upsert_br(pool, item, dto.final_price, true).await? {
            continue;
        }

        if bundle_id.is_some() || synthesize {
            let id = match bundle_id {
                Some(id) => id,
                None => {
                    let name = implicit_bundle_name(dto.dev_name.as_deref(), &offer_id);
                    let info = format!("Bundle of {} items", dto.br_items.len());
                    let id =
                        db::bundles::upsert_implicit(pool, &name, &info, dto.final_price).await?;
                    bundle_id = Some(id);
                    id
                }
            };
            db::bundles::link_cosmetic(pool, id, &item.id).await?;
        } else {
            cosmetic_id = Some(item.id.clone());
        }
    }

    let mut track_id = None;
    for track in &dto.tracks {
        upsert_track(pool, track, dto.final_price, true).await?;
        track_id = Some(track.id.clone());
    }

    let mut instrument_id = None;
    for instrument in &dto.instruments {
        if upsert_instrument(pool, instrument, dto.final_price, true).await? {
            instrument_id = Some(instrument.id.clone());
        }
    }

    let mut car_id = None;
    for car in &dto.cars {
        if upsert_car(pool, car, dto.final_price, true).await? {
            car_id = Some(car.id.clone());
        }
    }

    let mut lego_kit_id = None;
    for kit in &dto.lego_kits {
        if upsert_lego_kit(pool, kit, dto.final_price, true).await? {
            lego_kit_id = Some(kit.id.clone());
        }
    }

    // At most one item-reference slot per entry; a bundle claims the offer
    if bundle_id.is_some() {
        cosmetic_id = None;
        track_id = None;
        instrument_id = None;
        car_id = None;
        lego_kit_id = None;
    }

    let layout = dto.layout.as_ref();
    let entry = ShopEntry {
        offer_id,
        dev_name: dto.dev_name,
        final_price: dto.final_price,
        regular_price: dto.regular_price,
        in_date: dto.in_date.as_deref().and_then(parse_feed_date),
        out_date: dto.out_date.as_deref().and_then(parse_feed_date),
        banner_text: dto.banner.as_ref().and_then(|b| b.value.clone()),
        banner_intensity: dto.banner.as_ref().and_then(|b| b.intensity.clone()),
        banner_backend_value: dto.banner.as_ref().and_then(|b| b.backend_value.clone()),
        offer_tag_id: dto.offer_tag.as_ref().and_then(|t| t.id.clone()),
        offer_tag_text: dto.offer_tag.as_ref().and_then(|t| t.text.clone()),
        layout_id: layout.and_then(|l| l.id.clone()).or(dto.layout_id),
        layout_name: layout.and_then(|l| l.name.clone()),
        sort_priority: dto.sort_priority,
        is_giftable: dto.giftable.unwrap_or(false),
        is_refundable: dto.refundable.unwrap_or(false),
        bundle_id,
        cosmetic_id,
        track_id,
        instrument_id,
        car_id,
        lego_kit_id,
        layout_background: layout.and_then(|l| l.texture("background")),
        layout_foreground: layout.and_then(|l| l.texture("foreground")),
        layout_banner: layout.and_then(|l| l.texture("banner")),
        layout_body_image: layout.and_then(|l| l.texture("bodyImage")),
        layout_alignment: layout.and_then(|l| l.string("alignment")),
        layout_title: layout.and_then(|l| l.text("title")),
        layout_subtitle: layout.and_then(|l| l.text("subtitle")),
        layout_cta: layout.and_then(|l| l.text("cta")),
        display_type: layout.and_then(|l| l.display_type.clone()),
        tile_size: dto.tile_size,
        raw_data: Some(raw),
        updated_at: Utc::now(),
    };

    db::shop_entries::upsert(pool, &entry).await?;
    Ok(())
}

// ── Pure policy ──

/// Some entries arrive without an `offerId`. The key still has to be stable
/// across re-syncs of the same payload, so it is derived from the entry's
/// dev-name and contained item ids rather than minted fresh.
pub fn fallback_offer_id(dev_name: Option<&str>, item_ids: &[&str]) -> String {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    dev_name.unwrap_or_default().hash(&mut hasher);
    for id in item_ids {
        id.hash(&mut hasher);
    }
    format!("entry_{:016x}", hasher.finish())
}

/// An offer grouping multiple BR items without declaring a bundle gets a
/// synthesized one. Single-item offers never do.
pub fn should_synthesize_bundle(br_item_count: usize, has_declared_bundle: bool) -> bool {
    br_item_count > 1 && !has_declared_bundle
}

/// Synthetic bundle name: the offer's dev-name, or a marked fallback
pub fn implicit_bundle_name(dev_name: Option<&str>, offer_id: &str) -> String {
    match dev_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Bundle_{offer_id}"),
    }
}

/// Feed dates arrive as RFC 3339 timestamps or bare dates
pub fn parse_feed_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_hms_opt(0, 0, 0).expect("midnight is always valid").and_utc())
}

fn track_display_name(track: &TrackDto) -> String {
    track
        .title
        .clone()
        .or_else(|| track.dev_name.clone())
        .unwrap_or_else(|| format!("Track {}", track.id))
}

// ── Per-category upserts ──
//
// Each writes the base cosmetic row plus its variant payload. Returns
// false when the item is skipped for lacking a display name.

async fn upsert_br(
    pool: &sqlx::PgPool,
    item: &BrItemDto,
    price: Option<i64>,
    is_new: bool,
) -> ServiceResult<bool> {
    let Some(name) = item.name.clone() else {
        tracing::warn!("BR item {} has no name, skipping", item.id);
        return Ok(false);
    };

    let base = db::cosmetics::CosmeticUpsert {
        id: item.id.clone(),
        name,
        description: item.description.clone(),
        item_type: item.item_type.as_ref().and_then(|t| t.display()),
        rarity: item.rarity.as_ref().and_then(|r| r.display_value.clone()),
        series: item.series.as_ref().and_then(|s| s.value.clone()),
        set_name: item.set.as_ref().and_then(|s| s.text.clone()),
        category: Category::Br,
        added_at: item.added.as_deref().and_then(parse_feed_date),
        shop_history: item.shop_history.clone(),
    };
    let variant = db::cosmetics::VariantUpsert {
        details: VariantDetails::Br(BrDetails {
            image_small_icon: item.images.as_ref().and_then(|i| i.small_icon.clone()),
            image_icon: item.images.as_ref().and_then(|i| i.icon.clone()),
            image_featured: item.images.as_ref().and_then(|i| i.featured.clone()),
            introduction: item.introduction.as_ref().and_then(|i| i.text.clone()),
            search_tags: item.search_tags.clone(),
            gameplay_tags: item.gameplay_tags.clone(),
            meta_tags: item.meta_tags.clone(),
            showcase_video: item.showcase_video.clone(),
        }),
        price,
        is_new,
    };

    db::cosmetics::upsert(pool, &base, &variant).await?;
    Ok(true)
}

async fn upsert_track(
    pool: &sqlx::PgPool,
    track: &TrackDto,
    price: Option<i64>,
    is_new: bool,
) -> ServiceResult<()> {
    let artist = track.artist.as_deref().unwrap_or("Unknown artist");
    let album = track.album.as_deref().unwrap_or("Unknown album");

    let base = db::cosmetics::CosmeticUpsert {
        id: track.id.clone(),
        name: track_display_name(track),
        description: Some(format!("{artist} - {album}")),
        item_type: Some("Track".into()),
        rarity: None,
        series: None,
        set_name: None,
        category: Category::Track,
        added_at: track.added.as_deref().and_then(parse_feed_date),
        shop_history: track.shop_history.clone(),
    };
    let variant = db::cosmetics::VariantUpsert {
        details: VariantDetails::Track(TrackDetails {
            dev_name: track.dev_name.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone(),
            release_year: track.release_year,
            bpm: track.bpm,
            duration: track.duration,
            genres: track.genres.clone(),
            album_art: track.album_art.clone(),
            gameplay_tags: track.gameplay_tags.clone(),
        }),
        price,
        is_new,
    };

    db::cosmetics::upsert(pool, &base, &variant).await
}

async fn upsert_instrument(
    pool: &sqlx::PgPool,
    instrument: &InstrumentDto,
    price: Option<i64>,
    is_new: bool,
) -> ServiceResult<bool> {
    let Some(name) = instrument.name.clone() else {
        tracing::warn!("Instrument {} has no name, skipping", instrument.id);
        return Ok(false);
    };

    let base = db::cosmetics::CosmeticUpsert {
        id: instrument.id.clone(),
        name,
        description: instrument.description.clone(),
        item_type: instrument.item_type.as_ref().and_then(|t| t.display()),
        rarity: instrument
            .rarity
            .as_ref()
            .and_then(|r| r.display_value.clone()),
        series: instrument.series.as_ref().and_then(|s| s.value.clone()),
        set_name: None,
        category: Category::Instrument,
        added_at: instrument.added.as_deref().and_then(parse_feed_date),
        shop_history: instrument.shop_history.clone(),
    };
    let variant = db::cosmetics::VariantUpsert {
        details: VariantDetails::Instrument(InstrumentDetails {
            image_small: instrument.images.as_ref().and_then(|i| i.small.clone()),
            image_large: instrument.images.as_ref().and_then(|i| i.large.clone()),
            gameplay_tags: instrument.gameplay_tags.clone(),
            showcase_video: instrument.showcase_video.clone(),
        }),
        price,
        is_new,
    };

    db::cosmetics::upsert(pool, &base, &variant).await?;
    Ok(true)
}

async fn upsert_car(
    pool: &sqlx::PgPool,
    car: &CarDto,
    price: Option<i64>,
    is_new: bool,
) -> ServiceResult<bool> {
    let Some(name) = car.name.clone() else {
        tracing::warn!("Car {} has no name, skipping", car.id);
        return Ok(false);
    };

    let base = db::cosmetics::CosmeticUpsert {
        id: car.id.clone(),
        name,
        description: car.description.clone(),
        item_type: car.item_type.as_ref().and_then(|t| t.display()),
        rarity: car.rarity.as_ref().and_then(|r| r.display_value.clone()),
        series: car.series.as_ref().and_then(|s| s.value.clone()),
        set_name: None,
        category: Category::Car,
        added_at: car.added.as_deref().and_then(parse_feed_date),
        shop_history: car.shop_history.clone(),
    };
    let variant = db::cosmetics::VariantUpsert {
        details: VariantDetails::Car(CarDetails {
            vehicle_id: car.vehicle_id.clone(),
            image_small: car.images.as_ref().and_then(|i| i.small.clone()),
            image_large: car.images.as_ref().and_then(|i| i.large.clone()),
            gameplay_tags: car.gameplay_tags.clone(),
        }),
        price,
        is_new,
    };

    db::cosmetics::upsert(pool, &base, &variant).await?;
    Ok(true)
}

async fn upsert_lego_item(
    pool: &sqlx::PgPool,
    item: &LegoItemDto,
    price: Option<i64>,
    is_new: bool,
) -> ServiceResult<()> {
    let base = db::cosmetics::CosmeticUpsert {
        id: item.id.clone(),
        name: format!("Lego Item {}", item.id),
        description: None,
        item_type: Some("Lego".into()),
        rarity: None,
        series: None,
        set_name: None,
        category: Category::Lego,
        added_at: item.added.as_deref().and_then(parse_feed_date),
        shop_history: Vec::new(),
    };
    let variant = db::cosmetics::VariantUpsert {
        details: VariantDetails::LegoItem(LegoItemDetails {
            image_small: item.images.as_ref().and_then(|i| i.small.clone()),
            image_large: item.images.as_ref().and_then(|i| i.large.clone()),
            image_wide: item.images.as_ref().and_then(|i| i.wide.clone()),
            sound_library_tags: item.sound_library_tags.clone(),
        }),
        price,
        is_new,
    };

    db::cosmetics::upsert(pool, &base, &variant).await
}

async fn upsert_lego_kit(
    pool: &sqlx::PgPool,
    kit: &LegoKitDto,
    price: Option<i64>,
    is_new: bool,
) -> ServiceResult<bool> {
    let Some(name) = kit.name.clone() else {
        tracing::warn!("Lego kit {} has no name, skipping", kit.id);
        return Ok(false);
    };

    let base = db::cosmetics::CosmeticUpsert {
        id: kit.id.clone(),
        name,
        description: None,
        item_type: kit.item_type.as_ref().and_then(|t| t.display()),
        rarity: None,
        series: kit.series.as_ref().and_then(|s| s.value.clone()),
        set_name: None,
        category: Category::LegoKit,
        added_at: kit.added.as_deref().and_then(parse_feed_date),
        shop_history: kit.shop_history.clone(),
    };
    let variant = db::cosmetics::VariantUpsert {
        details: VariantDetails::LegoKit(LegoKitDetails {
            image_small: kit.images.as_ref().and_then(|i| i.small.clone()),
            image_large: kit.images.as_ref().and_then(|i| i.large.clone()),
            image_wide: kit.images.as_ref().and_then(|i| i.wide.clone()),
            gameplay_tags: kit.gameplay_tags.clone(),
        }),
        price,
        is_new,
    };

    db::cosmetics::upsert(pool, &base, &variant).await?;
    Ok(true)
}

async fn upsert_bean(
    pool: &sqlx::PgPool,
    bean: &BeanDto,
    price: Option<i64>,
    is_new: bool,
) -> ServiceResult<()> {
    let base = db::cosmetics::CosmeticUpsert {
        id: bean.id.clone(),
        name: bean
            .name
            .clone()
            .unwrap_or_else(|| format!("Bean {}", bean.id)),
        description: None,
        item_type: Some("Bean".into()),
        rarity: None,
        series: None,
        set_name: None,
        category: Category::Bean,
        added_at: bean.added.as_deref().and_then(parse_feed_date),
        shop_history: Vec::new(),
    };
    let variant = db::cosmetics::VariantUpsert {
        details: VariantDetails::Bean(BeanDetails {
            gender: bean.gender.clone(),
            image_small: bean.images.as_ref().and_then(|i| i.small.clone()),
            image_large: bean.images.as_ref().and_then(|i| i.large.clone()),
            gameplay_tags: bean.gameplay_tags.clone(),
        }),
        price,
        is_new,
    };

    db::cosmetics::upsert(pool, &base, &variant).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bundle_synthesis_needs_multiple_undeclared_items() {
        assert!(should_synthesize_bundle(2, false));
        assert!(should_synthesize_bundle(5, false));
        assert!(!should_synthesize_bundle(1, false));
        assert!(!should_synthesize_bundle(0, false));
        assert!(!should_synthesize_bundle(3, true));
    }

    #[test]
    fn missing_offer_id_fallback_is_stable() {
        let a = fallback_offer_id(Some("RenegadePack"), &["CID_1", "CID_2"]);
        let b = fallback_offer_id(Some("RenegadePack"), &["CID_1", "CID_2"]);
        assert_eq!(a, b);
        assert!(a.starts_with("entry_"));

        // Different contents must not collide on the same key
        assert_ne!(a, fallback_offer_id(Some("RenegadePack"), &["CID_1"]));
        assert_ne!(a, fallback_offer_id(None, &["CID_1", "CID_2"]));
    }

    #[test]
    fn implicit_name_prefers_dev_name() {
        assert_eq!(
            implicit_bundle_name(Some("AutumnQueenPack"), "v2:/abc"),
            "AutumnQueenPack"
        );
        assert_eq!(implicit_bundle_name(None, "v2:/abc"), "Bundle_v2:/abc");
        assert_eq!(implicit_bundle_name(Some(""), "v2:/abc"), "Bundle_v2:/abc");
    }

    #[test]
    fn feed_dates_parse_both_shapes() {
        assert_eq!(
            parse_feed_date("2026-08-28T00:00:00Z"),
            Some(Utc.with_ymd_and_hms(2026, 8, 28, 0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_feed_date("2019-10-17"),
            Some(Utc.with_ymd_and_hms(2019, 10, 17, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_feed_date("not a date"), None);
    }

    #[test]
    fn track_name_falls_back_to_dev_name_then_id() {
        let mut track = TrackDto {
            id: "sid_42".into(),
            dev_name: Some("night_drive_dev".into()),
            title: None,
            artist: None,
            album: None,
            release_year: None,
            bpm: None,
            duration: None,
            genres: None,
            album_art: None,
            gameplay_tags: None,
            added: None,
            shop_history: Vec::new(),
        };
        assert_eq!(track_display_name(&track), "night_drive_dev");
        track.dev_name = None;
        assert_eq!(track_display_name(&track), "Track sid_42");
        track.title = Some("Night Drive".into());
        assert_eq!(track_display_name(&track), "Night Drive");
    }
}
