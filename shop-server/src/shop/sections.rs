//! Pure storefront assembly: resolve offers into tiles, group tiles into
//! sections. No IO here; everything is unit-testable with plain values.

use std::collections::HashMap;

use uuid::Uuid;

use shared::models::{
    Bundle, BundleItemSummary, CosmeticWithVariant, LayoutCategory, LayoutInfo, OfferTag,
    ShopBanner, ShopEntry, ShopItem, ShopItemKind, ShopSection, ShopSections, SectionType,
    is_implicit_bundle_name,
};

/// Ownership of the viewer: cosmetic id → bundle the item was acquired
/// through, if any. Empty for anonymous viewers.
pub type OwnedMap = HashMap<String, Option<Uuid>>;

const DEFAULT_SORT_PRIORITY: i32 = 999;

/// Percent off the regular price, rounded to the nearest integer
pub fn discount_percent(regular: i64, price: i64) -> i64 {
    if regular > 0 && price < regular {
        (((regular - price) as f64 / regular as f64) * 100.0).round() as i64
    } else {
        0
    }
}

/// Fixed bucket for an offer outside any themed group. Featured and daily
/// rows are recognized by layout name; bannered or tagged offers are
/// special; everything else lands in daily.
pub fn categorize(layout_name: Option<&str>, has_banner: bool, has_tag: bool) -> LayoutCategory {
    let name = layout_name.unwrap_or("").to_lowercase();
    if name.contains("featured") {
        LayoutCategory::Featured
    } else if name.contains("daily") {
        LayoutCategory::Daily
    } else if has_banner || has_tag {
        LayoutCategory::Special
    } else {
        LayoutCategory::Daily
    }
}

/// Theme grouping key: the layout id up to its first dot. Layout ids of one
/// themed row share a base and differ only in the numeric suffix.
pub fn layout_base(layout_id: &str) -> &str {
    layout_id.split('.').next().unwrap_or(layout_id)
}

fn layout_info(entry: &ShopEntry) -> LayoutInfo {
    LayoutInfo {
        id: entry.layout_id.clone(),
        name: entry.layout_name.clone(),
        background: entry.layout_background.clone(),
        foreground: entry.layout_foreground.clone(),
        banner: entry.layout_banner.clone(),
        body_image: entry.layout_body_image.clone(),
        alignment: entry.layout_alignment.clone(),
        title: entry.layout_title.clone(),
        subtitle: entry.layout_subtitle.clone(),
        cta: entry.layout_cta.clone(),
        display_type: entry.display_type.clone(),
        tile_size: entry.tile_size.clone(),
    }
}

fn banner_of(entry: &ShopEntry) -> Option<ShopBanner> {
    entry.banner_text.as_ref().map(|text| ShopBanner {
        text: text.clone(),
        intensity: entry.banner_intensity.clone(),
    })
}

fn tag_of(entry: &ShopEntry) -> Option<OfferTag> {
    entry.offer_tag_text.as_ref().map(|text| OfferTag {
        id: entry.offer_tag_id.clone(),
        text: text.clone(),
    })
}

/// Resolve a bundle offer into a tile. Synthesized bundles borrow the
/// display identity of their first contained item; the bundle counts as
/// owned only when every contained item was acquired through it.
pub fn resolve_bundle_item(
    entry: &ShopEntry,
    bundle: &Bundle,
    cosmetics: &[CosmeticWithVariant],
    owned: &OwnedMap,
) -> ShopItem {
    let price = entry.final_price.or(bundle.price).unwrap_or(0);
    let regular_price = entry.regular_price.unwrap_or(price);

    let first = cosmetics.first();
    let implicit = is_implicit_bundle_name(&bundle.name);

    let name = if implicit {
        first
            .map(|c| c.cosmetic.name.clone())
            .unwrap_or_else(|| bundle.name.clone())
    } else {
        bundle.name.clone()
    };
    let image = if implicit {
        first.and_then(|c| c.image().map(str::to_string))
    } else {
        bundle
            .image_url
            .clone()
            .or_else(|| first.and_then(|c| c.image().map(str::to_string)))
    };
    let description = if implicit {
        first.and_then(|c| c.cosmetic.description.clone())
    } else {
        bundle.info.clone()
    };

    let owned_entirely = !cosmetics.is_empty()
        && cosmetics
            .iter()
            .all(|c| owned.get(&c.cosmetic.id) == Some(&Some(bundle.id)));

    let items = cosmetics
        .iter()
        .map(|c| BundleItemSummary {
            id: c.cosmetic.id.clone(),
            name: c.cosmetic.name.clone(),
            item_type: c.cosmetic.item_type.clone(),
            rarity: c.cosmetic.rarity.clone(),
            category: c.cosmetic.category,
            image: c.image().map(str::to_string),
            owned: owned.contains_key(&c.cosmetic.id),
        })
        .collect();

    let banner = banner_of(entry);
    let tag = tag_of(entry);
    let layout_category = categorize(entry.layout_name.as_deref(), banner.is_some(), tag.is_some());

    ShopItem {
        offer_id: entry.offer_id.clone(),
        id: bundle.id.to_string(),
        kind: ShopItemKind::Bundle,
        name,
        description,
        item_type: Some("Bundle".into()),
        rarity: first.and_then(|c| c.cosmetic.rarity.clone()),
        series: first.and_then(|c| c.cosmetic.series.clone()),
        set_name: None,
        category: first.map(|c| c.cosmetic.category),
        image,
        price,
        regular_price,
        is_on_sale: regular_price > 0 && price < regular_price,
        discount: discount_percent(regular_price, price),
        banner,
        tag,
        is_new: false,
        owned: owned_entirely,
        is_giftable: entry.is_giftable,
        // A bundle can only be refunded while every item is still held
        // through it
        is_refundable: entry.is_refundable && owned_entirely,
        expires_at: entry.out_date,
        sort_priority: entry.sort_priority,
        layout_category,
        layout: layout_info(entry),
        items: Some(items),
    }
}

/// Resolve a single-item offer into a tile. An item acquired through a
/// bundle is never individually refundable.
pub fn resolve_single_item(
    entry: &ShopEntry,
    cosmetic: &CosmeticWithVariant,
    owned: &OwnedMap,
) -> ShopItem {
    let variant = cosmetic.variant.as_ref();
    let price = entry
        .final_price
        .or(variant.and_then(|v| v.price))
        .unwrap_or(0);
    let regular_price = entry.regular_price.unwrap_or(price);

    let ownership = owned.get(&cosmetic.cosmetic.id);
    let owned_via_bundle = matches!(ownership, Some(Some(_)));

    let banner = banner_of(entry);
    let tag = tag_of(entry);
    let layout_category = categorize(entry.layout_name.as_deref(), banner.is_some(), tag.is_some());

    ShopItem {
        offer_id: entry.offer_id.clone(),
        id: cosmetic.cosmetic.id.clone(),
        kind: ShopItemKind::Item,
        name: cosmetic.cosmetic.name.clone(),
        description: cosmetic.cosmetic.description.clone(),
        item_type: cosmetic.cosmetic.item_type.clone(),
        rarity: cosmetic.cosmetic.rarity.clone(),
        series: cosmetic.cosmetic.series.clone(),
        set_name: cosmetic.cosmetic.set_name.clone(),
        category: Some(cosmetic.cosmetic.category),
        image: cosmetic.image().map(str::to_string),
        price,
        regular_price,
        is_on_sale: regular_price > 0 && price < regular_price,
        discount: discount_percent(regular_price, price),
        banner,
        tag,
        is_new: variant.map(|v| v.is_new).unwrap_or(false),
        owned: ownership.is_some(),
        is_giftable: entry.is_giftable,
        // Only a directly-held item is refundable; bundle-acquired items go
        // through the bundle refund
        is_refundable: entry.is_refundable && ownership.is_some() && !owned_via_bundle,
        expires_at: entry.out_date,
        sort_priority: entry.sort_priority,
        layout_category,
        layout: layout_info(entry),
        items: None,
    }
}

fn sort_key(item: &ShopItem) -> i32 {
    item.sort_priority.unwrap_or(DEFAULT_SORT_PRIORITY)
}

fn themed_section(base: &str, mut items: Vec<ShopItem>) -> ShopSection {
    items.sort_by_key(sort_key);
    let first = &items[0];

    let title = first
        .layout
        .title
        .clone()
        .or_else(|| (first.kind == ShopItemKind::Bundle).then(|| first.name.clone()))
        .or_else(|| first.layout.name.clone())
        .unwrap_or_else(|| base.to_string());
    let featured_image = first.image.clone();
    let discount = items.iter().map(|i| i.discount).max().filter(|d| *d > 0);

    ShopSection {
        title,
        section_type: SectionType::Themed,
        subtitle: first.layout.subtitle.clone(),
        cta: first.layout.cta.clone(),
        theme: Some(base.to_string()),
        layout_id: first.layout.id.clone(),
        background_image: first.layout.background.clone(),
        foreground_image: first.layout.foreground.clone(),
        banner_logo: first.layout.banner.clone(),
        body_image: first.layout.body_image.clone(),
        alignment: Some(
            first
                .layout
                .alignment
                .clone()
                .unwrap_or_else(|| "center".into()),
        ),
        display_type: Some(
            first
                .layout
                .display_type
                .clone()
                .unwrap_or_else(|| "billboard".into()),
        ),
        tile_size: first.layout.tile_size.clone(),
        featured_image,
        discount,
        count: items.len(),
        items,
    }
}

/// Group resolved tiles into the final section map: themed groups first,
/// in order of appearance, then the fixed featured / daily / special
/// buckets. Groups need at least two members; singletons fall back to
/// their bucket.
pub fn group_items(items: Vec<ShopItem>) -> ShopSections {
    let mut groups: Vec<(String, Vec<ShopItem>)> = Vec::new();
    let mut ungrouped: Vec<ShopItem> = Vec::new();

    for item in items {
        match item.layout.id.as_deref().map(layout_base) {
            Some(base) => {
                let base = base.to_string();
                match groups.iter_mut().find(|(b, _)| *b == base) {
                    Some((_, members)) => members.push(item),
                    None => groups.push((base, vec![item])),
                }
            }
            None => ungrouped.push(item),
        }
    }

    let mut sections = ShopSections::default();
    let mut index = 0;
    for (base, members) in groups {
        if members.len() < 2 {
            ungrouped.extend(members);
            continue;
        }
        sections.insert(format!("layout_{index}"), themed_section(&base, members));
        index += 1;
    }

    let mut featured = Vec::new();
    let mut daily = Vec::new();
    let mut special = Vec::new();
    for item in ungrouped {
        match item.layout_category {
            LayoutCategory::Featured => featured.push(item),
            LayoutCategory::Daily => daily.push(item),
            LayoutCategory::Special => special.push(item),
        }
    }
    for bucket in [&mut featured, &mut daily, &mut special] {
        bucket.sort_by_key(sort_key);
    }

    if !featured.is_empty() {
        sections.insert("featured", ShopSection::standard("Featured", featured));
    }
    if !daily.is_empty() {
        sections.insert("daily", ShopSection::standard("Daily Items", daily));
    }
    if !special.is_empty() {
        sections.insert("special", ShopSection::standard("Special Offers", special));
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::{Category, CosmeticVariant, VariantDetails};
    use shared::models::cosmetic::{BrDetails, Cosmetic};

    fn entry(offer_id: &str) -> ShopEntry {
        ShopEntry {
            offer_id: offer_id.into(),
            dev_name: None,
            final_price: Some(800),
            regular_price: Some(1000),
            in_date: None,
            out_date: None,
            banner_text: None,
            banner_intensity: None,
            banner_backend_value: None,
            offer_tag_id: None,
            offer_tag_text: None,
            layout_id: None,
            layout_name: None,
            sort_priority: None,
            is_giftable: false,
            is_refundable: true,
            bundle_id: None,
            cosmetic_id: None,
            track_id: None,
            instrument_id: None,
            car_id: None,
            lego_kit_id: None,
            layout_background: None,
            layout_foreground: None,
            layout_banner: None,
            layout_body_image: None,
            layout_alignment: None,
            layout_title: None,
            layout_subtitle: None,
            layout_cta: None,
            display_type: None,
            tile_size: None,
            raw_data: None,
            updated_at: Utc::now(),
        }
    }

    fn cosmetic(id: &str, name: &str) -> CosmeticWithVariant {
        CosmeticWithVariant {
            cosmetic: Cosmetic {
                id: id.into(),
                name: name.into(),
                description: Some(format!("{name} description")),
                item_type: Some("Outfit".into()),
                rarity: Some("Epic".into()),
                series: None,
                set_name: None,
                category: Category::Br,
                added_at: None,
                shop_history: Vec::new(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            variant: Some(CosmeticVariant {
                details: VariantDetails::Br(BrDetails {
                    image_icon: Some(format!("https://img/{id}.png")),
                    ..Default::default()
                }),
                price: Some(1200),
                is_new: true,
                is_on_sale: true,
            }),
        }
    }

    fn bundle(name: &str) -> Bundle {
        Bundle {
            id: Uuid::new_v4(),
            name: name.into(),
            info: Some("Two for one".into()),
            image_url: Some("https://img/bundle.png".into()),
            price: Some(2000),
        }
    }

    #[test]
    fn discount_rounds_to_nearest_percent() {
        assert_eq!(discount_percent(1000, 800), 20);
        assert_eq!(discount_percent(1500, 1000), 33);
        assert_eq!(discount_percent(1000, 1000), 0);
        assert_eq!(discount_percent(0, 500), 0);
        assert_eq!(discount_percent(800, 1000), 0);
    }

    #[test]
    fn categorize_prefers_layout_name_over_markers() {
        assert_eq!(
            categorize(Some("Featured Row"), false, false),
            LayoutCategory::Featured
        );
        assert_eq!(
            categorize(Some("Daily Rotation"), true, true),
            LayoutCategory::Daily
        );
        assert_eq!(categorize(Some("Music"), true, false), LayoutCategory::Special);
        assert_eq!(categorize(None, false, true), LayoutCategory::Special);
        assert_eq!(categorize(Some("Music"), false, false), LayoutCategory::Daily);
        assert_eq!(categorize(None, false, false), LayoutCategory::Daily);
    }

    #[test]
    fn layout_base_strips_numeric_suffix() {
        assert_eq!(layout_base("SimpsonsBart.99"), "SimpsonsBart");
        assert_eq!(layout_base("Daily"), "Daily");
    }

    #[test]
    fn single_item_price_falls_back_to_variant() {
        let mut e = entry("offer-1");
        e.final_price = None;
        e.regular_price = None;
        let item = resolve_single_item(&e, &cosmetic("CID_1", "Renegade"), &OwnedMap::new());
        assert_eq!(item.price, 1200);
        assert_eq!(item.regular_price, 1200);
        assert!(!item.is_on_sale);
        assert_eq!(item.discount, 0);
        assert!(item.is_new);
        assert!(!item.owned);
    }

    #[test]
    fn unheld_item_is_not_refundable() {
        let e = entry("offer-1");
        let item = resolve_single_item(&e, &cosmetic("CID_1", "Renegade"), &OwnedMap::new());
        assert!(e.is_refundable);
        assert!(!item.owned);
        assert!(!item.is_refundable);
    }

    #[test]
    fn bundle_acquired_item_is_not_refundable() {
        let e = entry("offer-1");
        let c = cosmetic("CID_1", "Renegade");

        let mut owned = OwnedMap::new();
        owned.insert("CID_1".into(), None);
        let item = resolve_single_item(&e, &c, &owned);
        assert!(item.owned);
        assert!(item.is_refundable);

        owned.insert("CID_1".into(), Some(Uuid::new_v4()));
        let item = resolve_single_item(&e, &c, &owned);
        assert!(item.owned);
        assert!(!item.is_refundable);
    }

    #[test]
    fn implicit_bundle_borrows_first_item_display() {
        let e = entry("v2:/abc");
        let b = Bundle {
            name: "Bundle_v2:/abc".into(),
            image_url: None,
            ..bundle("ignored")
        };
        let items = vec![cosmetic("CID_1", "Renegade"), cosmetic("CID_2", "Raider")];
        let tile = resolve_bundle_item(&e, &b, &items, &OwnedMap::new());

        assert_eq!(tile.kind, ShopItemKind::Bundle);
        assert_eq!(tile.name, "Renegade");
        assert_eq!(tile.description.as_deref(), Some("Renegade description"));
        assert_eq!(tile.image.as_deref(), Some("https://img/CID_1.png"));
        assert_eq!(tile.items.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn explicit_bundle_keeps_its_own_display() {
        let e = entry("offer-2");
        let b = bundle("Autumn Queen Pack");
        let items = vec![cosmetic("CID_1", "Renegade")];
        let tile = resolve_bundle_item(&e, &b, &items, &OwnedMap::new());
        assert_eq!(tile.name, "Autumn Queen Pack");
        assert_eq!(tile.image.as_deref(), Some("https://img/bundle.png"));
        assert_eq!(tile.description.as_deref(), Some("Two for one"));
    }

    #[test]
    fn bundle_owned_only_when_all_items_came_from_it() {
        let e = entry("offer-2");
        let b = bundle("Autumn Queen Pack");
        let items = vec![cosmetic("CID_1", "Renegade"), cosmetic("CID_2", "Raider")];

        let mut owned = OwnedMap::new();
        owned.insert("CID_1".into(), Some(b.id));
        let tile = resolve_bundle_item(&e, &b, &items, &owned);
        assert!(!tile.owned);
        assert!(!tile.is_refundable);

        owned.insert("CID_2".into(), Some(b.id));
        let tile = resolve_bundle_item(&e, &b, &items, &owned);
        assert!(tile.owned);
        assert!(tile.is_refundable);
    }

    fn tile(offer_id: &str, layout_id: Option<&str>, priority: Option<i32>) -> ShopItem {
        let mut e = entry(offer_id);
        e.layout_id = layout_id.map(str::to_string);
        e.sort_priority = priority;
        resolve_single_item(&e, &cosmetic(offer_id, offer_id), &OwnedMap::new())
    }

    #[test]
    fn shared_layout_base_forms_a_themed_section() {
        let sections = group_items(vec![
            tile("a", Some("Simpsons.1"), Some(2)),
            tile("b", Some("Simpsons.2"), Some(1)),
            tile("c", None, None),
        ]);

        let themed = sections.get("layout_0").unwrap();
        assert_eq!(themed.section_type, SectionType::Themed);
        assert_eq!(themed.theme.as_deref(), Some("Simpsons"));
        assert_eq!(themed.count, 2);
        assert_eq!(themed.items[0].offer_id, "b");
        assert_eq!(themed.alignment.as_deref(), Some("center"));
        assert_eq!(themed.display_type.as_deref(), Some("billboard"));

        let daily = sections.get("daily").unwrap();
        assert_eq!(daily.items[0].offer_id, "c");
    }

    #[test]
    fn singleton_groups_fall_back_to_their_bucket() {
        let sections = group_items(vec![
            tile("a", Some("Lonely.1"), None),
            tile("b", Some("Other.1"), None),
        ]);
        assert!(sections.get("layout_0").is_none());
        assert_eq!(sections.get("daily").unwrap().count, 2);
    }

    #[test]
    fn buckets_appear_only_when_populated() {
        let mut featured = entry("f");
        featured.layout_name = Some("Featured".into());
        let featured_tile =
            resolve_single_item(&featured, &cosmetic("f", "f"), &OwnedMap::new());

        let mut special = entry("s");
        special.offer_tag_text = Some("Last chance!".into());
        let special_tile = resolve_single_item(&special, &cosmetic("s", "s"), &OwnedMap::new());

        let sections = group_items(vec![featured_tile, special_tile]);
        assert!(sections.get("featured").is_some());
        assert!(sections.get("special").is_some());
        assert!(sections.get("daily").is_none());
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn bucket_items_sort_by_priority_with_default() {
        let sections = group_items(vec![
            tile("low", None, Some(500)),
            tile("none", None, None),
            tile("high", None, Some(1)),
        ]);
        let daily = sections.get("daily").unwrap();
        let order: Vec<&str> = daily.items.iter().map(|i| i.offer_id.as_str()).collect();
        assert_eq!(order, ["high", "low", "none"]);
    }
}
