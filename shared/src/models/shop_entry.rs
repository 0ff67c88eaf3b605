//! Storefront offer models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One storefront offer as persisted. Exactly one of the six item-reference
/// slots (`bundle_id`, `cosmetic_id`, `track_id`, `instrument_id`, `car_id`,
/// `lego_kit_id`) is populated, depending on what the offer sells.
/// `raw_data` retains the verbatim source payload for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShopEntry {
    pub offer_id: String,
    pub dev_name: Option<String>,
    pub final_price: Option<i64>,
    pub regular_price: Option<i64>,
    /// Validity window; both null means always on offer
    pub in_date: Option<DateTime<Utc>>,
    pub out_date: Option<DateTime<Utc>>,
    pub banner_text: Option<String>,
    pub banner_intensity: Option<String>,
    pub banner_backend_value: Option<String>,
    pub offer_tag_id: Option<String>,
    pub offer_tag_text: Option<String>,
    pub layout_id: Option<String>,
    pub layout_name: Option<String>,
    pub sort_priority: Option<i32>,
    pub is_giftable: bool,
    pub is_refundable: bool,
    pub bundle_id: Option<Uuid>,
    pub cosmetic_id: Option<String>,
    pub track_id: Option<String>,
    pub instrument_id: Option<String>,
    pub car_id: Option<String>,
    pub lego_kit_id: Option<String>,
    // Layout presentation metadata, carried verbatim into themed sections
    pub layout_background: Option<String>,
    pub layout_foreground: Option<String>,
    pub layout_banner: Option<String>,
    pub layout_body_image: Option<String>,
    pub layout_alignment: Option<String>,
    pub layout_title: Option<String>,
    pub layout_subtitle: Option<String>,
    pub layout_cta: Option<String>,
    pub display_type: Option<String>,
    pub tile_size: Option<String>,
    pub raw_data: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl ShopEntry {
    /// The single cosmetic id this entry sells directly, if it is not a
    /// bundle offer. At most one of the five item slots is set.
    pub fn single_item_id(&self) -> Option<&str> {
        self.cosmetic_id
            .as_deref()
            .or(self.track_id.as_deref())
            .or(self.instrument_id.as_deref())
            .or(self.car_id.as_deref())
            .or(self.lego_kit_id.as_deref())
    }

    /// Validity-window check: unbounded when both dates are null, otherwise
    /// the window must contain `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match (self.in_date, self.out_date) {
            (None, None) => true,
            (Some(start), Some(end)) => start <= now && now <= end,
            (Some(start), None) => start <= now,
            (None, Some(end)) => now <= end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(in_date: Option<DateTime<Utc>>, out_date: Option<DateTime<Utc>>) -> ShopEntry {
        ShopEntry {
            offer_id: "offer-1".into(),
            dev_name: None,
            final_price: None,
            regular_price: None,
            in_date,
            out_date,
            banner_text: None,
            banner_intensity: None,
            banner_backend_value: None,
            offer_tag_id: None,
            offer_tag_text: None,
            layout_id: None,
            layout_name: None,
            sort_priority: None,
            is_giftable: false,
            is_refundable: false,
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

    #[test]
    fn unbounded_window_is_always_active() {
        assert!(entry(None, None).is_active_at(Utc::now()));
    }

    #[test]
    fn expired_window_is_inactive() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let e = entry(Some(start), Some(end));
        assert!(e.is_active_at(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()));
        assert!(!e.is_active_at(Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap()));
        assert!(!e.is_active_at(Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap()));
    }

    #[test]
    fn single_item_slot_resolution() {
        let mut e = entry(None, None);
        assert_eq!(e.single_item_id(), None);
        e.track_id = Some("track-9".into());
        assert_eq!(e.single_item_id(), Some("track-9"));
    }
}
