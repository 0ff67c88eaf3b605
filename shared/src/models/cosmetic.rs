//! Cosmetic catalog models
//!
//! A `Cosmetic` is the base catalog entity; exactly one category-specific
//! variant payload attaches to it. The variant is a tagged union at the
//! domain layer — persisted as a single row (kind discriminant + payload),
//! so the at-most-one invariant holds structurally and there is no
//! precedence chain to resolve "the" specialized record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "category", rename_all = "UPPERCASE"))]
pub enum Category {
    Br,
    Track,
    Instrument,
    Car,
    Lego,
    LegoKit,
    Bean,
}

/// Base cosmetic entity. `id` is the external provider's stable id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Cosmetic {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub series: Option<String>,
    pub set_name: Option<String>,
    pub category: Category,
    pub added_at: Option<DateTime<Utc>>,
    /// ISO dates on which the item has appeared in the shop
    pub shop_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Variant discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Br,
    Track,
    Instrument,
    Car,
    LegoItem,
    LegoKit,
    Bean,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Br => "br",
            Self::Track => "track",
            Self::Instrument => "instrument",
            Self::Car => "car",
            Self::LegoItem => "lego_item",
            Self::LegoKit => "lego_kit",
            Self::Bean => "bean",
        }
    }
}

impl std::str::FromStr for VariantKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "br" => Ok(Self::Br),
            "track" => Ok(Self::Track),
            "instrument" => Ok(Self::Instrument),
            "car" => Ok(Self::Car),
            "lego_item" => Ok(Self::LegoItem),
            "lego_kit" => Ok(Self::LegoKit),
            "bean" => Ok(Self::Bean),
            other => Err(format!("unknown variant kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrDetails {
    pub image_small_icon: Option<String>,
    pub image_icon: Option<String>,
    pub image_featured: Option<String>,
    pub introduction: Option<String>,
    pub search_tags: Option<Vec<String>>,
    pub gameplay_tags: Option<Vec<String>>,
    pub meta_tags: Option<Vec<String>>,
    pub showcase_video: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackDetails {
    pub dev_name: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub release_year: Option<i32>,
    pub bpm: Option<i32>,
    pub duration: Option<i32>,
    pub genres: Option<Vec<String>>,
    pub album_art: Option<String>,
    pub gameplay_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstrumentDetails {
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    pub gameplay_tags: Option<Vec<String>>,
    pub showcase_video: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarDetails {
    pub vehicle_id: Option<String>,
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    pub gameplay_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegoItemDetails {
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    pub image_wide: Option<String>,
    pub sound_library_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegoKitDetails {
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    pub image_wide: Option<String>,
    pub gameplay_tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BeanDetails {
    pub gender: Option<String>,
    pub image_small: Option<String>,
    pub image_large: Option<String>,
    pub gameplay_tags: Option<Vec<String>>,
}

/// Category-specific payload of a cosmetic variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum VariantDetails {
    Br(BrDetails),
    Track(TrackDetails),
    Instrument(InstrumentDetails),
    Car(CarDetails),
    LegoItem(LegoItemDetails),
    LegoKit(LegoKitDetails),
    Bean(BeanDetails),
}

impl VariantDetails {
    pub fn kind(&self) -> VariantKind {
        match self {
            Self::Br(_) => VariantKind::Br,
            Self::Track(_) => VariantKind::Track,
            Self::Instrument(_) => VariantKind::Instrument,
            Self::Car(_) => VariantKind::Car,
            Self::LegoItem(_) => VariantKind::LegoItem,
            Self::LegoKit(_) => VariantKind::LegoKit,
            Self::Bean(_) => VariantKind::Bean,
        }
    }

    /// Untagged payload for persistence (the kind lives in its own column)
    pub fn payload(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::Br(d) => serde_json::to_value(d),
            Self::Track(d) => serde_json::to_value(d),
            Self::Instrument(d) => serde_json::to_value(d),
            Self::Car(d) => serde_json::to_value(d),
            Self::LegoItem(d) => serde_json::to_value(d),
            Self::LegoKit(d) => serde_json::to_value(d),
            Self::Bean(d) => serde_json::to_value(d),
        }
    }

    /// Rebuild from a stored (kind, payload) pair
    pub fn from_parts(kind: &str, data: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::json!({ "kind": kind, "data": data }))
    }
}

/// The single specialized record attached to a cosmetic, including the three
/// shop-state fields mutated by re-ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosmeticVariant {
    #[serde(flatten)]
    pub details: VariantDetails,
    /// Last known shop price, if the item has ever been priced
    pub price: Option<i64>,
    pub is_new: bool,
    pub is_on_sale: bool,
}

impl CosmeticVariant {
    /// Best display image for this variant, in the same precedence the
    /// storefront uses (featured art first, then icons).
    pub fn image(&self) -> Option<&str> {
        match &self.details {
            VariantDetails::Br(d) => d
                .image_featured
                .as_deref()
                .or(d.image_icon.as_deref())
                .or(d.image_small_icon.as_deref()),
            VariantDetails::Track(d) => d.album_art.as_deref(),
            VariantDetails::Instrument(d) => d.image_large.as_deref().or(d.image_small.as_deref()),
            VariantDetails::Car(d) => d.image_large.as_deref().or(d.image_small.as_deref()),
            VariantDetails::LegoItem(d) => d.image_large.as_deref().or(d.image_small.as_deref()),
            VariantDetails::LegoKit(d) => d.image_large.as_deref().or(d.image_small.as_deref()),
            VariantDetails::Bean(d) => d.image_large.as_deref().or(d.image_small.as_deref()),
        }
    }
}

/// Cosmetic with its variant resolved — the API detail/list shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CosmeticWithVariant {
    #[serde(flatten)]
    pub cosmetic: Cosmetic,
    pub variant: Option<CosmeticVariant>,
}

impl CosmeticWithVariant {
    pub fn image(&self) -> Option<&str> {
        self.variant.as_ref().and_then(|v| v.image())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_details_roundtrip_through_parts() {
        let details = VariantDetails::Track(TrackDetails {
            title: Some("Night Drive".into()),
            artist: Some("Neon Echo".into()),
            bpm: Some(128),
            ..Default::default()
        });
        let payload = details.payload().unwrap();
        let back = VariantDetails::from_parts(details.kind().as_str(), payload).unwrap();
        match back {
            VariantDetails::Track(t) => {
                assert_eq!(t.title.as_deref(), Some("Night Drive"));
                assert_eq!(t.bpm, Some(128));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn from_parts_rejects_unknown_kind() {
        assert!(VariantDetails::from_parts("hat", serde_json::json!({})).is_err());
    }

    #[test]
    fn br_image_prefers_featured_art() {
        let v = CosmeticVariant {
            details: VariantDetails::Br(BrDetails {
                image_icon: Some("icon.png".into()),
                image_featured: Some("featured.png".into()),
                ..Default::default()
            }),
            price: None,
            is_new: false,
            is_on_sale: false,
        };
        assert_eq!(v.image(), Some("featured.png"));
    }

    #[test]
    fn category_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Category::LegoKit).unwrap(),
            "\"LEGOKIT\""
        );
        let c: Category = serde_json::from_str("\"BR\"").unwrap();
        assert_eq!(c, Category::Br);
    }
}
