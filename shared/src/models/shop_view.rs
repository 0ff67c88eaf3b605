//! Assembled "current shop" view types
//!
//! Produced by the storefront assembler from active shop entries, bundle
//! contents and the viewer's ownership. Serialize-only: this is a server
//! output shape, never parsed back.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::SerializeMap;

use super::cosmetic::Category;

/// What a shop item resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopItemKind {
    Bundle,
    Item,
}

/// Fixed bucket for items that do not belong to a themed section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutCategory {
    Featured,
    Daily,
    Special,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopBanner {
    pub text: String,
    pub intensity: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferTag {
    pub id: Option<String>,
    pub text: String,
}

/// Layout presentation metadata carried from the source offer
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub background: Option<String>,
    pub foreground: Option<String>,
    pub banner: Option<String>,
    pub body_image: Option<String>,
    pub alignment: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub cta: Option<String>,
    pub display_type: Option<String>,
    pub tile_size: Option<String>,
}

/// Compact view of one cosmetic inside a bundle tile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleItemSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub category: Category,
    pub image: Option<String>,
    pub owned: bool,
}

/// One resolved shop tile — either a bundle or an individual item
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub offer_id: String,
    /// Bundle id or cosmetic id, depending on `kind`
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ShopItemKind,
    pub name: String,
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub rarity: Option<String>,
    pub series: Option<String>,
    pub set_name: Option<String>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub price: i64,
    pub regular_price: i64,
    pub is_on_sale: bool,
    /// Percent off the regular price, 0 when not discounted
    pub discount: i64,
    pub banner: Option<ShopBanner>,
    pub tag: Option<OfferTag>,
    pub is_new: bool,
    pub owned: bool,
    pub is_giftable: bool,
    pub is_refundable: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub sort_priority: Option<i32>,
    pub layout_category: LayoutCategory,
    pub layout: LayoutInfo,
    /// Contained cosmetics, bundles only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<BundleItemSummary>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Themed,
    Standard,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopSection {
    pub title: String,
    #[serde(rename = "type")]
    pub section_type: SectionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<i64>,
    pub items: Vec<ShopItem>,
    pub count: usize,
}

impl ShopSection {
    /// Plain section with no theme metadata (featured / daily / special)
    pub fn standard(title: impl Into<String>, items: Vec<ShopItem>) -> Self {
        let count = items.len();
        Self {
            title: title.into(),
            section_type: SectionType::Standard,
            subtitle: None,
            cta: None,
            theme: None,
            layout_id: None,
            background_image: None,
            foreground_image: None,
            banner_logo: None,
            body_image: None,
            alignment: None,
            display_type: None,
            tile_size: None,
            featured_image: None,
            discount: None,
            items,
            count,
        }
    }
}

/// Ordered section-key → section map. Serialized as a JSON object in
/// insertion order (themed sections first, then the fixed buckets).
#[derive(Debug, Clone, Default)]
pub struct ShopSections(pub Vec<(String, ShopSection)>);

impl ShopSections {
    pub fn insert(&mut self, key: impl Into<String>, section: ShopSection) {
        self.0.push((key.into(), section));
    }

    pub fn get(&self, key: &str) -> Option<&ShopSection> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ShopSection)> {
        self.0.iter()
    }
}

impl Serialize for ShopSections {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, section) in &self.0 {
            map.serialize_entry(key, section)?;
        }
        map.end()
    }
}

/// The full assembled shop response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopView {
    /// Next scheduled storefront refresh instant
    pub refresh_date: DateTime<Utc>,
    pub sections: ShopSections,
    pub total_items: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_serialize_in_insertion_order() {
        let mut sections = ShopSections::default();
        sections.insert("zeta", ShopSection::standard("Zeta", vec![]));
        sections.insert("alpha", ShopSection::standard("Alpha", vec![]));
        sections.insert("featured", ShopSection::standard("Featured", vec![]));

        let json = serde_json::to_string(&sections).unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let alpha = json.find("\"alpha\"").unwrap();
        let featured = json.find("\"featured\"").unwrap();
        assert!(zeta < alpha && alpha < featured);
    }

    #[test]
    fn standard_section_omits_theme_fields() {
        let section = ShopSection::standard("Daily", vec![]);
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["type"], "standard");
        assert_eq!(json["count"], 0);
        assert!(json.get("subtitle").is_none());
        assert!(json.get("backgroundImage").is_none());
    }

    #[test]
    fn sections_lookup_by_key() {
        let mut sections = ShopSections::default();
        sections.insert("daily", ShopSection::standard("Daily", vec![]));
        assert!(sections.get("daily").is_some());
        assert!(sections.get("weekly").is_none());
        assert_eq!(sections.len(), 1);
    }
}
