//! Wire types for the external cosmetics provider
//!
//! Every field is optional: the provider frequently drops or renames
//! sub-objects between builds, and ingestion must survive any absence.
//! Unknown fields are ignored; lists default to empty.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeInfo {
    pub value: Option<String>,
    pub display_value: Option<String>,
    pub backend_value: Option<String>,
}

impl TypeInfo {
    /// Display value with the raw value as fallback
    pub fn display(&self) -> Option<String> {
        self.display_value.clone().or_else(|| self.value.clone())
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SeriesInfo {
    pub value: Option<String>,
    pub image: Option<String>,
    pub backend_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SetInfo {
    pub value: Option<String>,
    pub text: Option<String>,
    pub backend_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IntroductionInfo {
    pub chapter: Option<String>,
    pub season: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BrImages {
    pub small_icon: Option<String>,
    pub icon: Option<String>,
    pub featured: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SimpleImages {
    pub small: Option<String>,
    pub large: Option<String>,
    pub wide: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrItemDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: Option<TypeInfo>,
    #[serde(default)]
    pub rarity: Option<TypeInfo>,
    #[serde(default)]
    pub series: Option<SeriesInfo>,
    #[serde(default)]
    pub set: Option<SetInfo>,
    #[serde(default)]
    pub introduction: Option<IntroductionInfo>,
    #[serde(default)]
    pub images: Option<BrImages>,
    #[serde(default)]
    pub search_tags: Option<Vec<String>>,
    #[serde(default)]
    pub gameplay_tags: Option<Vec<String>>,
    #[serde(default)]
    pub meta_tags: Option<Vec<String>>,
    #[serde(default)]
    pub showcase_video: Option<String>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub shop_history: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDto {
    pub id: String,
    #[serde(default)]
    pub dev_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub bpm: Option<i32>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub album_art: Option<String>,
    #[serde(default)]
    pub gameplay_tags: Option<Vec<String>>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub shop_history: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: Option<TypeInfo>,
    #[serde(default)]
    pub rarity: Option<TypeInfo>,
    #[serde(default)]
    pub series: Option<SeriesInfo>,
    #[serde(default)]
    pub images: Option<SimpleImages>,
    #[serde(default)]
    pub gameplay_tags: Option<Vec<String>>,
    #[serde(default)]
    pub showcase_video: Option<String>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub shop_history: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDto {
    pub id: String,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: Option<TypeInfo>,
    #[serde(default)]
    pub rarity: Option<TypeInfo>,
    #[serde(default)]
    pub series: Option<SeriesInfo>,
    #[serde(default)]
    pub images: Option<SimpleImages>,
    #[serde(default)]
    pub gameplay_tags: Option<Vec<String>>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub shop_history: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegoItemDto {
    pub id: String,
    #[serde(default)]
    pub cosmetic_id: Option<String>,
    #[serde(default)]
    pub sound_library_tags: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<SimpleImages>,
    #[serde(default)]
    pub added: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegoKitDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: Option<TypeInfo>,
    #[serde(default)]
    pub series: Option<SeriesInfo>,
    #[serde(default)]
    pub images: Option<SimpleImages>,
    #[serde(default)]
    pub gameplay_tags: Option<Vec<String>>,
    #[serde(default)]
    pub added: Option<String>,
    #[serde(default)]
    pub shop_history: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeanDto {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub images: Option<SimpleImages>,
    #[serde(default)]
    pub gameplay_tags: Option<Vec<String>>,
    #[serde(default)]
    pub added: Option<String>,
}

/// Category arrays of the catalog feed. The new-items feed nests the same
/// shape under an `items` key.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogData {
    pub br: Vec<BrItemDto>,
    pub tracks: Vec<TrackDto>,
    pub instruments: Vec<InstrumentDto>,
    pub cars: Vec<CarDto>,
    pub lego: Vec<LegoItemDto>,
    pub lego_kits: Vec<LegoKitDto>,
    pub beans: Vec<BeanDto>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewItemsData {
    pub date: Option<String>,
    pub build: Option<String>,
    pub items: Option<CatalogData>,
}

// ── Storefront feed ──

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleInfoDto {
    pub name: Option<String>,
    pub info: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerDto {
    pub value: Option<String>,
    pub intensity: Option<String>,
    pub backend_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OfferTagDto {
    pub id: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataEntry {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub index: Option<i32>,
    pub display_type: Option<String>,
    pub texture_metadata: Vec<MetadataEntry>,
    pub string_metadata: Vec<MetadataEntry>,
    pub text_metadata: Vec<MetadataEntry>,
}

impl LayoutDto {
    fn lookup(entries: &[MetadataEntry], key: &str) -> Option<String> {
        entries
            .iter()
            .find(|e| e.key.as_deref() == Some(key))
            .and_then(|e| e.value.clone())
    }

    pub fn texture(&self, key: &str) -> Option<String> {
        Self::lookup(&self.texture_metadata, key)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        Self::lookup(&self.string_metadata, key)
    }

    pub fn text(&self, key: &str) -> Option<String> {
        Self::lookup(&self.text_metadata, key)
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ShopEntryDto {
    pub offer_id: Option<String>,
    pub dev_name: Option<String>,
    pub regular_price: Option<i64>,
    pub final_price: Option<i64>,
    pub in_date: Option<String>,
    pub out_date: Option<String>,
    pub bundle: Option<BundleInfoDto>,
    pub banner: Option<BannerDto>,
    pub offer_tag: Option<OfferTagDto>,
    pub giftable: Option<bool>,
    pub refundable: Option<bool>,
    pub sort_priority: Option<i32>,
    pub layout_id: Option<String>,
    pub layout: Option<LayoutDto>,
    pub tile_size: Option<String>,
    pub br_items: Vec<BrItemDto>,
    pub tracks: Vec<TrackDto>,
    pub instruments: Vec<InstrumentDto>,
    pub cars: Vec<CarDto>,
    pub lego_kits: Vec<LegoKitDto>,
}

// ── Response envelopes ──

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CatalogResponse {
    pub data: CatalogData,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct NewItemsResponse {
    pub data: NewItemsData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_parses_with_everything_absent() {
        let dto: ShopEntryDto = serde_json::from_value(json!({})).unwrap();
        assert!(dto.offer_id.is_none());
        assert!(dto.br_items.is_empty());
    }

    #[test]
    fn entry_parses_nested_metadata() {
        let dto: ShopEntryDto = serde_json::from_value(json!({
            "offerId": "v2:/abc",
            "finalPrice": 1800,
            "layout": {
                "id": "SimpsonsBart.99",
                "name": "Featured Row",
                "textureMetadata": [{"key": "background", "value": "https://x/bg.png"}],
                "textMetadata": [{"key": "title", "value": "Springfield"}],
                "stringMetadata": [{"key": "alignment", "value": "left"}]
            },
            "brItems": [{"id": "CID_1", "name": "Bart", "type": {"displayValue": "Outfit"}}]
        }))
        .unwrap();

        assert_eq!(dto.final_price, Some(1800));
        let layout = dto.layout.unwrap();
        assert_eq!(layout.texture("background").as_deref(), Some("https://x/bg.png"));
        assert_eq!(layout.text("title").as_deref(), Some("Springfield"));
        assert_eq!(layout.string("alignment").as_deref(), Some("left"));
        assert_eq!(dto.br_items[0].item_type.as_ref().unwrap().display().as_deref(), Some("Outfit"));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let dto: BrItemDto = serde_json::from_value(json!({
            "id": "CID_2",
            "name": "Peely",
            "dynamicPakId": "something",
            "newDisplayAsset": {"deep": ["structure"]}
        }))
        .unwrap();
        assert_eq!(dto.name.as_deref(), Some("Peely"));
    }

    #[test]
    fn new_items_feed_nests_under_items_key() {
        let resp: NewItemsResponse = serde_json::from_value(json!({
            "status": 200,
            "data": {
                "date": "2026-08-28",
                "items": {"tracks": [{"id": "sid_1", "title": "Night Drive"}]}
            }
        }))
        .unwrap();
        let items = resp.data.items.unwrap();
        assert_eq!(items.tracks.len(), 1);
        assert!(items.br.is_empty());
    }
}
