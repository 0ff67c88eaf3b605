//! Bundle models
//!
//! A bundle groups cosmetics sold together as one offer. Explicit bundles
//! carry the provider's real name; implicit bundles are synthesized by the
//! ingestion pipeline when an offer groups multiple items without declaring
//! a bundle, and are named from the offer's dev-name or offer id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cosmetic::CosmeticWithVariant;

/// Name prefixes that mark a synthesized (implicit) bundle
const IMPLICIT_PREFIXES: [&str; 2] = ["Bundle_", "[VIRTUAL]"];

/// True if a bundle name carries the synthetic marker
pub fn is_implicit_bundle_name(name: &str) -> bool {
    IMPLICIT_PREFIXES.iter().any(|p| name.starts_with(p))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Bundle {
    pub id: Uuid,
    pub name: String,
    pub info: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>,
}

impl Bundle {
    pub fn is_implicit(&self) -> bool {
        is_implicit_bundle_name(&self.name)
    }
}

/// Bundle with its contained cosmetics resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleWithItems {
    #[serde(flatten)]
    pub bundle: Bundle,
    pub cosmetics: Vec<CosmeticWithVariant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_markers_detected() {
        assert!(is_implicit_bundle_name("Bundle_v2-offer-123"));
        assert!(is_implicit_bundle_name("[VIRTUAL]AutumnQueen"));
        assert!(!is_implicit_bundle_name("Shadow Legends Pack"));
        // marker only counts at the start of the name
        assert!(!is_implicit_bundle_name("Western Bundle_Pack"));
    }
}
