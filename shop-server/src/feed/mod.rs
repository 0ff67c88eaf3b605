//! HTTP client for the external cosmetics data provider
//!
//! Three JSON endpoints: the full catalog, newly-added items, and the
//! current storefront. Shop entries are returned as raw values so the
//! verbatim payload can be persisted alongside the parsed form.

pub mod types;

use crate::config::Config;
use crate::error::ServiceResult;

use types::CatalogData;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct FeedClient {
    http: reqwest::Client,
    base: String,
    language: String,
}

impl FeedClient {
    pub fn new(config: &Config) -> Result<Self, BoxError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.feed_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base: config.catalog_api_base.trim_end_matches('/').to_string(),
            language: config.catalog_language.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}?language={}", self.base, path, self.language)
    }

    /// Full cosmetics catalog, grouped by category arrays
    pub async fn fetch_catalog(&self) -> ServiceResult<CatalogData> {
        let resp: types::CatalogResponse = self
            .http
            .get(self.url("/cosmetics"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.data)
    }

    /// Newly-added cosmetics; empty when the feed carries no items block
    pub async fn fetch_new(&self) -> ServiceResult<CatalogData> {
        let resp: types::NewItemsResponse = self
            .http
            .get(self.url("/cosmetics/new"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(resp.data.items.unwrap_or_default())
    }

    /// Current storefront entries as raw JSON values. Individual entries
    /// are parsed (and possibly skipped) downstream so one malformed offer
    /// never aborts the run.
    pub async fn fetch_shop(&self) -> ServiceResult<Vec<serde_json::Value>> {
        let resp: serde_json::Value = self
            .http
            .get(self.url("/shop"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let entries = resp
            .pointer("/data/entries")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        Ok(entries)
    }
}
