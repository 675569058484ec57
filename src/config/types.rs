use crate::browser::{CardSelectors, WaitPolicy};
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Deal Harvester
///
/// Every section is optional; a missing section falls back to the built-in
/// Trendyol profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub selectors: CardSelectors,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
}

/// How prices are written on the source catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceFormat {
    /// `1.299,90`: dot groups thousands, comma marks decimals
    #[default]
    Comma,
    /// `1,299.90`: comma groups thousands, dot marks decimals
    Point,
}

/// Source catalog description
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Tag written into every record's `site` field
    pub name: String,

    /// Origin that relative product links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Search endpoint template; `{query}` is replaced by the search term
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Price notation used by the catalog
    #[serde(rename = "price-format")]
    pub price_format: PriceFormat,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Trendyol".to_string(),
            base_url: "https://www.trendyol.com".to_string(),
            search_url: "https://www.trendyol.com/sr?q={query}&pi=1".to_string(),
            price_format: PriceFormat::Comma,
        }
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Search terms, visited in order
    pub queries: Vec<String>,

    /// Cards read from each results page, in DOM order
    #[serde(rename = "max-cards-per-query")]
    pub max_cards_per_query: usize,

    /// Smallest discount label a card may carry to be kept
    #[serde(rename = "min-discount-percent")]
    pub min_discount_percent: u32,

    /// Upper bound on the final result set
    #[serde(rename = "max-results")]
    pub max_results: usize,

    /// Pause between consecutive queries (milliseconds)
    #[serde(rename = "query-delay-ms")]
    pub query_delay_ms: u64,

    /// Bound on each page navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Bound on waiting for the card container (milliseconds)
    #[serde(rename = "selector-timeout-ms")]
    pub selector_timeout_ms: u64,

    /// When a navigation counts as finished
    #[serde(rename = "wait-until")]
    pub wait_until: WaitPolicy,
}

impl CrawlerConfig {
    pub fn query_delay(&self) -> Duration {
        Duration::from_millis(self.query_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn selector_timeout(&self) -> Duration {
        Duration::from_millis(self.selector_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            queries: ["elektronik", "telefon", "bilgisayar", "ev-yasam", "moda"]
                .iter()
                .map(|q| q.to_string())
                .collect(),
            max_cards_per_query: 20,
            min_discount_percent: 40,
            max_results: 50,
            query_delay_ms: 2_000,
            navigation_timeout_ms: 30_000,
            selector_timeout_ms: 10_000,
            wait_until: WaitPolicy::NetworkIdle,
        }
    }
}

/// Browser session configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// User agent presented to the catalog
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// `Accept-Language` header value
    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Optional `Referer` header value
    pub referer: Option<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept_language: "tr-TR,tr;q=0.9,en;q=0.8".to_string(),
            referer: Some("https://www.trendyol.com/".to_string()),
        }
    }
}
