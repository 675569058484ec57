use crate::product::ProductRecord;
use crate::HarvestError;
use serde::{Deserialize, Serialize};

/// Result of one crawl
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlOutcome {
    /// Deduplicated, bounded records in final order
    Success(Vec<ProductRecord>),
    /// Crawl-level failure description
    Failure(String),
}

impl CrawlOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CrawlOutcome::Success(_))
    }
}

/// The JSON payload handed to callers
///
/// Success: `{"success": true, "products": [...], "count": n}`
///
/// Failure: `{"success": false, "error": "...", "products": [], "count": 0}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub products: Vec<ProductRecord>,

    pub count: usize,
}

impl From<CrawlOutcome> for Envelope {
    fn from(outcome: CrawlOutcome) -> Self {
        match outcome {
            CrawlOutcome::Success(products) => Self {
                success: true,
                error: None,
                count: products.len(),
                products,
            },
            // Never carries partial results
            CrawlOutcome::Failure(message) => Self {
                success: false,
                error: Some(message),
                products: Vec::new(),
                count: 0,
            },
        }
    }
}

/// Serializes the envelope as a single JSON document
pub fn render(envelope: &Envelope, pretty: bool) -> Result<String, HarvestError> {
    let json = if pretty {
        serde_json::to_string_pretty(envelope)?
    } else {
        serde_json::to_string(envelope)?
    };
    Ok(json)
}
