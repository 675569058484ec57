//! Product record produced by the card parser

use serde::{Deserialize, Serialize};

/// One discounted listing extracted from a search results page
///
/// `url` is absolute and doubles as the identity key for deduplication.
/// `discount_percent` is taken from the page's own label and is never
/// recomputed from the two prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Listing title, trimmed and non-empty
    pub title: String,

    /// Current (discounted) price
    pub current_price: f64,

    /// Original (list) price
    pub original_price: f64,

    /// Discount percentage as printed on the card
    pub discount_percent: u32,

    /// Absolute product URL
    pub url: String,

    /// Product image URL, empty when the card has none
    pub image_url: String,

    /// Source catalog tag
    pub site: String,
}
