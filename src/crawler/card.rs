//! Card parser: turns one raw result card into a product record
//!
//! Parsing is pure. Every defect a card can have (a missing sub-element, an
//! unreadable price, a small discount) comes back as a [`CardVerdict::Rejected`]
//! value instead of an error, so a bad card never affects its neighbours.

use crate::browser::RawCard;
use crate::config::{Config, PriceFormat};
use crate::product::ProductRecord;
use std::fmt;
use url::Url;

/// Site-level rules applied to every card
#[derive(Debug, Clone)]
pub struct CardRules {
    /// Origin relative product links are resolved against
    pub base_url: Url,
    /// Tag written into each record's `site` field
    pub site: String,
    /// Smallest acceptable discount label
    pub min_discount_percent: u32,
    /// Price notation of the catalog
    pub price_format: PriceFormat,
}

impl CardRules {
    /// Builds the rules from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(&config.site.base_url)?,
            site: config.site.name.clone(),
            min_discount_percent: config.crawler.min_discount_percent,
            price_format: config.site.price_format,
        })
    }
}

/// Outcome of parsing one card
#[derive(Debug, Clone, PartialEq)]
pub enum CardVerdict {
    Accepted(ProductRecord),
    Rejected(RejectReason),
}

/// Why a card was dropped
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// A required sub-element was absent or blank
    MissingField(&'static str),
    /// A price could not be read as a number
    UnparsablePrice { field: &'static str, text: String },
    /// A price parsed to zero
    NonPositivePrice { field: &'static str },
    /// The discount label is below the threshold
    BelowThreshold { discount_percent: u32 },
    /// The link could not be turned into an absolute HTTP(S) URL
    InvalidLink(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingField(field) => write!(f, "missing {}", field),
            RejectReason::UnparsablePrice { field, text } => {
                write!(f, "unparsable {} '{}'", field, text)
            }
            RejectReason::NonPositivePrice { field } => write!(f, "{} is not positive", field),
            RejectReason::BelowThreshold { discount_percent } => {
                write!(f, "discount {}% below threshold", discount_percent)
            }
            RejectReason::InvalidLink(href) => write!(f, "invalid link '{}'", href),
        }
    }
}

/// Parses one raw card against the site rules
///
/// # Acceptance
///
/// A card becomes a record only when it has a title, both prices, and a link,
/// both prices are positive, and its discount label is at least
/// `rules.min_discount_percent`. A missing discount label counts as 0%.
///
/// # Example
///
/// ```
/// use deal_harvester::browser::RawCard;
/// use deal_harvester::crawler::{parse_card, CardRules, CardVerdict};
/// use deal_harvester::config::PriceFormat;
/// use url::Url;
///
/// let rules = CardRules {
///     base_url: Url::parse("https://www.trendyol.com").unwrap(),
///     site: "Trendyol".to_string(),
///     min_discount_percent: 40,
///     price_format: PriceFormat::Comma,
/// };
/// let card = RawCard {
///     title: Some("Kulaklık".to_string()),
///     current_price: Some("1.299,90 TL".to_string()),
///     original_price: Some("2.363,45 TL".to_string()),
///     link: Some("/kulaklik-p-1".to_string()),
///     image: None,
///     discount: Some("%45".to_string()),
/// };
///
/// match parse_card(&card, &rules) {
///     CardVerdict::Accepted(record) => assert_eq!(record.discount_percent, 45),
///     CardVerdict::Rejected(reason) => panic!("rejected: {}", reason),
/// }
/// ```
pub fn parse_card(card: &RawCard, rules: &CardRules) -> CardVerdict {
    match build_record(card, rules) {
        Ok(record) => CardVerdict::Accepted(record),
        Err(reason) => CardVerdict::Rejected(reason),
    }
}

fn build_record(card: &RawCard, rules: &CardRules) -> Result<ProductRecord, RejectReason> {
    let title = card
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(RejectReason::MissingField("title"))?;

    let current_price = required_price(
        card.current_price.as_deref(),
        "current price",
        rules.price_format,
    )?;
    let original_price = required_price(
        card.original_price.as_deref(),
        "original price",
        rules.price_format,
    )?;

    let href = card
        .link
        .as_deref()
        .ok_or(RejectReason::MissingField("link"))?;

    let discount_percent = card.discount.as_deref().map(parse_discount).unwrap_or(0);

    if discount_percent < rules.min_discount_percent {
        return Err(RejectReason::BelowThreshold { discount_percent });
    }
    if current_price <= 0.0 {
        return Err(RejectReason::NonPositivePrice {
            field: "current price",
        });
    }
    if original_price <= 0.0 {
        return Err(RejectReason::NonPositivePrice {
            field: "original price",
        });
    }

    let url = resolve_product_link(href, &rules.base_url)
        .ok_or_else(|| RejectReason::InvalidLink(href.to_string()))?;

    let image_url = card
        .image
        .as_deref()
        .map(|src| src.trim().to_string())
        .unwrap_or_default();

    Ok(ProductRecord {
        title: title.to_string(),
        current_price,
        original_price,
        discount_percent,
        url,
        image_url,
        site: rules.site.clone(),
    })
}

fn required_price(
    text: Option<&str>,
    field: &'static str,
    format: PriceFormat,
) -> Result<f64, RejectReason> {
    let text = text.ok_or(RejectReason::MissingField(field))?;
    parse_price(text, format).ok_or_else(|| RejectReason::UnparsablePrice {
        field,
        text: text.to_string(),
    })
}

/// Reads a price label such as `1.299,90 TL` as a number
///
/// Everything except digits and the format's decimal mark is dropped, so
/// currency symbols and thousands separators disappear. More than one decimal
/// mark, or no digits at all, yields `None`.
pub fn parse_price(text: &str, format: PriceFormat) -> Option<f64> {
    let decimal_mark = match format {
        PriceFormat::Comma => ',',
        PriceFormat::Point => '.',
    };

    let kept: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == decimal_mark)
        .collect();

    if kept.matches(decimal_mark).count() > 1 || !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value: f64 = kept.replace(decimal_mark, ".").parse().ok()?;
    value.is_finite().then_some(value)
}

/// Reads the leading integer of a discount label such as `%45`
///
/// Labels without digits read as 0.
pub fn parse_discount(label: &str) -> u32 {
    let digits: String = label
        .trim()
        .trim_start_matches(|c: char| c == '%' || c.is_whitespace())
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    digits.parse().unwrap_or(0)
}

/// Resolves a card link against the site origin
///
/// Returns None for links that cannot name a product page:
/// - empty and fragment-only links
/// - javascript:, mailto:, tel: and data: links
/// - anything that is not HTTP(S) after resolution
fn resolve_product_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
