//! Deal Harvester: a discounted-product extractor
//!
//! This crate drives a browser-like page surface across a fixed list of catalog
//! search queries, turns result cards into product records, and reduces them to
//! a deduplicated, threshold-filtered, size-bounded JSON payload.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod output;
pub mod product;

use thiserror::Error;

/// Main error type for Deal Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Deal Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{aggregate, parse_card, run_harvest, CardVerdict, Coordinator};
pub use output::{CrawlOutcome, Envelope};
pub use product::ProductRecord;
