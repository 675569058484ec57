//! Configuration module for Deal Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All settings have defaults, so running without a file crawls the built-in
//! catalog profile.
//!
//! # Example
//!
//! ```no_run
//! use deal_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Final result cap: {}", config.crawler.max_results);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BrowserConfig, Config, CrawlerConfig, PriceFormat, SiteConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};

/// Placeholder in the search URL template replaced by the search term
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Builds the first-page search URL for `query`
///
/// The term is form-encoded before substitution so spaces and non-ASCII
/// letters survive the trip.
pub fn search_url(template: &str, query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    template.replace(QUERY_PLACEHOLDER, &encoded)
}
