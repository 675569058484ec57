use crate::browser::CardSelectors;
use crate::config::types::{BrowserConfig, Config, CrawlerConfig, SiteConfig};
use crate::config::{search_url, QUERY_PLACEHOLDER};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_selectors(&config.selectors)?;
    validate_crawler_config(&config.crawler)?;
    validate_browser_config(&config.browser)?;
    Ok(())
}

/// Validates the source catalog description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site name cannot be empty".to_string(),
        ));
    }

    validate_http_url("base-url", &config.base_url)?;

    if !config.search_url.contains(QUERY_PLACEHOLDER) {
        return Err(ConfigError::Validation(format!(
            "search-url must contain the {} placeholder, got '{}'",
            QUERY_PLACEHOLDER, config.search_url
        )));
    }

    validate_http_url("search-url", &search_url(&config.search_url, "probe"))?;

    Ok(())
}

/// Validates that a URL parses and uses HTTP(S)
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use HTTP or HTTPS",
            field, value
        )));
    }

    Ok(())
}

/// Validates that every card selector is present and parses
fn validate_selectors(selectors: &CardSelectors) -> Result<(), ConfigError> {
    for (field, selector) in selectors.fields() {
        if selector.trim().is_empty() {
            return Err(ConfigError::InvalidSelector(format!(
                "{} selector cannot be empty",
                field
            )));
        }

        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} selector '{}': {}", field, selector, e))
        })?;
    }

    Ok(())
}

/// Validates crawl behavior configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.queries.is_empty() {
        return Err(ConfigError::Validation(
            "at least one query is required".to_string(),
        ));
    }

    if config.queries.iter().any(|q| q.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "queries cannot contain blank terms".to_string(),
        ));
    }

    if config.max_cards_per_query < 1 {
        return Err(ConfigError::Validation(format!(
            "max-cards-per-query must be >= 1, got {}",
            config.max_cards_per_query
        )));
    }

    if config.max_results < 1 {
        return Err(ConfigError::Validation(format!(
            "max-results must be >= 1, got {}",
            config.max_results
        )));
    }

    if config.min_discount_percent > 100 {
        return Err(ConfigError::Validation(format!(
            "min-discount-percent must be <= 100, got {}",
            config.min_discount_percent
        )));
    }

    if config.navigation_timeout_ms < 1 || config.selector_timeout_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1ms, got navigation={}ms selector={}ms",
            config.navigation_timeout_ms, config.selector_timeout_ms
        )));
    }

    Ok(())
}

/// Validates browser session configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if let Some(referer) = &config.referer {
        validate_http_url("referer", referer)?;
    }

    Ok(())
}
