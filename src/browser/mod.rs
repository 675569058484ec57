//! Browser collaborator surface
//!
//! The crawler never talks to a browser directly. It goes through three traits
//! that mirror a headless-browser control API:
//! - [`BrowserLauncher`] starts a session
//! - [`BrowserSession`] opens pages and is closed exactly once
//! - [`BrowserPage`] navigates, waits for selectors, and extracts result cards
//!
//! [`HttpLauncher`] implements the surface on top of `reqwest` and `scraper`
//! for catalogs that render their result cards server-side.

mod http;

pub use http::{HttpLauncher, HttpPage, HttpSession};

#[cfg(test)]
pub(crate) mod fake;

use crate::config::BrowserConfig;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the browser collaborator
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser session: {0}")]
    Launch(String),

    #[error("Failed to open page: {0}")]
    Page(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u128 },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Selector '{selector}' did not appear within {timeout_ms}ms")]
    SelectorTimeout { selector: String, timeout_ms: u128 },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("No document loaded; navigate first")]
    NoDocument,
}

/// When a navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaitPolicy {
    /// The `load` event fired
    Load,
    /// The DOM was parsed
    DomContentLoaded,
    /// Network traffic settled
    #[default]
    NetworkIdle,
}

/// Options used when starting a browser session
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub user_agent: String,
    pub accept_language: String,
    pub referer: Option<String>,
}

impl From<&BrowserConfig> for LaunchOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            referer: config.referer.clone(),
        }
    }
}

/// CSS selectors describing one result card
///
/// `card` matches the card container; the others are evaluated inside each
/// card element.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CardSelectors {
    pub card: String,
    pub title: String,
    #[serde(rename = "current-price")]
    pub current_price: String,
    #[serde(rename = "original-price")]
    pub original_price: String,
    pub link: String,
    pub image: String,
    pub discount: String,
}

impl CardSelectors {
    /// All selectors with their config key, container first
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("card", self.card.as_str()),
            ("title", self.title.as_str()),
            ("current-price", self.current_price.as_str()),
            ("original-price", self.original_price.as_str()),
            ("link", self.link.as_str()),
            ("image", self.image.as_str()),
            ("discount", self.discount.as_str()),
        ]
    }
}

impl Default for CardSelectors {
    fn default() -> Self {
        Self {
            card: ".p-card-wrppr".to_string(),
            title: ".prdct-desc-cntnr-name".to_string(),
            current_price: ".prc-box-dscntd".to_string(),
            original_price: ".prc-box-orgnl".to_string(),
            link: "a".to_string(),
            image: ".p-card-img".to_string(),
            discount: ".dsct-prcntg".to_string(),
        }
    }
}

/// Structured data read from one result card
///
/// A `None` field means the sub-element was absent from the card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    pub title: Option<String>,
    pub current_price: Option<String>,
    pub original_price: Option<String>,
    /// `href` of the card's primary link
    pub link: Option<String>,
    /// `src` of the card's image
    pub image: Option<String>,
    pub discount: Option<String>,
}

/// Starts browser sessions
#[allow(async_fn_in_trait)]
pub trait BrowserLauncher {
    type Session: BrowserSession;

    async fn launch(&self, options: &LaunchOptions) -> Result<Self::Session, BrowserError>;
}

/// A running browser session
///
/// `close` consumes the session so it can only be released once.
#[allow(async_fn_in_trait)]
pub trait BrowserSession: Sized {
    type Page: BrowserPage;

    async fn new_page(&mut self) -> Result<Self::Page, BrowserError>;

    async fn close(self) -> Result<(), BrowserError>;
}

/// A single page within a session
///
/// Methods take `&mut self`; a page handle is never driven concurrently.
#[allow(async_fn_in_trait)]
pub trait BrowserPage {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), BrowserError>;

    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitPolicy,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError>;

    /// Extracts every card on the current page, in DOM order
    async fn evaluate_over_cards(
        &mut self,
        selectors: &CardSelectors,
    ) -> Result<Vec<RawCard>, BrowserError>;
}
