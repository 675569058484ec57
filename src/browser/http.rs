//! HTTP-backed browser implementation
//!
//! This module implements the browser traits without a browser process:
//! - Launching builds a `reqwest` client carrying the session headers
//! - Navigating is a GET bounded by the navigation timeout
//! - Selector waits and card extraction run against the fetched document
//!
//! It suits catalogs whose search pages ship result cards in the initial HTML.

use super::{
    BrowserError, BrowserLauncher, BrowserPage, BrowserSession, CardSelectors, LaunchOptions,
    RawCard, WaitPolicy,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Launches HTTP-backed sessions
#[derive(Debug, Clone)]
pub struct HttpLauncher {
    connect_timeout: Duration,
}

impl HttpLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the TCP connect timeout used by every request in the session
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

impl Default for HttpLauncher {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl BrowserLauncher for HttpLauncher {
    type Session = HttpSession;

    async fn launch(&self, options: &LaunchOptions) -> Result<HttpSession, BrowserError> {
        let client = build_http_client(options, self.connect_timeout)?;
        tracing::debug!("HTTP session launched (user agent: {})", options.user_agent);
        Ok(HttpSession {
            client,
            pages_opened: 0,
        })
    }
}

/// Builds the session's HTTP client with the browser-like default headers
///
/// Fails when a header value cannot be sent on the wire, for example a user
/// agent containing a newline.
fn build_http_client(
    options: &LaunchOptions,
    connect_timeout: Duration,
) -> Result<Client, BrowserError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &options.accept_language)?,
    );
    if let Some(referer) = &options.referer {
        headers.insert(REFERER, header_value("referer", referer)?);
    }

    Client::builder()
        .user_agent(header_value("user-agent", &options.user_agent)?)
        .default_headers(headers)
        .connect_timeout(connect_timeout)
        .gzip(true)
        .brotli(true)
        .build()
        .map_err(|e| BrowserError::Launch(e.to_string()))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, BrowserError> {
    HeaderValue::from_str(value)
        .map_err(|e| BrowserError::Launch(format!("invalid {} header '{}': {}", name, value, e)))
}

/// A running HTTP-backed session
#[derive(Debug)]
pub struct HttpSession {
    client: Client,
    pages_opened: usize,
}

impl BrowserSession for HttpSession {
    type Page = HttpPage;

    async fn new_page(&mut self) -> Result<HttpPage, BrowserError> {
        self.pages_opened += 1;
        Ok(HttpPage {
            client: self.client.clone(),
            user_agent: None,
            document: None,
        })
    }

    async fn close(self) -> Result<(), BrowserError> {
        tracing::debug!("HTTP session closed after {} page(s)", self.pages_opened);
        Ok(())
    }
}

/// A page holding the most recently fetched document
#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    user_agent: Option<String>,
    document: Option<String>,
}

impl HttpPage {
    /// Body of the last successful navigation
    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    fn current_document(&self) -> Result<&str, BrowserError> {
        self.document.as_deref().ok_or(BrowserError::NoDocument)
    }
}

impl BrowserPage for HttpPage {
    async fn set_user_agent(&mut self, user_agent: &str) -> Result<(), BrowserError> {
        HeaderValue::from_str(user_agent)
            .map_err(|e| BrowserError::Page(format!("invalid user agent: {}", e)))?;
        self.user_agent = Some(user_agent.to_string());
        Ok(())
    }

    async fn navigate(
        &mut self,
        url: &str,
        wait: WaitPolicy,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        // A failed navigation must not leave the previous page readable
        self.document = None;

        tracing::debug!("Navigating to {} (wait: {:?})", url, wait);

        let mut request = self.client.get(url).timeout(timeout);
        if let Some(user_agent) = &self.user_agent {
            request = request.header(USER_AGENT, user_agent.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| navigation_error(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // The whole body is read before returning, which satisfies every wait policy
        let body = response
            .text()
            .await
            .map_err(|e| navigation_error(url, timeout, e))?;

        self.document = Some(body);
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let compiled = parse_selector(selector)?;
        let document = self.current_document()?;

        // A fetched document never changes, so absence now means absence at the deadline
        if document_contains(document, &compiled) {
            Ok(())
        } else {
            Err(BrowserError::SelectorTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis(),
            })
        }
    }

    async fn evaluate_over_cards(
        &mut self,
        selectors: &CardSelectors,
    ) -> Result<Vec<RawCard>, BrowserError> {
        extract_cards(self.current_document()?, selectors)
    }
}

fn navigation_error(url: &str, timeout: Duration, error: reqwest::Error) -> BrowserError {
    if error.is_timeout() {
        BrowserError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: timeout.as_millis(),
        }
    } else {
        BrowserError::Navigation {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, BrowserError> {
    Selector::parse(selector)
        .map_err(|e| BrowserError::InvalidSelector(format!("'{}': {}", selector, e)))
}

fn document_contains(html: &str, selector: &Selector) -> bool {
    Html::parse_document(html).select(selector).next().is_some()
}

/// Reads every card matched by `selectors.card` from `html`, in DOM order
///
/// Text fields keep their raw whitespace; trimming is left to the card parser.
pub fn extract_cards(html: &str, selectors: &CardSelectors) -> Result<Vec<RawCard>, BrowserError> {
    let card = parse_selector(&selectors.card)?;
    let title = parse_selector(&selectors.title)?;
    let current_price = parse_selector(&selectors.current_price)?;
    let original_price = parse_selector(&selectors.original_price)?;
    let link = parse_selector(&selectors.link)?;
    let image = parse_selector(&selectors.image)?;
    let discount = parse_selector(&selectors.discount)?;

    let document = Html::parse_document(html);

    let cards = document
        .select(&card)
        .map(|element| RawCard {
            title: select_text(element, &title),
            current_price: select_text(element, &current_price),
            original_price: select_text(element, &original_price),
            link: select_attr(element, &link, "href"),
            image: select_attr(element, &image, "src"),
            discount: select_text(element, &discount),
        })
        .collect();

    Ok(cards)
}

fn select_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|element| element.text().collect::<String>())
}

fn select_attr(card: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    card.select(selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(str::to_string)
}
