//! Query runner: one search term in, the accepted records of its first results
//! page out

use crate::browser::{BrowserError, BrowserPage, CardSelectors, RawCard, WaitPolicy};
use crate::config::{search_url, Config};
use crate::crawler::card::{parse_card, CardRules, CardVerdict};
use crate::product::ProductRecord;
use std::time::Duration;

/// Runs single queries against a page
#[derive(Debug, Clone)]
pub struct QueryRunner {
    search_template: String,
    selectors: CardSelectors,
    rules: CardRules,
    max_cards: usize,
    wait_until: WaitPolicy,
    navigation_timeout: Duration,
    selector_timeout: Duration,
}

impl QueryRunner {
    pub fn new(config: &Config, rules: CardRules) -> Self {
        Self {
            search_template: config.site.search_url.clone(),
            selectors: config.selectors.clone(),
            rules,
            max_cards: config.crawler.max_cards_per_query,
            wait_until: config.crawler.wait_until,
            navigation_timeout: config.crawler.navigation_timeout(),
            selector_timeout: config.crawler.selector_timeout(),
        }
    }

    /// Search URL visited for `query`
    pub fn url_for(&self, query: &str) -> String {
        search_url(&self.search_template, query)
    }

    /// Runs `query` and returns its accepted records in DOM order
    ///
    /// Never fails: a navigation error or a card container that does not show
    /// up is logged and reported as zero results.
    pub async fn run<P: BrowserPage>(&self, page: &mut P, query: &str) -> Vec<ProductRecord> {
        let url = self.url_for(query);

        let cards = match self.fetch_cards(page, &url).await {
            Ok(cards) => cards,
            Err(e) => {
                tracing::warn!("Query '{}' yielded no results: {}", query, e);
                return Vec::new();
            }
        };

        let records = self.parse_cards(query, &cards);
        tracing::info!(
            "Query '{}': {} of {} card(s) accepted",
            query,
            records.len(),
            cards.len().min(self.max_cards)
        );
        records
    }

    async fn fetch_cards<P: BrowserPage>(
        &self,
        page: &mut P,
        url: &str,
    ) -> Result<Vec<RawCard>, BrowserError> {
        page.navigate(url, self.wait_until, self.navigation_timeout).await?;
        page.wait_for_selector(&self.selectors.card, self.selector_timeout).await?;
        page.evaluate_over_cards(&self.selectors).await
    }

    /// Parses the first `max_cards` cards; the cap applies before filtering
    fn parse_cards(&self, query: &str, cards: &[RawCard]) -> Vec<ProductRecord> {
        cards
            .iter()
            .take(self.max_cards)
            .enumerate()
            .filter_map(|(position, card)| match parse_card(card, &self.rules) {
                CardVerdict::Accepted(record) => Some(record),
                CardVerdict::Rejected(reason) => {
                    tracing::trace!("Query '{}' card #{} rejected: {}", query, position, reason);
                    None
                }
            })
            .collect()
    }
}
