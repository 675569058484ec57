//! Crawl coordinator - main crawl orchestration logic
//!
//! This module owns the browser session for the length of one crawl:
//! - Launching the session once and opening a single page
//! - Running the queries strictly in order with a pause between them
//! - Releasing the session on every exit path
//! - Reducing the collected records into the final outcome

use crate::browser::{BrowserLauncher, BrowserPage, BrowserSession, HttpLauncher, LaunchOptions};
use crate::config::Config;
use crate::crawler::aggregate::aggregate;
use crate::crawler::card::CardRules;
use crate::crawler::query::QueryRunner;
use crate::output::CrawlOutcome;
use crate::product::ProductRecord;
use crate::{ConfigError, HarvestError};
use std::time::Duration;

/// Suspends the crawl between queries
#[allow(async_fn_in_trait)]
pub trait Throttle {
    async fn pause(&self, delay: Duration);
}

/// Throttle backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioThrottle;

impl Throttle for TokioThrottle {
    async fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Main crawl coordinator structure
pub struct Coordinator<L, T = TokioThrottle> {
    launcher: L,
    throttle: T,
    runner: QueryRunner,
    launch_options: LaunchOptions,
    user_agent: String,
    query_delay: Duration,
    max_results: usize,
}

impl<L: BrowserLauncher> Coordinator<L, TokioThrottle> {
    /// Creates a coordinator that sleeps on the tokio timer between queries
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    /// * `launcher` - Starts the browser session when a crawl begins
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to crawl
    /// * `Err(HarvestError)` - The site base URL could not be parsed
    pub fn new(config: &Config, launcher: L) -> Result<Self, HarvestError> {
        let rules = CardRules::from_config(config).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base-url '{}': {}",
                config.site.base_url, e
            ))
        })?;

        Ok(Self {
            launcher,
            throttle: TokioThrottle,
            runner: QueryRunner::new(config, rules),
            launch_options: LaunchOptions::from(&config.browser),
            user_agent: config.browser.user_agent.clone(),
            query_delay: config.crawler.query_delay(),
            max_results: config.crawler.max_results,
        })
    }
}

impl<L: BrowserLauncher, T: Throttle> Coordinator<L, T> {
    /// Replaces the throttle, typically with one that records pauses in tests
    pub fn with_throttle<U: Throttle>(self, throttle: U) -> Coordinator<L, U> {
        Coordinator {
            launcher: self.launcher,
            throttle,
            runner: self.runner,
            launch_options: self.launch_options,
            user_agent: self.user_agent,
            query_delay: self.query_delay,
            max_results: self.max_results,
        }
    }

    /// Runs every query and returns all accepted records, in query order and
    /// then DOM order, without deduplication
    ///
    /// Only session-level failures (launching, opening the page, setting the
    /// user agent) are errors. Once launched, the session is closed exactly
    /// once whether or not the crawl succeeded.
    pub async fn crawl(&self, queries: &[String]) -> Result<Vec<ProductRecord>, HarvestError> {
        tracing::info!("Launching browser session for {} queries", queries.len());
        let mut session = self.launcher.launch(&self.launch_options).await?;

        let result = self.crawl_session(&mut session, queries).await;

        match session.close().await {
            Ok(()) => tracing::debug!("Browser session closed"),
            Err(e) => tracing::warn!("Failed to close browser session: {}", e),
        }

        result
    }

    async fn crawl_session(
        &self,
        session: &mut L::Session,
        queries: &[String],
    ) -> Result<Vec<ProductRecord>, HarvestError> {
        let mut page = session.new_page().await?;
        page.set_user_agent(&self.user_agent).await?;

        let mut records = Vec::new();

        for (index, query) in queries.iter().enumerate() {
            tracing::debug!("Running query {}/{}: {}", index + 1, queries.len(), query);

            let found = self.runner.run(&mut page, query).await;
            records.extend(found);

            tracing::debug!(
                "Progress: {}/{} queries done, {} candidate record(s)",
                index + 1,
                queries.len(),
                records.len()
            );

            if index + 1 < queries.len() {
                self.throttle.pause(self.query_delay).await;
            }
        }

        Ok(records)
    }

    /// Crawls and reduces the result into a [`CrawlOutcome`]
    ///
    /// Records are deduplicated by URL and bounded by the configured
    /// `max-results`; a session-level failure becomes `Failure`.
    pub async fn harvest(&self, queries: &[String]) -> CrawlOutcome {
        match self.crawl(queries).await {
            Ok(records) => {
                let candidates = records.len();
                let products = aggregate(records, self.max_results);
                tracing::info!(
                    "Crawl completed: {} candidate(s), {} product(s) after dedup and cap",
                    candidates,
                    products.len()
                );
                CrawlOutcome::Success(products)
            }
            Err(e) => {
                tracing::error!("Crawl failed: {}", e);
                CrawlOutcome::Failure(e.to_string())
            }
        }
    }
}

/// Runs a complete harvest with the HTTP-backed browser
///
/// # Example
///
/// ```no_run
/// use deal_harvester::config::load_config_or_default;
/// use deal_harvester::crawler::run_harvest;
/// use deal_harvester::output::Envelope;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config_or_default(None)?;
/// let outcome = run_harvest(&config).await;
/// println!("{}", serde_json::to_string(&Envelope::from(outcome))?);
/// # Ok(())
/// # }
/// ```
pub async fn run_harvest(config: &Config) -> CrawlOutcome {
    match Coordinator::new(config, HttpLauncher::new()) {
        Ok(coordinator) => coordinator.harvest(&config.crawler.queries).await,
        Err(e) => {
            tracing::error!("Failed to set up crawl: {}", e);
            CrawlOutcome::Failure(e.to_string())
        }
    }
}
