//! Deal Harvester main entry point
//!
//! This is the command-line interface for the Deal Harvester product extractor.

use clap::Parser;
use deal_harvester::config::{load_config_or_default, search_url, Config};
use deal_harvester::crawler::run_harvest;
use deal_harvester::output::{render, CrawlOutcome, Envelope};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Deal Harvester: current deals from a catalog's search pages
///
/// Runs each configured search query, keeps result cards whose discount label
/// meets the threshold, and prints one JSON document with the deduplicated
/// products on stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "deal-harvester")]
#[command(version)]
#[command(about = "Extracts discounted products from catalog search pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Search term to run instead of the configured list (repeatable)
    #[arg(long = "query", value_name = "TERM")]
    queries: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let outcome = match load_config(&cli) {
        Ok(config) if cli.dry_run => {
            handle_dry_run(&config);
            return Ok(ExitCode::SUCCESS);
        }
        Ok(config) => handle_crawl(&config).await,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            CrawlOutcome::Failure(e.to_string())
        }
    };

    let exit_code = if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    };

    println!("{}", render(&Envelope::from(outcome), cli.pretty)?);

    Ok(exit_code)
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs are written to stderr so stdout carries only the JSON result.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("deal_harvester=info,warn"),
            1 => EnvFilter::new("deal_harvester=debug,info"),
            2 => EnvFilter::new("deal_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration and applies command-line query overrides
fn load_config(cli: &Cli) -> Result<Config, deal_harvester::ConfigError> {
    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using built-in defaults"),
    }

    let mut config = load_config_or_default(cli.config.as_deref())?;

    if !cli.queries.is_empty() {
        if cli.queries.iter().any(|q| q.trim().is_empty()) {
            return Err(deal_harvester::ConfigError::Validation(
                "queries cannot contain blank terms".to_string(),
            ));
        }
        config.crawler.queries = cli.queries.clone();
    }

    Ok(config)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Deal Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Name: {}", config.site.name);
    println!("  Base URL: {}", config.site.base_url);
    println!("  Price format: {:?}", config.site.price_format);

    println!("\nCrawler Configuration:");
    println!(
        "  Max cards per query: {}",
        config.crawler.max_cards_per_query
    );
    println!(
        "  Minimum discount: {}%",
        config.crawler.min_discount_percent
    );
    println!("  Max results: {}", config.crawler.max_results);
    println!("  Query delay: {}ms", config.crawler.query_delay_ms);
    println!(
        "  Navigation timeout: {}ms",
        config.crawler.navigation_timeout_ms
    );
    println!(
        "  Selector timeout: {}ms",
        config.crawler.selector_timeout_ms
    );
    println!("  Wait until: {:?}", config.crawler.wait_until);

    println!("\nCard Selectors:");
    for (field, selector) in config.selectors.fields() {
        println!("  {}: {}", field, selector);
    }

    println!("\nUser Agent:");
    println!("  {}", config.browser.user_agent);

    println!("\nQueries ({}):", config.crawler.queries.len());
    for query in &config.crawler.queries {
        println!("  - {} -> {}", query, search_url(&config.site.search_url, query));
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> CrawlOutcome {
    tracing::info!(
        "Starting crawl of {} ({} queries)",
        config.site.name,
        config.crawler.queries.len()
    );

    run_harvest(config).await
}
