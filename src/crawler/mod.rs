//! Crawler module for extracting discounted products
//!
//! This module contains the extraction-and-aggregation pipeline:
//! - Parsing result cards into product records
//! - Running one search query against a page
//! - Coordinating the whole crawl over a single browser session
//! - Deduplicating and bounding the final result set

mod aggregate;
mod card;
mod coordinator;
mod query;

pub use aggregate::aggregate;
pub use card::{parse_card, parse_discount, parse_price, CardRules, CardVerdict, RejectReason};
pub use coordinator::{run_harvest, Coordinator, Throttle, TokioThrottle};
pub use query::QueryRunner;
