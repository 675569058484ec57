//! Output module for the crawl result payload
//!
//! This module handles:
//! - The crawl outcome handed over by the coordinator
//! - The fixed JSON envelope every caller receives
//! - Rendering the envelope as compact or pretty JSON

mod envelope;

pub use envelope::{render, CrawlOutcome, Envelope};
