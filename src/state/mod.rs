//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the pagination driver's state machine
//! - `CrawlOutcome`: how a crawl ended when no fatal error occurred

mod crawl_state;

// Re-export main types
pub use crawl_state::{CrawlOutcome, CrawlState};
