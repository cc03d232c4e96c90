//! Crawler module for signing in and walking the history listing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a session cookie jar
//! - Login form submission and re-authentication
//! - Listing parsing and date heading resolution
//! - Pagination through the previous-page link

mod date;
mod driver;
mod fetcher;
mod page;
mod parser;
mod session;

pub use date::DateResolver;
pub use driver::{Clock, CrawlReport, Harvester};
pub use fetcher::{build_http_client, Fetcher, FormMethod, FormSubmission};
pub use page::{ContentLookup, Page};
pub use parser::{Navigation, PageParse, PageParser};
pub use session::{authenticate, build_login_submission};

use crate::config::Config;
use crate::output::{open_sink, LogProgress};
use crate::HarvestError;

/// Runs a complete export
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Open the output sink and write the header row
/// 2. Build the HTTP client
/// 3. Sign in and walk the history back to its oldest page
/// 4. Flush the sink
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ended; see its outcome
/// * `Err(HarvestError)` - The crawl was aborted
pub async fn harvest(config: Config) -> Result<CrawlReport, HarvestError> {
    let mut sink = open_sink(&config)?;
    let harvester = Harvester::new(&config)?;
    harvester.run(sink.as_mut(), &mut LogProgress).await
}
