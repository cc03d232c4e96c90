//! Pagination driver - main crawl orchestration logic
//!
//! This module contains the crawl loop. It opens the entry page, signs in,
//! and then repeatedly parses the current page, streams its rows to the sink
//! and follows the previous-page link to older history.
//!
//! The service gives no explicit end-of-history marker. A missing listing or
//! a missing previous-page link can mean either that the history is
//! exhausted or that the session dropped; the driver tells the two apart by
//! probing the page for a password field and signs in again only when one is
//! present.

use crate::config::{Config, SiteConfig};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::page::Page;
use crate::crawler::parser::{PageParse, PageParser};
use crate::crawler::session::authenticate;
use crate::history::{Credentials, SearchEntry};
use crate::output::{Progress, ProgressObserver, RowSink};
use crate::state::{CrawlOutcome, CrawlState};
use crate::HarvestError;
use chrono::NaiveDate;
use std::time::Duration;
use url::Url;

/// Source of the date "today" headings resolve to
pub type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Summary of a finished crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    /// How the crawl ended
    pub outcome: CrawlOutcome,

    /// Listing pages parsed
    pub pages: usize,

    /// Rows written to the sink, header excluded
    pub rows_written: usize,

    /// Every search exported, in export order
    pub searches: Vec<SearchEntry>,
}

impl CrawlReport {
    /// Date of the most recently exported search
    pub fn last_search_date(&self) -> Option<crate::history::ActivityDate> {
        self.searches.last().map(|s| s.date)
    }
}

/// Driver state, carrying the page each active state works on
enum Step {
    Initial,
    Fetching(Page),
    Parsing(Page),
    Reauthenticating(Page),
    Finished(CrawlOutcome),
}

impl Step {
    fn state(&self) -> CrawlState {
        match self {
            Step::Initial => CrawlState::Initial,
            Step::Fetching(_) => CrawlState::Fetching,
            Step::Parsing(_) => CrawlState::Parsing,
            Step::Reauthenticating(_) => CrawlState::Reauthenticating,
            Step::Finished(outcome) => outcome.state(),
        }
    }
}

/// Running totals, owned by a single [`Harvester::run`] call
#[derive(Debug, Default)]
struct Tally {
    pages: usize,
    rows_written: usize,
    searches: Vec<SearchEntry>,
    context: Option<SearchEntry>,
    /// Set after signing in again; cleared once a previous-page link is followed
    reauthenticated: bool,
}

impl Tally {
    fn progress(&self) -> Progress {
        Progress {
            pages: self.pages,
            searches: self.searches.len(),
            last_search_date: self.context.as_ref().map(|c| c.date),
        }
    }
}

/// Main crawler structure
pub struct Harvester {
    site: SiteConfig,
    credentials: Credentials,
    fetcher: Fetcher,
    parser: PageParser,
    clock: Clock,
}

impl Harvester {
    /// Creates a harvester from a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let credentials = config.credentials();
        let labels = config.labels();
        Ok(Self {
            parser: PageParser::new(&config.site, &labels, credentials.include_visited_results),
            fetcher: Fetcher::new(&config.site.user_agent)?,
            site: config.site.clone(),
            credentials,
            clock: Box::new(|| chrono::Local::now().date_naive()),
        })
    }

    /// Replaces the clock used to resolve "today" and "yesterday" headings
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Runs the crawl until the history is exhausted or cannot be recovered
    ///
    /// Rows are written to `sink` as each page is parsed. Date and structure
    /// errors, HTTP failures and malformed login pages abort the crawl with
    /// an error; rows already written stay written.
    pub async fn run(
        &self,
        sink: &mut dyn RowSink,
        observer: &mut dyn ProgressObserver,
    ) -> Result<CrawlReport, HarvestError> {
        let entry_url = Url::parse(&self.site.entry_url)?;
        let mut tally = Tally::default();
        let mut step = Step::Initial;

        let outcome = loop {
            let from = step.state();
            step = match step {
                Step::Initial => {
                    tracing::info!("Opening page {}", entry_url);
                    Step::Fetching(self.fetcher.open(&entry_url).await?)
                }

                // The login form is always submitted on the first page
                Step::Fetching(page) => Step::Parsing(self.sign_in(&page).await?),

                Step::Parsing(page) => self.parse_step(page, &mut tally, sink, observer).await?,

                Step::Reauthenticating(page) => {
                    tally.reauthenticated = true;
                    Step::Parsing(self.sign_in(&page).await?)
                }

                Step::Finished(outcome) => break outcome,
            };
            debug_assert!(
                from.can_transition_to(step.state()),
                "illegal transition {} -> {}",
                from,
                step.state()
            );
            tracing::debug!("State {} -> {}", from, step.state());
        };

        sink.flush()?;

        if outcome.is_success() {
            tracing::info!("{}", outcome);
        } else {
            tracing::error!("{}", outcome);
        }

        Ok(CrawlReport {
            outcome,
            pages: tally.pages,
            rows_written: tally.rows_written,
            searches: tally.searches,
        })
    }

    /// Parses the current page and decides where to go next
    async fn parse_step(
        &self,
        page: Page,
        tally: &mut Tally,
        sink: &mut dyn RowSink,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Step, HarvestError> {
        let today = (self.clock)();
        let parsed = self.parser.parse(&page, tally.context.clone(), today, sink)?;

        match parsed {
            PageParse::ContentAbsent {
                has_forms,
                has_password_field,
            } => {
                if tally.pages == 0 {
                    tracing::warn!("No history listing after signing in");
                    return Ok(Step::Finished(CrawlOutcome::ConnectFailed));
                }
                if !has_forms || !has_password_field {
                    tracing::info!("Login form not found, stopping");
                    return Ok(Step::Finished(CrawlOutcome::HistoryComplete));
                }
                Ok(self.reauthenticate_or_give_up(page, tally))
            }

            PageParse::Parsed {
                context,
                searches,
                rows_written,
            } => {
                tally.pages += 1;
                tally.rows_written += rows_written;
                tally.searches.extend(searches);
                tally.context = context;

                let navigation = self.parser.navigation(&page);
                match navigation.previous_page {
                    Some(previous) => {
                        observer.on_page(&tally.progress());
                        tracing::info!("Next page");
                        if self.site.pacing_ms > 0 {
                            tokio::time::sleep(Duration::from_millis(self.site.pacing_ms)).await;
                        }
                        let older = self.fetcher.open(&previous).await?;
                        tally.reauthenticated = false;
                        Ok(Step::Parsing(older))
                    }
                    None => {
                        tracing::info!("Previous-page link not found");
                        if !navigation.has_password_field {
                            tracing::info!("Login form not found, stopping");
                            return Ok(Step::Finished(CrawlOutcome::HistoryComplete));
                        }
                        tracing::info!("Login form found");
                        Ok(self.reauthenticate_or_give_up(page, tally))
                    }
                }
            }
        }
    }

    /// Allows one re-authentication per page
    fn reauthenticate_or_give_up(&self, page: Page, tally: &Tally) -> Step {
        if tally.reauthenticated {
            tracing::warn!("Cannot find the history listing");
            Step::Finished(CrawlOutcome::SessionLost)
        } else {
            Step::Reauthenticating(page)
        }
    }

    async fn sign_in(&self, page: &Page) -> Result<Page, HarvestError> {
        authenticate(&self.fetcher, page, &self.credentials, &self.site).await
    }
}
