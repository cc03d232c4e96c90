//! History page parser
//!
//! This module extracts history rows from one listing page. The listing is a
//! form whose direct children are either date headings (an `h1` somewhere
//! inside) or result rows (a `.result` element). Children are scanned in
//! document order while tracking the date of the last heading seen.
//!
//! A result row whose first link starts with the search prefix is a search;
//! any other result row is a visited result, exported only on request.
//! Each row is written to the sink before the next child is looked at.

use crate::config::SiteConfig;
use crate::crawler::date::DateResolver;
use crate::crawler::page::{self, ContentLookup, Page};
use crate::history::{ActivityDate, HistoryRow, SearchEntry, VisitedResultEntry};
use crate::locale::Labels;
use crate::output::RowSink;
use crate::{HarvestError, ParseError};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use url::Url;

static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static RESULT_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".result").expect("valid selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

/// Outcome of parsing one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageParse {
    /// The listing was found and drained to the sink
    Parsed {
        /// Latest search seen so far, carried to the next page
        context: Option<SearchEntry>,
        /// Searches found on this page, in document order
        searches: Vec<SearchEntry>,
        /// Rows written to the sink for this page
        rows_written: usize,
    },

    /// The listing form is missing from the page
    ContentAbsent {
        has_forms: bool,
        has_password_field: bool,
    },
}

/// Navigation affordances of a parsed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Target of the previous-page link, if any
    pub previous_page: Option<Url>,
    /// Whether the page holds a password field
    pub has_password_field: bool,
}

/// Extracts history rows from listing pages
#[derive(Debug, Clone)]
pub struct PageParser {
    resolver: DateResolver,
    labels: Labels,
    search_prefix: String,
    content_form: String,
    password_field: String,
    include_visited_results: bool,
}

impl PageParser {
    pub fn new(site: &SiteConfig, labels: &Labels, include_visited_results: bool) -> Self {
        Self {
            resolver: DateResolver::new(labels),
            labels: labels.clone(),
            search_prefix: site.search_prefix.clone(),
            content_form: site.content_form.clone(),
            password_field: site.password_field.clone(),
            include_visited_results,
        }
    }

    /// Parses a page and streams its rows to `sink`
    ///
    /// # Arguments
    ///
    /// * `page` - The fetched page
    /// * `context` - Latest search from earlier pages, if any
    /// * `today` - Date that "today" headings resolve to
    /// * `sink` - Destination of the rows
    ///
    /// # Errors
    ///
    /// Date and structure errors are fatal: the remaining rows of the page
    /// are not written, since their date context can no longer be trusted.
    pub fn parse<S: RowSink + ?Sized>(
        &self,
        page: &Page,
        context: Option<SearchEntry>,
        today: NaiveDate,
        sink: &mut S,
    ) -> Result<PageParse, HarvestError> {
        let document = page.document();
        let form = match page::find_content_form(&document, &self.content_form, &self.password_field)
        {
            ContentLookup::Found(form) => form,
            ContentLookup::Absent {
                has_forms,
                has_password_field,
            } => {
                return Ok(PageParse::ContentAbsent {
                    has_forms,
                    has_password_field,
                })
            }
        };

        let mut context = context;
        let mut searches = Vec::new();
        let mut rows_written = 0;
        let mut current_date: Option<ActivityDate> = None;

        for child in form.children().filter_map(ElementRef::wrap) {
            if let Some(heading) = page::first_match(child, &HEADING) {
                let label = page::text_content(heading);
                current_date = Some(self.resolver.resolve(label.trim(), today)?);
                continue;
            }

            if page::first_match(child, &RESULT_ROW).is_none() {
                continue;
            }

            if let Some(row) = self.classify_row(child, current_date)? {
                sink.write_row(&row.to_fields(&self.labels))?;
                rows_written += 1;
                if let HistoryRow::Search(entry) = row {
                    searches.push(entry.clone());
                    context = Some(entry);
                }
            }
        }

        Ok(PageParse::Parsed {
            context,
            searches,
            rows_written,
        })
    }

    /// Looks for the previous-page link and a password field
    pub fn navigation(&self, page: &Page) -> Navigation {
        let document = page.document();
        Navigation {
            previous_page: page::anchor_by_text(&document, page.url(), &self.labels.previous_page),
            has_password_field: page::has_named_element(&document, &self.password_field),
        }
    }

    /// Turns a result row into a history row, or `None` when it is skipped
    fn classify_row(
        &self,
        row: ElementRef<'_>,
        current_date: Option<ActivityDate>,
    ) -> Result<Option<HistoryRow>, ParseError> {
        let time_label = row
            .select(&CELL)
            .last()
            .map(|cell| page::text_content(cell).trim().to_string())
            .ok_or(ParseError::MissingTimeCell)?;

        let link = page::first_match(row, &LINK).ok_or(ParseError::MissingLink)?;
        let href = link.value().attr("href").ok_or(ParseError::MissingHref)?;
        let text = page::text_content(link).trim().to_string();

        if href.starts_with(&self.search_prefix) {
            let date = current_date.ok_or(ParseError::MissingDateHeading)?;
            return Ok(Some(HistoryRow::Search(SearchEntry {
                term: text,
                date,
                time_label,
            })));
        }

        if !self.include_visited_results {
            return Ok(None);
        }

        let date = current_date.ok_or(ParseError::MissingDateHeading)?;
        let address = link.value().attr("title").unwrap_or_default().to_string();
        Ok(Some(HistoryRow::Visited(VisitedResultEntry {
            title: text,
            address,
            date,
            time_label,
        })))
    }
}
