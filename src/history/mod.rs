//! History data model
//!
//! Plain values produced by the page parser and consumed by the output sink.

use crate::locale::Labels;
use chrono::{Datelike, NaiveDate};
use std::fmt;

/// Login details supplied once before the crawl starts
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub login: String,
    pub password: String,
    /// Also export the links clicked after each search
    pub include_visited_results: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("include_visited_results", &self.include_visited_results)
            .finish()
    }
}

/// A calendar day with no time-of-day component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActivityDate(NaiveDate);

impl ActivityDate {
    /// Builds a date from a 0-based month index, as used by the month table
    pub fn from_month_index(year: i32, month0: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month0 + 1, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month, 0 = January
    pub fn month0(&self) -> u32 {
        self.0.month0()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Formats as `dd/mm/yyyy`
    pub fn to_csv_string(&self) -> String {
        self.0.format("%d/%m/%Y").to_string()
    }
}

impl From<NaiveDate> for ActivityDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for ActivityDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_csv_string())
    }
}

/// One executed search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    pub term: String,
    pub date: ActivityDate,
    pub time_label: String,
}

/// A link followed from a search results page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedResultEntry {
    pub title: String,
    /// Target address, empty when the listing does not expose it
    pub address: String,
    pub date: ActivityDate,
    pub time_label: String,
}

/// A single line of exported history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryRow {
    Search(SearchEntry),
    Visited(VisitedResultEntry),
}

impl HistoryRow {
    /// Field list for the output sink
    ///
    /// Search rows fill Type, Date, Time and SearchTerm. Visited rows fill
    /// Type, Date, Time, PageTitle and Link, leaving SearchTerm empty.
    pub fn to_fields(&self, labels: &Labels) -> Vec<String> {
        match self {
            HistoryRow::Search(entry) => vec![
                labels.search_type.clone(),
                entry.date.to_csv_string(),
                entry.time_label.clone(),
                entry.term.clone(),
            ],
            HistoryRow::Visited(entry) => vec![
                labels.result_type.clone(),
                entry.date.to_csv_string(),
                entry.time_label.clone(),
                String::new(),
                entry.title.clone(),
                entry.address.clone(),
            ],
        }
    }
}
