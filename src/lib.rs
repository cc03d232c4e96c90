//! History-Harvest: exports a paginated web activity history to CSV
//!
//! This crate signs in to a session-authenticated history service, walks the
//! listing backwards page by page through its "previous page" link, and
//! streams every search (and optionally every visited result) to a delimited
//! text sink as soon as it is parsed.

pub mod config;
pub mod crawler;
pub mod history;
pub mod locale;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for History-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Date error: {0}")]
    Date(#[from] DateError),

    #[error("Page parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Login error: {0}")]
    Login(#[from] LoginError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while turning a heading label into a calendar date
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("Unknown month [{month}] in date label [{label}]")]
    UnrecognizedMonth { month: String, label: String },

    #[error("Cannot parse date label [{0}]")]
    Unparsable(String),
}

/// Structural errors in a history listing page
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Result row found before any date heading")]
    MissingDateHeading,

    #[error("Result row has no table cell for the time of day")]
    MissingTimeCell,

    #[error("Result row has no link")]
    MissingLink,

    #[error("Result row link has no href attribute")]
    MissingHref,
}

/// Errors raised while filling and submitting a login form
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Page has no form to sign in with")]
    NoForm,

    #[error("Login form has no '{0}' field")]
    MissingField(String),

    #[error("Login form has no '{0}' sign-in control")]
    MissingSignIn(String),
}

/// Result type alias for History-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{harvest, Harvester};
pub use history::{ActivityDate, Credentials, HistoryRow, SearchEntry, VisitedResultEntry};
pub use locale::Labels;
pub use state::{CrawlOutcome, CrawlState};
