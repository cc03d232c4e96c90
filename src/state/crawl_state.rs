//! Crawl state definitions for the pagination driver
//!
//! The driver walks a small state machine: it opens the entry page, signs
//! in, then alternates between parsing listing pages and re-authenticating
//! until the history is exhausted or recovery is impossible.

use std::fmt;

/// Represents the current state of the pagination driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Active States =====
    /// Nothing fetched yet
    Initial,

    /// Entry page fetched, initial sign-in pending
    Fetching,

    /// A page is being parsed and drained to the sink
    Parsing,

    /// The session dropped and the login form is being resubmitted
    Reauthenticating,

    // ===== Terminal States =====
    /// History fully fetched
    Done,

    /// Crawl stopped without reaching the end of the history
    Failed,
}

impl CrawlState {
    /// Returns true if the driver stops in this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if a transition from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;
        matches!(
            (self, next),
            (Initial, Fetching)
                | (Fetching, Parsing)
                | (Parsing, Parsing)
                | (Parsing, Reauthenticating)
                | (Parsing, Done)
                | (Parsing, Failed)
                | (Reauthenticating, Parsing)
        )
    }

    /// Short lowercase name, used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Reauthenticating => "reauthenticating",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a crawl that did not hit a fatal error ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlOutcome {
    /// No previous-page link and no login form: the whole history was read
    HistoryComplete,

    /// The first page never showed the history listing after signing in
    ConnectFailed,

    /// The listing could not be recovered even after signing in again
    SessionLost,
}

impl CrawlOutcome {
    /// Terminal state the driver stops in for this outcome
    pub fn state(&self) -> CrawlState {
        match self {
            Self::HistoryComplete => CrawlState::Done,
            Self::ConnectFailed | Self::SessionLost => CrawlState::Failed,
        }
    }

    /// Returns true if the history was read to the end
    pub fn is_success(&self) -> bool {
        matches!(self, Self::HistoryComplete)
    }

    /// Status line shown to the user when the crawl stops
    pub fn message(&self) -> &'static str {
        match self {
            Self::HistoryComplete => "Your history has been fully fetched",
            Self::ConnectFailed => "Could not connect",
            Self::SessionLost => "Could not find the history listing after signing in again",
        }
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
