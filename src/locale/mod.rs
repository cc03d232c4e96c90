//! Locale label tables
//!
//! The history service renders its listing in the account's language. Every
//! string the crawler matches against (date words, month abbreviations, the
//! previous-page link) or writes out (row types, column headers) lives in a
//! single [`Labels`] table so a new language is a new table, not new code.

use serde::Deserialize;

/// All localized strings used to read the listing and write the CSV
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Labels {
    /// Heading text for the current day
    pub today: String,

    /// Heading text for the previous day
    pub yesterday: String,

    /// Suffix appended to a heading when a day spills over onto another page
    pub continued: String,

    /// Month abbreviations, January first
    pub months: Vec<String>,

    /// Visible text of the link leading to older history
    pub previous_page: String,

    /// Type column value for a search row
    pub search_type: String,

    /// Type column value for a visited-result row
    pub result_type: String,

    /// Header row, six columns
    pub columns: Vec<String>,
}

impl Labels {
    /// French labels, as served with `hl=fr`
    pub fn french() -> Self {
        Self {
            today: "Aujourd'hui".to_string(),
            yesterday: "Hier".to_string(),
            continued: "(suite)".to_string(),
            months: to_strings(&[
                "jan", "fév", "mar", "avr", "mai", "juin", "juil", "août", "sep", "oct", "nov",
                "déc",
            ]),
            previous_page: "Précédent".to_string(),
            search_type: "Recherche".to_string(),
            result_type: "Résultat".to_string(),
            columns: to_strings(&[
                "Type",
                "Date",
                "Heure",
                "Terme de la recherche",
                "Titre de la page",
                "Lien",
            ]),
        }
    }

    /// English labels, as served with `hl=en`
    pub fn english() -> Self {
        Self {
            today: "Today".to_string(),
            yesterday: "Yesterday".to_string(),
            continued: "(continued)".to_string(),
            months: to_strings(&[
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
            previous_page: "Previous".to_string(),
            search_type: "Search".to_string(),
            result_type: "Result".to_string(),
            columns: to_strings(&["Type", "Date", "Time", "Search term", "Page title", "Link"]),
        }
    }

    /// Looks up a built-in table by language code
    pub fn builtin(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "fr" => Some(Self::french()),
            "en" => Some(Self::english()),
            _ => None,
        }
    }

    /// Index (0 = January) of a month abbreviation, exact match
    pub fn month_index(&self, abbrev: &str) -> Option<u32> {
        self.months
            .iter()
            .position(|m| m == abbrev)
            .map(|i| i as u32)
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::french()
    }
}

/// Language codes with a built-in table
pub const BUILTIN_LOCALES: &[&str] = &["fr", "en"];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
