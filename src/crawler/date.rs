//! Date heading resolver
//!
//! Listing pages group rows under headings such as "Aujourd'hui",
//! "Hier (suite)" or "12 janv 2012". This module turns those labels into
//! calendar dates using the active [`Labels`] table.
//!
//! Recognized forms, checked in order:
//!
//! 1. today word, optionally followed by the continued suffix
//! 2. yesterday word, optionally followed by the continued suffix
//! 3. `<day> <month-abbrev> <year>`, optionally followed by the continued suffix
//!
//! "Today" is never read from the system clock here; the caller passes it in.

use crate::history::ActivityDate;
use crate::locale::Labels;
use crate::DateError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s(\S+)\s(\d{4})$").expect("valid date regex"));

/// Resolves heading labels against one label table
#[derive(Debug, Clone)]
pub struct DateResolver {
    today_words: [String; 2],
    yesterday_words: [String; 2],
    continued_suffix: String,
    labels: Labels,
}

impl DateResolver {
    pub fn new(labels: &Labels) -> Self {
        let continued = |word: &str| format!("{} {}", word, labels.continued);
        Self {
            today_words: [labels.today.clone(), continued(&labels.today)],
            yesterday_words: [labels.yesterday.clone(), continued(&labels.yesterday)],
            continued_suffix: format!(" {}", labels.continued),
            labels: labels.clone(),
        }
    }

    /// Resolves a heading label relative to `today`
    ///
    /// # Errors
    ///
    /// * [`DateError::UnrecognizedMonth`] - the label has the day/month/year
    ///   shape but the month is not in the table
    /// * [`DateError::Unparsable`] - the label matches none of the forms
    pub fn resolve(&self, label: &str, today: NaiveDate) -> Result<ActivityDate, DateError> {
        if self.today_words.iter().any(|w| w == label) {
            return Ok(today.into());
        }

        if self.yesterday_words.iter().any(|w| w == label) {
            return today
                .pred_opt()
                .map(ActivityDate::from)
                .ok_or_else(|| DateError::Unparsable(label.to_string()));
        }

        let core = label.strip_suffix(&self.continued_suffix).unwrap_or(label);
        let captures = DAY_MONTH_YEAR
            .captures(core)
            .ok_or_else(|| DateError::Unparsable(label.to_string()))?;

        let month = &captures[2];
        let month_index =
            self.labels
                .month_index(month)
                .ok_or_else(|| DateError::UnrecognizedMonth {
                    month: month.to_string(),
                    label: label.to_string(),
                })?;

        let day: u32 = captures[1]
            .parse()
            .map_err(|_| DateError::Unparsable(label.to_string()))?;
        let year: i32 = captures[3]
            .parse()
            .map_err(|_| DateError::Unparsable(label.to_string()))?;

        ActivityDate::from_month_index(year, month_index, day)
            .ok_or_else(|| DateError::Unparsable(label.to_string()))
    }
}
