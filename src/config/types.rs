use crate::history::Credentials;
use crate::locale::Labels;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure for History-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Complete label table overriding the built-in locale
    #[serde(default)]
    pub labels: Option<Labels>,
}

impl Config {
    /// Label table in effect: the override if present, else the site locale
    pub fn labels(&self) -> Labels {
        self.labels
            .clone()
            .or_else(|| Labels::builtin(&self.site.locale))
            .unwrap_or_default()
    }

    /// Credentials handed to the session manager
    pub fn credentials(&self) -> Credentials {
        Credentials {
            login: self.credentials.login.clone(),
            password: self.credentials.password.clone(),
            include_visited_results: self.credentials.include_visited_results,
        }
    }
}

/// Target site contract: URLs, field names and pacing
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SiteConfig {
    /// History page opened first; the service answers with a login form
    pub entry_url: String,

    /// Link prefix identifying a row as a search rather than a visited result
    pub search_prefix: String,

    /// Name of the form holding the history listing
    pub content_form: String,

    /// Login form field for the account name (may be absent on re-login)
    pub login_field: String,

    /// Login form field for the password
    pub password_field: String,

    /// Name of the control submitting the login form
    pub sign_in_control: String,

    /// Delay before following each previous-page link (milliseconds)
    pub pacing_ms: u64,

    /// Built-in label table to use ("fr" or "en")
    pub locale: String,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            entry_url: "https://history.google.com/history/?hl=fr".to_string(),
            search_prefix: "https://www.google.com/search?q=".to_string(),
            content_form: "edit".to_string(),
            login_field: "Email".to_string(),
            password_field: "Passwd".to_string(),
            sign_in_control: "signIn".to_string(),
            pacing_ms: 3000,
            locale: "fr".to_string(),
            user_agent: format!("history-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Account credentials and export options
#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CredentialsConfig {
    pub login: String,
    pub password: String,
    /// Also export the links clicked after each search
    pub include_visited_results: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            login: String::new(),
            password: String::new(),
            include_visited_results: true,
        }
    }
}

impl fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("include_visited_results", &self.include_visited_results)
            .finish()
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OutputConfig {
    /// Path of the CSV file; stdout when unset
    pub path: Option<PathBuf>,

    /// Field separator, a single ASCII character
    pub delimiter: String,
}

impl OutputConfig {
    /// The delimiter as a byte, falling back to ';'
    pub fn delimiter_byte(&self) -> u8 {
        match self.delimiter.as_bytes() {
            [b] => *b,
            _ => b';',
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: ";".to_string(),
        }
    }
}
