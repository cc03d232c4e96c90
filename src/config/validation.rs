use crate::config::types::{Config, CredentialsConfig, OutputConfig, SiteConfig};
use crate::locale::{Labels, BUILTIN_LOCALES};
use crate::{ConfigError, ConfigResult};
use std::collections::HashSet;
use url::Url;

/// Longest accepted pacing delay between pages
const MAX_PACING_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_site_config(&config.site, config.labels.is_some())?;
    validate_credentials(&config.credentials)?;
    validate_output_config(&config.output)?;
    validate_labels(&config.labels())?;
    Ok(())
}

/// Validates the site contract
fn validate_site_config(config: &SiteConfig, has_label_override: bool) -> ConfigResult<()> {
    let url = Url::parse(&config.entry_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid entry_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "entry_url '{}' must use HTTP or HTTPS",
            config.entry_url
        )));
    }

    for (key, value) in [
        ("search_prefix", &config.search_prefix),
        ("content_form", &config.content_form),
        ("login_field", &config.login_field),
        ("password_field", &config.password_field),
        ("sign_in_control", &config.sign_in_control),
        ("user_agent", &config.user_agent),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", key)));
        }
    }

    if config.pacing_ms > MAX_PACING_MS {
        return Err(ConfigError::Validation(format!(
            "pacing_ms must be <= {}ms, got {}ms",
            MAX_PACING_MS, config.pacing_ms
        )));
    }

    if !has_label_override && Labels::builtin(&config.locale).is_none() {
        return Err(ConfigError::Validation(format!(
            "Unknown locale '{}', expected one of: {}",
            config.locale,
            BUILTIN_LOCALES.join(", ")
        )));
    }

    Ok(())
}

/// Validates credentials
fn validate_credentials(config: &CredentialsConfig) -> ConfigResult<()> {
    if config.login.trim().is_empty() {
        return Err(ConfigError::Validation("login cannot be empty".to_string()));
    }

    if config.password.is_empty() {
        return Err(ConfigError::Validation(
            "password cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    match config.delimiter.as_bytes() {
        [b] if b.is_ascii() && *b != b'"' && *b != b'\n' && *b != b'\r' => {}
        _ => {
            return Err(ConfigError::Validation(format!(
                "delimiter must be a single ASCII character, got '{}'",
                config.delimiter
            )))
        }
    }

    if let Some(path) = &config.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("output path cannot be empty".to_string()));
        }
    }

    Ok(())
}

/// Validates a label table
fn validate_labels(labels: &Labels) -> ConfigResult<()> {
    if labels.months.len() != 12 {
        return Err(ConfigError::Validation(format!(
            "labels.months must list 12 abbreviations, got {}",
            labels.months.len()
        )));
    }

    let distinct: HashSet<&str> = labels.months.iter().map(String::as_str).collect();
    if distinct.len() != 12 || labels.months.iter().any(|m| m.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "labels.months must be 12 distinct non-empty abbreviations".to_string(),
        ));
    }

    if labels.columns.len() != 6 {
        return Err(ConfigError::Validation(format!(
            "labels.columns must list 6 headers, got {}",
            labels.columns.len()
        )));
    }

    for (key, value) in [
        ("today", &labels.today),
        ("yesterday", &labels.yesterday),
        ("continued", &labels.continued),
        ("previous_page", &labels.previous_page),
        ("search_type", &labels.search_type),
        ("result_type", &labels.result_type),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "labels.{} cannot be empty",
                key
            )));
        }
    }

    Ok(())
}
