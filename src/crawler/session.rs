//! Session manager
//!
//! Fills in and submits the login form. The same routine serves the initial
//! sign-in and every re-authentication: a re-login prompt usually omits the
//! account field, so only the password field and the sign-in control are
//! required.

use crate::config::SiteConfig;
use crate::crawler::fetcher::{Fetcher, FormMethod, FormSubmission};
use crate::crawler::page::{self, Page};
use crate::history::Credentials;
use crate::{HarvestError, LoginError};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

static FORM_CONTROLS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[name], textarea[name]").expect("valid selector"));

/// Input types never sent unless they are the control that was clicked
const BUTTON_TYPES: &[&str] = &["submit", "button", "image", "reset", "file"];

/// Builds the submission produced by clicking the sign-in control of the
/// page's first form
///
/// Every named control of the form is sent with its current value, as a
/// browser would, except buttons that were not clicked and unchecked
/// checkboxes or radios. The login and password fields are then overwritten
/// with the credentials.
///
/// # Errors
///
/// * [`LoginError::NoForm`] - the page has no form
/// * [`LoginError::MissingField`] - the form has no password field
/// * [`LoginError::MissingSignIn`] - the form has no sign-in control
pub fn build_login_submission(
    page: &Page,
    credentials: &Credentials,
    site: &SiteConfig,
) -> Result<FormSubmission, HarvestError> {
    let document = page.document();
    let form = *page::forms(&document)
        .first()
        .ok_or(LoginError::NoForm)?;

    let mut fields: Vec<(String, String)> = form
        .select(&FORM_CONTROLS)
        .filter_map(successful_control)
        .collect();

    if page::named_control(form, &site.login_field, &["input"]).is_some() {
        set_field(&mut fields, &site.login_field, &credentials.login);
    } else {
        tracing::debug!("No '{}' field, re-authentication prompt", site.login_field);
    }

    if page::named_control(form, &site.password_field, &["input"]).is_none() {
        return Err(LoginError::MissingField(site.password_field.clone()).into());
    }
    set_field(&mut fields, &site.password_field, &credentials.password);

    let sign_in = page::named_control(form, &site.sign_in_control, &["input", "button"])
        .ok_or_else(|| LoginError::MissingSignIn(site.sign_in_control.clone()))?;
    fields.push((
        site.sign_in_control.clone(),
        sign_in.value().attr("value").unwrap_or_default().to_string(),
    ));

    let action = match form.value().attr("action").map(str::trim) {
        Some(action) if !action.is_empty() => page.url().join(action)?,
        _ => page.url().clone(),
    };

    Ok(FormSubmission {
        method: FormMethod::from_attr(form.value().attr("method")),
        action,
        fields,
    })
}

/// Signs in through the page's login form and returns the resulting page
///
/// No retry: a malformed login page means crawling cannot proceed.
pub async fn authenticate(
    fetcher: &Fetcher,
    page: &Page,
    credentials: &Credentials,
    site: &SiteConfig,
) -> Result<Page, HarvestError> {
    tracing::info!("Filling the login form");
    let submission = build_login_submission(page, credentials, site)?;
    tracing::info!("Signing in");
    fetcher.submit(&submission).await
}

/// Name and value of a control a browser would submit
fn successful_control(control: ElementRef<'_>) -> Option<(String, String)> {
    let element = control.value();
    let name = element.attr("name")?;

    if element.name() == "textarea" {
        return Some((name.to_string(), page::text_content(control)));
    }

    let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
    if BUTTON_TYPES.contains(&kind.as_str()) {
        return None;
    }
    if (kind == "checkbox" || kind == "radio") && element.attr("checked").is_none() {
        return None;
    }

    let default = if kind == "checkbox" || kind == "radio" { "on" } else { "" };
    let value = element.attr("value").unwrap_or(default);
    Some((name.to_string(), value.to_string()))
}

/// Overwrites every field named `name`, adding it when missing
fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: &str) {
    let mut found = false;
    for (_, current) in fields.iter_mut().filter(|(field, _)| field == name) {
        *current = value.to_string();
        found = true;
    }
    if !found {
        fields.push((name.to_string(), value.to_string()));
    }
}
