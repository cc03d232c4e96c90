//! Fetched page handle and DOM queries
//!
//! A [`Page`] owns the raw markup and the URL it was served from. The DOM is
//! parsed on demand with `scraper`, so a page can be held across await points
//! while the parsed tree never is.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static FORM: Lazy<Selector> = Lazy::new(|| Selector::parse("form").expect("valid selector"));
static NAMED: Lazy<Selector> = Lazy::new(|| Selector::parse("[name]").expect("valid selector"));
static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    body: String,
}

impl Page {
    pub fn new(url: Url, body: String) -> Self {
        Self { url, body }
    }

    /// Final URL of the page, after redirects
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Parses the body into a DOM tree
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Result of looking for the history listing form
#[derive(Debug, Clone, Copy)]
pub enum ContentLookup<'a> {
    /// The listing form is present
    Found(ElementRef<'a>),

    /// The listing form is missing
    Absent {
        /// Whether the page has any form at all
        has_forms: bool,
        /// Whether the page has a password field, i.e. is a login prompt
        has_password_field: bool,
    },
}

/// Looks for the form named `form_name`, probing for a login prompt when absent
pub fn find_content_form<'a>(
    document: &'a Html,
    form_name: &str,
    password_field: &str,
) -> ContentLookup<'a> {
    match form_by_name(document, form_name) {
        Some(form) => ContentLookup::Found(form),
        None => ContentLookup::Absent {
            has_forms: document.select(&FORM).next().is_some(),
            has_password_field: has_named_element(document, password_field),
        },
    }
}

/// All forms of the document, in document order
pub fn forms(document: &Html) -> Vec<ElementRef<'_>> {
    document.select(&FORM).collect()
}

/// The first form whose `name` attribute equals `name`
pub fn form_by_name<'a>(document: &'a Html, name: &str) -> Option<ElementRef<'a>> {
    document
        .select(&FORM)
        .find(|form| form.value().attr("name") == Some(name))
}

/// Whether any element of the document has `name="<name>"`
pub fn has_named_element(document: &Html, name: &str) -> bool {
    document
        .select(&NAMED)
        .any(|el| el.value().attr("name") == Some(name))
}

/// Finds the first element under `scope` (or `scope` itself) named `name`
/// whose tag is one of `tags`
pub fn named_control<'a>(scope: ElementRef<'a>, name: &str, tags: &[&str]) -> Option<ElementRef<'a>> {
    std::iter::once(scope)
        .chain(scope.select(&NAMED))
        .find(|el| el.value().attr("name") == Some(name) && tags.contains(&el.value().name()))
}

/// Finds a link whose visible text equals `text` and returns its href
/// resolved against the page URL
pub fn anchor_by_text(document: &Html, base: &Url, text: &str) -> Option<Url> {
    document
        .select(&ANCHOR)
        .find(|a| normalized_text(*a) == text)
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base.join(href.trim()).ok())
}

/// First element matching `selector`, checking `scope` itself before its
/// descendants
pub fn first_match<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    if selector.matches(&scope) {
        return Some(scope);
    }
    scope.select(selector).next()
}

/// Concatenated text content of an element
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text content with runs of whitespace collapsed and ends trimmed
pub fn normalized_text(element: ElementRef<'_>) -> String {
    text_content(element)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
