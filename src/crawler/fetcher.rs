//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building an HTTP client with a cookie jar so the session survives
//!   between pages
//! - GET requests for the entry page and previous-page links
//! - Form submissions (GET or POST) for signing in
//!
//! Redirects are followed by the client; the returned [`Page`] carries the
//! final URL so relative links resolve against the page actually served.

use crate::crawler::page::Page;
use crate::HarvestError;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use url::Url;

/// HTTP method of a form submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

impl FormMethod {
    /// Parses a form's `method` attribute; anything but POST is GET
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(m) if m.trim().eq_ignore_ascii_case("post") => Self::Post,
            _ => Self::Get,
        }
    }
}

/// A filled-in form, ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub method: FormMethod,
    pub action: Url,
    pub fields: Vec<(String, String)>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Session-aware page fetcher
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(user_agent: &str) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }

    /// Fetches a page with a GET request
    pub async fn open(&self, url: &Url) -> Result<Page, HarvestError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| HarvestError::Http {
                url: url.to_string(),
                source,
            })?;
        into_page(url, response).await
    }

    /// Sends a filled-in form and returns the resulting page
    pub async fn submit(&self, form: &FormSubmission) -> Result<Page, HarvestError> {
        tracing::debug!("{:?} {} ({} fields)", form.method, form.action, form.fields.len());
        let request = match form.method {
            FormMethod::Post => self.client.post(form.action.clone()).form(&form.fields),
            FormMethod::Get => self.client.get(form.action.clone()).query(&form.fields),
        };
        let response = request.send().await.map_err(|source| HarvestError::Http {
            url: form.action.to_string(),
            source,
        })?;
        into_page(&form.action, response).await
    }
}

/// Turns a response into a page, rejecting non-success statuses
async fn into_page(requested: &Url, response: Response) -> Result<Page, HarvestError> {
    let status = response.status();
    if !status.is_success() {
        return Err(HarvestError::HttpStatus {
            url: requested.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().clone();
    let body = response.text().await.map_err(|source| HarvestError::Http {
        url: requested.to_string(),
        source,
    })?;

    Ok(Page::new(final_url, body))
}
