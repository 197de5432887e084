//! HTTP agent
//!
//! This module handles all HTTP traffic with the site, including:
//! - Building an HTTP client that keeps session cookies between requests
//! - GET requests for pages
//! - Following link handles with the right Referer
//! - Submitting forms the way a browser would
//! - Error classification

use crate::agent::form::{Button, Form, Method};
use crate::agent::page::{Link, Page};
use crate::config::UserAgentConfig;
use crate::{Result, SubwayError};
use reqwest::header::REFERER;
use reqwest::{redirect::Policy, Client, RequestBuilder};
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Builds an HTTP client with a cookie store and proper identification
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    // Format: Name/Version
    let user_agent = format!("{}/{}", config.name, config.version);

    Client::builder()
        .user_agent(user_agent)
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A browsing session: one HTTP client and the cookies it has collected
#[derive(Debug, Clone)]
pub struct Agent {
    client: Client,
}

impl Agent {
    pub fn new(config: &UserAgentConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches a page
    pub async fn get(&self, url: &Url) -> Result<Page> {
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url.clone()), url).await
    }

    /// Follows a link found on a previously fetched page
    pub async fn click(&self, link: &Link) -> Result<Page> {
        tracing::debug!("Following link {} -> {}", link.href(), link.url());
        let request = self
            .client
            .get(link.url().clone())
            .header(REFERER, link.referer().as_str());
        self.send(request, link.url()).await
    }

    /// Submits a form as if `button` had been clicked
    ///
    /// With no button only the form's fields are sent.
    pub async fn submit(&self, form: &Form, button: Option<&Button>) -> Result<Page> {
        let pairs = form.submission(button);
        let action = form.action();
        tracing::debug!(
            "{:?} {} ({} fields)",
            form.method(),
            action,
            pairs.len()
        );

        let request = match form.method() {
            Method::Post => self.client.post(action.clone()).form(&pairs),
            Method::Get => {
                // A GET submission replaces the action's query string
                let mut url = action.clone();
                url.set_query(None);
                self.client.get(url).query(&pairs)
            }
        };

        self.send(request.header(REFERER, form.page_url().as_str()), action)
            .await
    }

    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Page> {
        let response = request.send().await.map_err(|source| classify(url, source))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(SubwayError::Status {
                url: final_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| SubwayError::Http {
            url: final_url.to_string(),
            source,
        })?;

        tracing::debug!(
            "Fetched {} ({} {} bytes)",
            final_url,
            status.as_u16(),
            body.len()
        );

        Ok(Page::parse(final_url, body))
    }
}

/// Wraps a transport error with the URL that was being requested
fn classify(url: &Url, source: reqwest::Error) -> SubwayError {
    if source.is_timeout() {
        tracing::warn!("Request timeout for {}", url);
    } else if source.is_connect() {
        tracing::warn!("Connection refused for {}", url);
    } else if source.is_redirect() {
        tracing::warn!("Too many redirects from {}", url);
    }

    SubwayError::Http {
        url: url.to_string(),
        source,
    }
}
