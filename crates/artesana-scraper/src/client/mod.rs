//! HTTP client for the storefront's HTML pages and image assets.

mod origin;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;
use crate::rate_limit::RequestThrottle;

pub use origin::{absolutize_url, parse_base_url, path_extension};

/// HTTP client for one storefront.
///
/// Cookies and keep-alive connections are shared across every request made
/// through clones of the same client, as is the request throttle. Non-2xx
/// responses are returned as [`ScraperError::UnexpectedStatus`]; there is no
/// retry policy.
#[derive(Clone)]
pub struct StorefrontClient {
    client: Client,
    base_url: Url,
    throttle: Arc<RequestThrottle>,
    page_timeout: Duration,
    download_timeout: Duration,
}

impl StorefrontClient {
    /// Creates a client with a browser-like `User-Agent`, a cookie store,
    /// per-request timeouts, and a global inter-request delay.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidBaseUrl`] if `base_url` does not parse
    /// and [`ScraperError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        base_url: &str,
        user_agent: &str,
        page_timeout_secs: u64,
        download_timeout_secs: u64,
        inter_request_delay_ms: u64,
    ) -> Result<Self, ScraperError> {
        let base_url = parse_base_url(base_url)?;
        let page_timeout = Duration::from_secs(page_timeout_secs);
        let client = Client::builder()
            .timeout(page_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            base_url,
            throttle: Arc::new(RequestThrottle::new(Duration::from_millis(
                inter_request_delay_ms,
            ))),
            page_timeout,
            download_timeout: Duration::from_secs(download_timeout_secs),
        })
    }

    /// Builds a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn from_config(config: &artesana_core::AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            &config.base_url,
            &config.user_agent,
            config.page_timeout_secs,
            config.download_timeout_secs,
            config.inter_request_delay_ms,
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves a page-relative reference against the storefront base URL.
    #[must_use]
    pub fn absolutize(&self, candidate: &str) -> Option<String> {
        absolutize_url(&self.base_url, candidate)
    }

    /// Fetches an HTML page body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] on any non-2xx status.
    /// - [`ScraperError::Http`] on network failure or timeout.
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        self.throttle.acquire().await;
        tracing::debug!(url, "fetching page");
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "es-MX,es;q=0.9,en;q=0.8")
            .timeout(self.page_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.text().await?)
    }

    /// Fetches a binary asset (image) in full.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] on any non-2xx status.
    /// - [`ScraperError::Http`] on network failure or timeout.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ScraperError> {
        self.throttle.acquire().await;
        tracing::debug!(url, "fetching asset");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "image/avif,image/webp,image/*,*/*;q=0.8")
            .timeout(self.download_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
