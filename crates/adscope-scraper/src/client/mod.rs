//! HTTP client for paginated category listing pages.

mod origin;

use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;

pub use origin::{resolve_listing_url, validate_category_url};

/// Query parameter carrying the 1-based page index.
pub const PAGE_PARAM: &str = "page";

/// Source of raw listing-page markup.
///
/// The orchestrator only depends on this trait, so any HTTP stack (or an
/// in-memory fixture) can drive a scrape session.
pub trait PageFetcher: Send + Sync {
    /// Fetches page `page_index` (1-based) of the category at `base_url` and
    /// returns the response body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Transport`] on connection, timeout, or body-read failure.
    /// - [`ScraperError::HttpStatus`] on any non-2xx status.
    fn fetch_page(
        &self,
        base_url: &str,
        page_index: u32,
    ) -> impl Future<Output = Result<String, ScraperError>> + Send;
}

/// `reqwest`-backed [`PageFetcher`].
///
/// Issues exactly one GET per call; retries are an orchestrator decision and
/// the orchestrator makes none.
pub struct ListingClient {
    client: Client,
}

impl ListingClient {
    /// Creates a `ListingClient` with the given request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Builds the URL for `page_index` of the category at `base_url`.
    ///
    /// Any `page` parameter already present on `base_url` is replaced; other
    /// query parameters are kept in order.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidCategoryUrl`] if `base_url` is not an
    /// absolute http(s) URL.
    pub fn page_url(base_url: &str, page_index: u32) -> Result<String, ScraperError> {
        let mut url = validate_category_url(base_url)?;

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| k != PAGE_PARAM)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &kept {
                pairs.append_pair(k, v);
            }
            pairs.append_pair(PAGE_PARAM, &page_index.to_string());
        }

        Ok(url.to_string())
    }
}

impl PageFetcher for ListingClient {
    async fn fetch_page(&self, base_url: &str, page_index: u32) -> Result<String, ScraperError> {
        let url = Self::page_url(base_url, page_index)?;

        let response = self
            .client
            .get(&url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "fr-FR,fr;q=0.9,en;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
