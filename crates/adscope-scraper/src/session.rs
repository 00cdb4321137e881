//! Scrape orchestration: the page loop for one category.
//!
//! A session walks pages `1..=page_count` strictly in order, pacing requests,
//! and stops early on the first fetch failure, the first empty page, or
//! cancellation. Whatever was accumulated up to that point is returned as a
//! [`ScrapeOutcome`]; partial results are valid output.

use std::sync::Arc;
use std::time::Duration;

use adscope_core::{category_id_from_url, RawListing, MAX_PAGE_COUNT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::cache::ScrapeCache;
use crate::client::{validate_category_url, PageFetcher};
use crate::error::ScraperError;
use crate::extract::{CardExtractor, PageExtraction};
use crate::rate_limit::PagePacer;

/// A validated `(url, page_count)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    url: String,
    page_count: u32,
    source_category: String,
}

impl ScrapeRequest {
    /// # Errors
    ///
    /// - [`ScraperError::InvalidCategoryUrl`] if `url` is not an absolute http(s) URL.
    /// - [`ScraperError::InvalidPageCount`] if `page_count` is outside `1..=MAX_PAGE_COUNT`.
    pub fn new(url: &str, page_count: u32) -> Result<Self, ScraperError> {
        validate_category_url(url)?;
        if page_count == 0 || page_count > MAX_PAGE_COUNT {
            return Err(ScraperError::InvalidPageCount {
                requested: page_count,
                max: MAX_PAGE_COUNT,
            });
        }
        let url = url.trim().to_owned();
        let source_category = category_id_from_url(&url);
        Ok(Self {
            url,
            page_count,
            source_category,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Category identifier stamped on every listing, e.g. `"vetements-homme"`.
    #[must_use]
    pub fn source_category(&self) -> &str {
        &self.source_category
    }
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StopReason {
    /// Every requested page was processed.
    Completed,
    /// Page `page_index` had no listing cards.
    EmptyPage { page_index: u32 },
    /// Fetching page `page_index` failed; later pages were not requested.
    FetchFailed { page_index: u32, message: String },
    /// Cancelled before page `page_index` was requested.
    Cancelled { page_index: u32 },
}

impl StopReason {
    /// `true` when the outcome reflects the site's content rather than a
    /// transient condition, so it may be reused.
    ///
    /// An empty first page is never cacheable; the same markup comes back from
    /// challenge and consent interstitials.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        match self {
            StopReason::Completed => true,
            StopReason::EmptyPage { page_index } => *page_index > 1,
            StopReason::FetchFailed { .. } | StopReason::Cancelled { .. } => false,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, StopReason::FetchFailed { .. })
    }
}

/// Progress notification emitted while a session runs.
#[derive(Debug)]
pub enum ScrapeEvent<'a> {
    PageScraped {
        page_index: u32,
        extracted: usize,
        cards_found: usize,
    },
    PageEmpty {
        page_index: u32,
    },
    PageFailed {
        page_index: u32,
        error: &'a ScraperError,
    },
    Cancelled {
        page_index: u32,
    },
}

/// Immutable result of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub session_id: Uuid,
    pub url: String,
    pub source_category: String,
    pub page_count: u32,
    /// Listings in page order, then document order within a page.
    pub listings: Vec<RawListing>,
    pub pages_fetched: u32,
    pub cards_found: usize,
    pub cards_skipped: usize,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Where a [`CachedScrape`] outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    /// Produced by a session run for this call.
    Scraped,
    /// Served from the cache; the listings date from `finished_at`.
    Cache,
}

/// Result of [`Orchestrator::scrape_cached`].
#[derive(Debug, Clone)]
pub struct CachedScrape {
    pub outcome: Arc<ScrapeOutcome>,
    pub source: OutcomeSource,
}

/// Mutable accumulation state; owned by the running loop and consumed into a
/// [`ScrapeOutcome`] when the loop ends.
struct ScrapeSession<'r> {
    request: &'r ScrapeRequest,
    session_id: Uuid,
    started_at: DateTime<Utc>,
    listings: Vec<RawListing>,
    pages_fetched: u32,
    cards_found: usize,
    cards_skipped: usize,
}

impl<'r> ScrapeSession<'r> {
    fn start(request: &'r ScrapeRequest) -> Self {
        Self {
            request,
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            listings: Vec::new(),
            pages_fetched: 0,
            cards_found: 0,
            cards_skipped: 0,
        }
    }

    fn finish(self, stop_reason: StopReason) -> ScrapeOutcome {
        tracing::info!(
            session_id = %self.session_id,
            category = %self.request.source_category,
            pages_fetched = self.pages_fetched,
            listings = self.listings.len(),
            cards_skipped = self.cards_skipped,
            stop_reason = ?stop_reason,
            "scrape session finished"
        );
        ScrapeOutcome {
            session_id: self.session_id,
            url: self.request.url.clone(),
            source_category: self.request.source_category.clone(),
            page_count: self.request.page_count,
            listings: self.listings,
            pages_fetched: self.pages_fetched,
            cards_found: self.cards_found,
            cards_skipped: self.cards_skipped,
            stop_reason,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Drives page fetching and extraction for scrape sessions.
pub struct Orchestrator<F> {
    fetcher: F,
    extractor: CardExtractor,
    inter_page_delay: Duration,
}

impl<F: PageFetcher> Orchestrator<F> {
    /// `inter_page_delay` is raised to the pacing floor if lower.
    #[must_use]
    pub fn new(fetcher: F, extractor: CardExtractor, inter_page_delay: Duration) -> Self {
        Self {
            fetcher,
            extractor,
            inter_page_delay,
        }
    }

    /// Runs one session.
    ///
    /// Never fails: page-level errors end the session and are recorded in
    /// [`ScrapeOutcome::stop_reason`]. `cancel` is checked before every page
    /// request and while waiting out the pacing delay; an in-flight fetch is
    /// allowed to finish.
    pub async fn scrape<E>(
        &self,
        request: &ScrapeRequest,
        cancel: &CancellationToken,
        mut on_event: E,
    ) -> ScrapeOutcome
    where
        E: FnMut(ScrapeEvent<'_>),
    {
        let mut session = ScrapeSession::start(request);
        let mut pacer = PagePacer::new(self.inter_page_delay);

        tracing::info!(
            session_id = %session.session_id,
            url = %request.url,
            page_count = request.page_count,
            "starting scrape session"
        );

        for page_index in 1..=request.page_count {
            let cancelled = cancel.is_cancelled()
                || tokio::select! {
                    biased;
                    () = cancel.cancelled() => true,
                    () = pacer.wait_turn() => false,
                };
            if cancelled {
                tracing::info!(page_index, "scrape cancelled");
                on_event(ScrapeEvent::Cancelled { page_index });
                return session.finish(StopReason::Cancelled { page_index });
            }

            let body = match self.fetcher.fetch_page(&request.url, page_index).await {
                Ok(body) => body,
                Err(error) => {
                    tracing::warn!(
                        page_index,
                        transport = error.is_transport(),
                        error = %error,
                        "page fetch failed; stopping session"
                    );
                    on_event(ScrapeEvent::PageFailed {
                        page_index,
                        error: &error,
                    });
                    return session.finish(StopReason::FetchFailed {
                        page_index,
                        message: error.to_string(),
                    });
                }
            };
            pacer.mark_fetched();
            session.pages_fetched += 1;

            let scraped_at = Utc::now();
            let (cards, skipped) = match self.extractor.extract(&body) {
                PageExtraction::Empty => {
                    tracing::info!(page_index, "no listing cards on page; stopping session");
                    on_event(ScrapeEvent::PageEmpty { page_index });
                    return session.finish(StopReason::EmptyPage { page_index });
                }
                PageExtraction::Cards { cards, skipped } => (cards, skipped),
            };

            let cards_found = cards.len() + skipped.len();
            let extracted = cards.len();
            session.cards_found += cards_found;
            session.cards_skipped += skipped.len();
            session.listings.extend(
                cards
                    .into_iter()
                    .map(|card| card.into_raw(&request.source_category, page_index, scraped_at)),
            );

            if skipped.is_empty() {
                tracing::info!(page_index, extracted, "scraped page");
            } else {
                tracing::warn!(
                    page_index,
                    extracted,
                    cards_found,
                    "scraped page with skipped cards ({extracted} of {cards_found} parsed)"
                );
            }
            on_event(ScrapeEvent::PageScraped {
                page_index,
                extracted,
                cards_found,
            });
        }

        session.finish(StopReason::Completed)
    }

    /// Serves `request` from `cache` when possible, otherwise scrapes and
    /// stores the outcome if it is cacheable.
    pub async fn scrape_cached<E>(
        &self,
        request: &ScrapeRequest,
        cache: &ScrapeCache,
        cancel: &CancellationToken,
        on_event: E,
    ) -> CachedScrape
    where
        E: FnMut(ScrapeEvent<'_>),
    {
        if let Some(hit) = cache.get(request.url(), request.page_count()) {
            tracing::info!(
                url = %request.url,
                page_count = request.page_count,
                listings = hit.listings.len(),
                finished_at = %hit.finished_at,
                "serving scrape from cache"
            );
            return CachedScrape {
                outcome: hit,
                source: OutcomeSource::Cache,
            };
        }

        let outcome = Arc::new(self.scrape(request, cancel, on_event).await);
        cache.insert(Arc::clone(&outcome));
        CachedScrape {
            outcome,
            source: OutcomeSource::Scraped,
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
