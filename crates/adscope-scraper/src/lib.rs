//! Listing scraper for paginated classified-ad category pages.
//!
//! Pipeline: [`ListingClient`] fetches a page, [`CardExtractor`] turns it into
//! cards, [`Orchestrator`] drives the page loop into a [`ScrapeOutcome`], and
//! [`normalize_listings`] derives [`adscope_core::CleanListing`] records.

pub mod cache;
pub mod client;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod parse;
pub(crate) mod rate_limit;
pub mod rules;
pub mod session;

pub use cache::ScrapeCache;
pub use client::{ListingClient, PageFetcher};
pub use error::ScraperError;
pub use extract::{CardExtractor, CardField, CardSkip, ExtractedCard, PageExtraction, SkippedCard};
pub use normalize::{
    normalize_listing, normalize_listings, normalize_with_report, DropReason, NormalizeReport,
};
pub use session::{
    CachedScrape, Orchestrator, OutcomeSource, ScrapeEvent, ScrapeOutcome, ScrapeRequest,
    StopReason,
};
