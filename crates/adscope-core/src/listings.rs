use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title stored when a card's description element is present but carries no text.
pub const UNTITLED_LISTING: &str = "Untitled listing";

/// Exclusive lower bound for a plausible listing price, in CFA francs.
pub const MIN_VALID_PRICE: u64 = 100;

/// Exclusive upper bound for a plausible listing price, in CFA francs.
pub const MAX_VALID_PRICE: u64 = 10_000_000;

/// Upper (inclusive) edges of the first four price bands, in CFA francs.
///
/// The full bin layout is `(0, 5000] (5000, 20000] (20000, 50000]
/// (50000, 200000] (200000, inf)`. These edges are an analysis setting, not a
/// property of the source data; change them here and every band follows.
pub const PRICE_BAND_BREAKPOINTS: [u64; 4] = [5_000, 20_000, 50_000, 200_000];

/// One listing card as scraped from a category page, before any cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Description text of the card, e.g. `"Chemise en lin manches longues"`.
    pub title: String,
    /// Price label exactly as displayed, e.g. `"15 000 CFA"`.
    pub price_text: String,
    /// Digits of `price_text` with everything else removed; `None` when the
    /// label has no digits (e.g. `"Prix sur demande"`).
    pub price_raw: Option<String>,
    pub location_text: String,
    pub image_url: Option<String>,
    /// Absolute URL of the listing detail page.
    pub listing_url: Option<String>,
    /// Category identifier the card was fetched under, e.g. `"vetements-homme"`.
    pub source_category: String,
    /// 1-based page the card was found on.
    pub page_index: u32,
    pub scraped_at: DateTime<Utc>,
}

/// Discretised price range used for categorical analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PriceBand {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl PriceBand {
    /// All bands in ascending price order.
    pub const ALL: [PriceBand; 5] = [
        PriceBand::VeryLow,
        PriceBand::Low,
        PriceBand::Medium,
        PriceBand::High,
        PriceBand::VeryHigh,
    ];

    /// Assigns the band for `price` using [`PRICE_BAND_BREAKPOINTS`].
    ///
    /// Bands are closed on the right: `5000` is `VeryLow`, `5001` is `Low`.
    #[must_use]
    pub fn from_price(price: u64) -> Self {
        let [very_low, low, medium, high] = PRICE_BAND_BREAKPOINTS;
        if price <= very_low {
            PriceBand::VeryLow
        } else if price <= low {
            PriceBand::Low
        } else if price <= medium {
            PriceBand::Medium
        } else if price <= high {
            PriceBand::High
        } else {
            PriceBand::VeryHigh
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceBand::VeryLow => "VeryLow",
            PriceBand::Low => "Low",
            PriceBand::Medium => "Medium",
            PriceBand::High => "High",
            PriceBand::VeryHigh => "VeryHigh",
        }
    }
}

impl std::fmt::Display for PriceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A [`RawListing`] that passed the price filter, enriched with derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanListing {
    #[serde(flatten)]
    pub raw: RawListing,
    /// Numeric price in CFA francs; always within
    /// `(MIN_VALID_PRICE, MAX_VALID_PRICE)`.
    pub price_value: u64,
    /// Canonical city name, e.g. `"Dakar"`.
    pub city: String,
    /// Keyword-derived sub-category, `"Other"` when nothing matched.
    pub sub_category: String,
    pub price_band: PriceBand,
    /// English weekday name of `raw.scraped_at` in UTC, e.g. `"Monday"`.
    pub weekday: String,
    /// Hour of day of `raw.scraped_at` in UTC, `0..=23`. No local-time
    /// conversion is applied; Senegal keeps UTC+0 all year, so this is also
    /// the site's wall-clock hour.
    pub hour_of_day: u32,
}

/// Returns `true` when `price` lies strictly inside the plausible price range.
#[must_use]
pub fn is_valid_price(price: u64) -> bool {
    price > MIN_VALID_PRICE && price < MAX_VALID_PRICE
}
