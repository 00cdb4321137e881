//! Cleaning pipeline from [`RawListing`] to [`CleanListing`].
//!
//! Every function here is pure: the same raw input always yields the same
//! output, and nothing is retained between calls.

use std::fmt;

use adscope_core::{is_valid_price, CleanListing, PriceBand, RawListing};
use chrono::Timelike;

use crate::parse::{canonical_city, parse_price_value, sub_category_for, weekday_name};

/// Why a raw listing did not make it into the cleaned set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The price label holds no parseable number.
    UnparsablePrice,
    /// The parsed price lies outside the plausible range.
    PriceOutOfRange(u64),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::UnparsablePrice => f.write_str("unparsable price"),
            DropReason::PriceOutOfRange(price) => write!(f, "price {price} out of range"),
        }
    }
}

/// Cleans a single listing.
///
/// # Errors
///
/// Returns the [`DropReason`] when the listing's price is unusable.
pub fn normalize_listing(raw: &RawListing) -> Result<CleanListing, DropReason> {
    let price_value = parse_price_value(&raw.price_text).ok_or(DropReason::UnparsablePrice)?;
    if !is_valid_price(price_value) {
        return Err(DropReason::PriceOutOfRange(price_value));
    }

    Ok(CleanListing {
        price_value,
        city: canonical_city(&raw.location_text),
        sub_category: sub_category_for(&raw.title).to_owned(),
        price_band: PriceBand::from_price(price_value),
        weekday: weekday_name(&raw.scraped_at).to_owned(),
        hour_of_day: raw.scraped_at.hour(),
        raw: raw.clone(),
    })
}

/// Cleans a batch, silently dropping listings with unusable prices.
///
/// Output order follows input order.
#[must_use]
pub fn normalize_listings(raw: &[RawListing]) -> Vec<CleanListing> {
    normalize_with_report(raw).listings
}

/// Cleaned listings plus a tally of what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub listings: Vec<CleanListing>,
    pub unparsable_price: usize,
    pub out_of_range: usize,
}

impl NormalizeReport {
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.unparsable_price + self.out_of_range
    }
}

/// Like [`normalize_listings`], but also counts dropped listings by reason.
#[must_use]
pub fn normalize_with_report(raw: &[RawListing]) -> NormalizeReport {
    let mut report = NormalizeReport {
        listings: Vec::with_capacity(raw.len()),
        ..NormalizeReport::default()
    };

    for listing in raw {
        match normalize_listing(listing) {
            Ok(clean) => report.listings.push(clean),
            Err(DropReason::UnparsablePrice) => report.unparsable_price += 1,
            Err(DropReason::PriceOutOfRange(_)) => report.out_of_range += 1,
        }
    }

    if report.dropped() > 0 {
        tracing::debug!(
            kept = report.listings.len(),
            unparsable_price = report.unparsable_price,
            out_of_range = report.out_of_range,
            "dropped listings during normalization"
        );
    }

    report
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
