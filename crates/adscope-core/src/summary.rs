//! Aggregate views over cleaned listings: headline price statistics, city and
//! sub-category breakdowns, and a simple row filter.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::listings::{CleanListing, PriceBand};

const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub mean: f64,
    pub min: u64,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityCount {
    pub city: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityMeanPrice {
    pub city: String,
    pub mean_price: f64,
    pub count: usize,
}

/// Headline numbers for a set of cleaned listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingSummary {
    pub total: usize,
    /// `None` when there are no listings.
    pub price: Option<PriceStats>,
    /// Ten most frequent cities, most frequent first.
    pub top_cities: Vec<CityCount>,
    /// Ten cities with the highest mean price, most expensive first.
    pub top_cities_by_mean_price: Vec<CityMeanPrice>,
    /// Listing count per sub-category, largest first.
    pub sub_categories: Vec<(String, usize)>,
    /// Listing count per source category, largest first.
    pub source_categories: Vec<(String, usize)>,
    /// Per sub-category, listing counts indexed like [`PriceBand::ALL`].
    pub band_matrix: BTreeMap<String, [usize; 5]>,
}

impl ListingSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_listings(listings: &[CleanListing]) -> Self {
        let price = price_stats(listings);

        let mut city_counts: HashMap<&str, (usize, u64)> = HashMap::new();
        let mut sub_counts: HashMap<&str, usize> = HashMap::new();
        let mut source_counts: HashMap<&str, usize> = HashMap::new();
        let mut band_matrix: BTreeMap<String, [usize; 5]> = BTreeMap::new();

        for listing in listings {
            let entry = city_counts.entry(listing.city.as_str()).or_default();
            entry.0 += 1;
            entry.1 = entry.1.saturating_add(listing.price_value);

            *sub_counts.entry(listing.sub_category.as_str()).or_default() += 1;
            *source_counts
                .entry(listing.raw.source_category.as_str())
                .or_default() += 1;

            let row = band_matrix
                .entry(listing.sub_category.clone())
                .or_insert([0; 5]);
            row[band_index(listing.price_band)] += 1;
        }

        let mut top_cities: Vec<CityCount> = city_counts
            .iter()
            .map(|(city, (count, _))| CityCount {
                city: (*city).to_owned(),
                count: *count,
            })
            .collect();
        top_cities.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.city.cmp(&b.city)));
        top_cities.truncate(TOP_N);

        let mut top_cities_by_mean_price: Vec<CityMeanPrice> = city_counts
            .iter()
            .map(|(city, (count, sum))| CityMeanPrice {
                city: (*city).to_owned(),
                mean_price: *sum as f64 / *count as f64,
                count: *count,
            })
            .collect();
        top_cities_by_mean_price.sort_by(|a, b| {
            b.mean_price
                .total_cmp(&a.mean_price)
                .then_with(|| a.city.cmp(&b.city))
        });
        top_cities_by_mean_price.truncate(TOP_N);

        Self {
            total: listings.len(),
            price,
            top_cities,
            top_cities_by_mean_price,
            sub_categories: sorted_counts(sub_counts),
            source_categories: sorted_counts(source_counts),
            band_matrix,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn price_stats(listings: &[CleanListing]) -> Option<PriceStats> {
    let min = listings.iter().map(|l| l.price_value).min()?;
    let max = listings.iter().map(|l| l.price_value).max()?;
    let sum: u128 = listings.iter().map(|l| u128::from(l.price_value)).sum();
    Some(PriceStats {
        mean: sum as f64 / listings.len() as f64,
        min,
        max,
    })
}

fn sorted_counts(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

fn band_index(band: PriceBand) -> usize {
    PriceBand::ALL
        .iter()
        .position(|b| *b == band)
        .unwrap_or_default()
}

/// Row filter over cleaned listings.
///
/// Empty `categories` / `cities` mean "any"; price bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub categories: Vec<String>,
    pub cities: Vec<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

impl ListingFilter {
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.categories.is_empty()
            && self.cities.is_empty()
            && self.min_price.is_none()
            && self.max_price.is_none()
    }

    #[must_use]
    pub fn matches(&self, listing: &CleanListing) -> bool {
        let category_ok = self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|c| c == &listing.raw.source_category);
        let city_ok = self.cities.is_empty()
            || self
                .cities
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&listing.city));
        let min_ok = self.min_price.is_none_or(|min| listing.price_value >= min);
        let max_ok = self.max_price.is_none_or(|max| listing.price_value <= max);
        category_ok && city_ok && min_ok && max_ok
    }

    /// Returns the matching listings, preserving input order.
    #[must_use]
    pub fn apply(&self, listings: &[CleanListing]) -> Vec<CleanListing> {
        listings
            .iter()
            .filter(|l| self.matches(l))
            .cloned()
            .collect()
    }
}
