//! Plain-text rendering of scrape outcomes and listing summaries.

use std::fmt::Write as _;

use adscope_core::{ListingSummary, PriceBand};
use adscope_scraper::{NormalizeReport, OutcomeSource, ScrapeEvent, ScrapeOutcome, StopReason};

/// One progress line for a scrape event.
pub fn render_event(category: &str, event: &ScrapeEvent<'_>) -> String {
    match event {
        ScrapeEvent::PageScraped {
            page_index,
            extracted,
            cards_found,
        } => format!("[{category}] page {page_index}: {extracted} of {cards_found} listings parsed"),
        ScrapeEvent::PageEmpty { page_index } => {
            format!("[{category}] page {page_index}: no listings, stopping")
        }
        ScrapeEvent::PageFailed { page_index, error } => {
            format!("[{category}] page {page_index}: request failed ({error}), stopping")
        }
        ScrapeEvent::Cancelled { page_index } => {
            format!("[{category}] cancelled before page {page_index}")
        }
    }
}

pub fn render_stop_reason(reason: &StopReason) -> String {
    match reason {
        StopReason::Completed => "all requested pages scraped".to_owned(),
        StopReason::EmptyPage { page_index: 1 } => "no listings on the first page".to_owned(),
        StopReason::EmptyPage { page_index } => {
            format!("no more listings after page {}", page_index - 1)
        }
        StopReason::FetchFailed {
            page_index,
            message,
        } => format!("stopped at page {page_index}: {message}"),
        StopReason::Cancelled { page_index } => format!("cancelled before page {page_index}"),
    }
}

/// Session totals and cleaning results for one category.
pub fn render_outcome(
    outcome: &ScrapeOutcome,
    source: OutcomeSource,
    normalized: &NormalizeReport,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} raw listings from {} of {} pages ({})",
        outcome.source_category,
        outcome.listings.len(),
        outcome.pages_fetched,
        outcome.page_count,
        render_stop_reason(&outcome.stop_reason),
    );
    let finished = outcome.finished_at.format("%Y-%m-%d %H:%M:%S UTC");
    let _ = match source {
        OutcomeSource::Scraped => writeln!(out, "  scraped {finished}"),
        OutcomeSource::Cache => {
            writeln!(out, "  from cache, scraped {finished} (--refresh to scrape again)")
        }
    };
    if outcome.cards_skipped > 0 {
        let _ = writeln!(
            out,
            "  {} of {} cards could not be parsed",
            outcome.cards_skipped, outcome.cards_found
        );
    }
    let _ = writeln!(
        out,
        "  {} cleaned, {} dropped ({} without a price, {} out of range)",
        normalized.listings.len(),
        normalized.dropped(),
        normalized.unparsable_price,
        normalized.out_of_range,
    );
    out
}

/// Multi-section summary of cleaned listings.
pub fn render_summary(summary: &ListingSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Listings: {}", summary.total);

    let Some(price) = &summary.price else {
        return out;
    };
    let _ = writeln!(
        out,
        "Price (CFA): mean {:.0}, min {}, max {}",
        price.mean, price.min, price.max
    );

    let _ = writeln!(out, "\nTop cities:");
    for city in &summary.top_cities {
        let _ = writeln!(out, "  {:<24} {:>6}", city.city, city.count);
    }

    let _ = writeln!(out, "\nHighest mean price by city:");
    for city in &summary.top_cities_by_mean_price {
        let _ = writeln!(
            out,
            "  {:<24} {:>12.0} ({} listings)",
            city.city, city.mean_price, city.count
        );
    }

    let _ = writeln!(out, "\nSub-categories:");
    for (name, count) in &summary.sub_categories {
        let _ = writeln!(out, "  {name:<24} {count:>6}");
    }

    if summary.source_categories.len() > 1 {
        let _ = writeln!(out, "\nSource categories:");
        for (name, count) in &summary.source_categories {
            let _ = writeln!(out, "  {name:<24} {count:>6}");
        }
    }

    let _ = write!(out, "\n{:<24}", "Price bands");
    for band in PriceBand::ALL {
        let _ = write!(out, " {:>9}", band.as_str());
    }
    let _ = writeln!(out);
    for (sub_category, counts) in &summary.band_matrix {
        let _ = write!(out, "  {sub_category:<22}");
        for count in counts {
            let _ = write!(out, " {count:>9}");
        }
        let _ = writeln!(out);
    }

    out
}
