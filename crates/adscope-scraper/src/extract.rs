//! Listing-card extraction from one category page.
//!
//! Extraction is synchronous and returns owned data: `scraper::Html` is not
//! `Send`, so it must never live across an `.await` in the orchestrator.

use std::fmt;
use std::sync::LazyLock;

use adscope_core::{RawListing, UNTITLED_LISTING};
use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::client::resolve_listing_url;
use crate::parse::price_digits;

static CARD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.col.s6.m4.l3").expect("valid card selector"));
static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.ad__card-description").expect("valid title selector"));
static PRICE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.ad__card-price").expect("valid price selector"));
static LOCATION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.ad__card-location span").expect("valid location selector"));
static IMAGE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.ad__card-img").expect("valid image selector"));
static LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Required card field that can cause a card to be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Title,
    Price,
    Location,
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CardField::Title => "title",
            CardField::Price => "price",
            CardField::Location => "location",
        })
    }
}

/// Why a single card was left out of the page result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardSkip {
    /// The element carrying the field is not in the card.
    MissingElement(CardField),
    /// The element exists but holds only whitespace.
    EmptyField(CardField),
}

impl fmt::Display for CardSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardSkip::MissingElement(field) => write!(f, "missing {field} element"),
            CardSkip::EmptyField(field) => write!(f, "empty {field}"),
        }
    }
}

/// A skipped card and its 0-based position among the page's cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCard {
    pub position: usize,
    pub reason: CardSkip,
}

/// Fields read from one card, before the session stamps its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCard {
    pub title: String,
    pub price_text: String,
    pub location_text: String,
    pub image_url: Option<String>,
    pub listing_url: Option<String>,
}

impl ExtractedCard {
    /// Stamps the card with the session's provenance fields.
    #[must_use]
    pub fn into_raw(
        self,
        source_category: &str,
        page_index: u32,
        scraped_at: DateTime<Utc>,
    ) -> RawListing {
        let price_raw = price_digits(&self.price_text);
        RawListing {
            title: self.title,
            price_text: self.price_text,
            price_raw,
            location_text: self.location_text,
            image_url: self.image_url,
            listing_url: self.listing_url,
            source_category: source_category.to_owned(),
            page_index,
            scraped_at,
        }
    }
}

/// Result of extracting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageExtraction {
    /// No card container on the page: the category has no more content.
    Empty,
    /// At least one card container was found. `cards` may still be empty if
    /// every card was skipped.
    Cards {
        cards: Vec<ExtractedCard>,
        skipped: Vec<SkippedCard>,
    },
}

impl PageExtraction {
    /// Number of card containers found on the page.
    #[must_use]
    pub fn cards_found(&self) -> usize {
        match self {
            PageExtraction::Empty => 0,
            PageExtraction::Cards { cards, skipped } => cards.len() + skipped.len(),
        }
    }
}

/// Parses listing pages using the site's card layout.
#[derive(Debug, Clone)]
pub struct CardExtractor {
    site_origin: String,
}

impl CardExtractor {
    /// `site_origin` is the origin relative listing links are resolved against.
    #[must_use]
    pub fn new(site_origin: impl Into<String>) -> Self {
        Self {
            site_origin: site_origin.into(),
        }
    }

    /// Extracts every card on the page, in document order.
    ///
    /// A malformed card never affects its neighbours: it is reported in
    /// `skipped` and extraction moves on.
    #[must_use]
    pub fn extract(&self, markup: &str) -> PageExtraction {
        let document = Html::parse_document(markup);

        let mut cards = Vec::new();
        let mut skipped = Vec::new();
        let mut found_any = false;

        for (position, card) in document.select(&CARD_SEL).enumerate() {
            found_any = true;
            match self.extract_card(card) {
                Ok(extracted) => cards.push(extracted),
                Err(reason) => {
                    tracing::debug!(position, %reason, "skipping listing card");
                    skipped.push(SkippedCard { position, reason });
                }
            }
        }

        if found_any {
            PageExtraction::Cards { cards, skipped }
        } else {
            PageExtraction::Empty
        }
    }

    fn extract_card(&self, card: ElementRef<'_>) -> Result<ExtractedCard, CardSkip> {
        let title = match first_text(card, &TITLE_SEL) {
            None => return Err(CardSkip::MissingElement(CardField::Title)),
            Some(text) if text.is_empty() => UNTITLED_LISTING.to_owned(),
            Some(text) => text,
        };
        let price_text = required_text(card, &PRICE_SEL, CardField::Price)?;
        let location_text = required_text(card, &LOCATION_SEL, CardField::Location)?;

        let image_url = card
            .select(&IMAGE_SEL)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_owned);

        let listing_url = card
            .select(&LINK_SEL)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| resolve_listing_url(&self.site_origin, href));

        Ok(ExtractedCard {
            title,
            price_text,
            location_text,
            image_url,
            listing_url,
        })
    }
}

/// Whitespace-collapsed text of the first element matching `selector`, or
/// `None` when no element matches.
fn first_text(card: ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector).next().map(|el| {
        let joined: String = el.text().collect();
        WHITESPACE_RE.replace_all(joined.trim(), " ").into_owned()
    })
}

fn required_text(
    card: ElementRef<'_>,
    selector: &Selector,
    field: CardField,
) -> Result<String, CardSkip> {
    match first_text(card, selector) {
        None => Err(CardSkip::MissingElement(field)),
        Some(text) if text.is_empty() => Err(CardSkip::EmptyField(field)),
        Some(text) => Ok(text),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
