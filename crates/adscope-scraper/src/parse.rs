//! Pure text helpers shared by the extractor and the normalizer.

use chrono::{DateTime, Datelike, Utc, Weekday};

use crate::rules::{CITY_SYNONYMS, OTHER_SUB_CATEGORY, SUB_CATEGORY_KEYWORDS, UNKNOWN_CITY};

/// Keeps only the ASCII digits of a price label.
///
/// `"15 000 CFA"` → `"15000"`, `"CFA 15,000"` → `"15000"`. Returns `None` when
/// the label contains no digit at all.
#[must_use]
pub fn price_digits(price_text: &str) -> Option<String> {
    let digits: String = price_text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Parses a price label into whole CFA francs.
///
/// Returns `None` for labels without digits and for digit runs too large for
/// a `u64`; never coerces to zero.
#[must_use]
pub fn parse_price_value(price_text: &str) -> Option<u64> {
    price_digits(price_text)?.parse().ok()
}

/// Maps a free-text location label to a canonical city name.
///
/// The label is split on commas. Each segment is upper-cased and searched for a
/// [`CITY_SYNONYMS`] key occurring as a whole token; the longest matching key
/// wins. The first segment that matches decides the city. When no segment
/// matches, the first segment is title-cased.
///
/// `"DKR, Plateau"` → `"Dakar"`, `"Parcelles Assainies, Dakar"` → `"Dakar"`,
/// `"rufisque"` → `"Rufisque"`.
#[must_use]
pub fn canonical_city(location_text: &str) -> String {
    let segments: Vec<&str> = location_text
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    for segment in &segments {
        if let Some(city) = match_city_synonym(&segment.to_uppercase()) {
            return city.to_owned();
        }
    }

    segments
        .first()
        .map_or_else(|| UNKNOWN_CITY.to_owned(), |first| title_case(first))
}

fn match_city_synonym(upper: &str) -> Option<&'static str> {
    CITY_SYNONYMS
        .iter()
        .filter(|(key, _)| contains_token(upper, key))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, city)| *city)
}

/// `true` when `needle` occurs in `haystack` bounded by non-alphanumeric
/// characters or the ends of the string.
fn contains_token(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// Upper-cases the first letter of every word and lower-cases the rest.
///
/// Words are delimited by any non-alphabetic character, so `"SAINT-LOUIS"`
/// becomes `"Saint-Louis"`.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for c in text.trim().chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// First [`SUB_CATEGORY_KEYWORDS`] label whose keyword occurs in `title`,
/// case-insensitively; [`OTHER_SUB_CATEGORY`] otherwise.
#[must_use]
pub fn sub_category_for(title: &str) -> &'static str {
    let lowered = title.to_lowercase();
    SUB_CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(*keyword))
        .map_or(OTHER_SUB_CATEGORY, |(_, label)| *label)
}

/// English weekday name of `at`, e.g. `"Monday"`.
#[must_use]
pub fn weekday_name(at: &DateTime<Utc>) -> &'static str {
    match at.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
