//! URL validation and link resolution against the listing site's origin.

use reqwest::Url;

use crate::error::ScraperError;

/// Parses `url` and checks that it is an absolute http(s) URL with a host.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidCategoryUrl`] otherwise.
pub fn validate_category_url(url: &str) -> Result<Url, ScraperError> {
    let invalid = |reason: String| ScraperError::InvalidCategoryUrl {
        url: url.to_owned(),
        reason,
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(parsed)
}

/// Resolves a card's `href` against `site_origin`.
///
/// Relative paths (`/vetements-homme/chemise-123`) are joined onto the origin;
/// absolute URLs are returned unchanged. Returns `None` when either side does
/// not parse or the href is empty.
#[must_use]
pub fn resolve_listing_url(site_origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(site_origin).map_or_else(
        |e| {
            tracing::warn!(
                site_origin,
                error = %e,
                "could not parse site origin; listing links left unresolved"
            );
            None
        },
        Some,
    )?;
    base.join(href).ok().map(String::from)
}
