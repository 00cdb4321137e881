use super::*;

#[test]
fn page_url_appends_page_param() {
    let url =
        ListingClient::page_url("https://sn.coinafrique.com/categorie/vetements-homme", 1).unwrap();
    assert_eq!(
        url,
        "https://sn.coinafrique.com/categorie/vetements-homme?page=1"
    );
}

#[test]
fn page_url_replaces_existing_page_param() {
    let url = ListingClient::page_url(
        "https://sn.coinafrique.com/categorie/telephones?page=7&sort=recent",
        3,
    )
    .unwrap();
    assert_eq!(
        url,
        "https://sn.coinafrique.com/categorie/telephones?sort=recent&page=3"
    );
}

#[test]
fn page_url_keeps_other_query_params() {
    let url =
        ListingClient::page_url("https://sn.coinafrique.com/categorie/ordinateurs?q=hp", 2).unwrap();
    assert_eq!(
        url,
        "https://sn.coinafrique.com/categorie/ordinateurs?q=hp&page=2"
    );
}

#[test]
fn page_url_rejects_relative_url() {
    let result = ListingClient::page_url("/categorie/vetements-homme", 1);
    let err = result.unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidCategoryUrl { .. }),
        "expected InvalidCategoryUrl, got: {err:?}"
    );
}

#[test]
fn validate_category_url_rejects_non_http_scheme() {
    let err = validate_category_url("ftp://sn.coinafrique.com/categorie/x").unwrap_err();
    assert!(
        matches!(err, ScraperError::InvalidCategoryUrl { ref reason, .. } if reason.contains("ftp")),
        "expected scheme rejection, got: {err:?}"
    );
}

#[test]
fn resolve_listing_url_joins_relative_path() {
    assert_eq!(
        resolve_listing_url(
            "https://sn.coinafrique.com",
            "/annonce/vetements-homme/chemise-lin-4521"
        )
        .as_deref(),
        Some("https://sn.coinafrique.com/annonce/vetements-homme/chemise-lin-4521")
    );
}

#[test]
fn resolve_listing_url_keeps_absolute_href() {
    assert_eq!(
        resolve_listing_url("https://sn.coinafrique.com", "https://cdn.example.com/a/1").as_deref(),
        Some("https://cdn.example.com/a/1")
    );
}

#[test]
fn resolve_listing_url_empty_href_is_none() {
    assert!(resolve_listing_url("https://sn.coinafrique.com", "  ").is_none());
}

#[test]
fn resolve_listing_url_bad_origin_is_none() {
    assert!(resolve_listing_url("not an origin", "/annonce/x").is_none());
}

#[test]
fn client_builds_with_custom_user_agent() {
    assert!(ListingClient::new(10, "adscope-test/1.0").is_ok());
}
