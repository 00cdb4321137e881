//! Integration tests for `ListingClient` and a full scrape session against a
//! local `wiremock` server. No real network traffic is made.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adscope_scraper::{
    normalize_listings, CardExtractor, ListingClient, Orchestrator, PageFetcher, ScrapeRequest,
    ScraperError, StopReason,
};

const LISTING_PAGE: &str = include_str!("fixtures/listing_page.html");
const EMPTY_PAGE: &str = "<html><body><p>Aucune annonce pour le moment</p></body></html>";

fn test_client() -> ListingClient {
    ListingClient::new(5, "adscope-test/0.1").expect("failed to build test ListingClient")
}

fn category_url(server: &MockServer) -> String {
    format!("{}/categorie/vetements-homme", server.uri())
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

#[tokio::test]
async fn fetch_page_returns_body_and_sends_page_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .and(query_param("page", "3"))
        .and(header("user-agent", "adscope-test/0.1"))
        .respond_with(html(LISTING_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let body = test_client()
        .fetch_page(&category_url(&server), 3)
        .await
        .expect("page 3 should be served");

    assert!(body.contains("ad__card-description"));
}

#[tokio::test]
async fn fetch_page_maps_404_to_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_page(&category_url(&server), 1)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::HttpStatus { status: 404, ref url } if url.ends_with("?page=1")),
        "expected HttpStatus 404, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_page_maps_503_to_http_status_without_retrying() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client()
        .fetch_page(&category_url(&server), 1)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::HttpStatus { status: 503, .. }),
        "expected HttpStatus 503, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_page_timeout_is_transport_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .respond_with(html(LISTING_PAGE).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let client = ListingClient::new(1, "adscope-test/0.1").expect("client");
    let err = client
        .fetch_page(&category_url(&server), 1)
        .await
        .unwrap_err();

    assert!(err.is_transport(), "expected transport error, got: {err:?}");
}

#[tokio::test]
async fn fetch_page_connection_refused_is_transport_error() {
    // Nothing listens on port 1.
    let url = "http://127.0.0.1:1/categorie/vetements-homme";

    let err = test_client().fetch_page(url, 1).await.unwrap_err();
    assert!(
        matches!(err, ScraperError::Transport(_)),
        "expected Transport, got: {err:?}"
    );
}

#[tokio::test]
async fn scrape_stops_at_empty_page_and_normalizes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .and(query_param("page", "1"))
        .respond_with(html(LISTING_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .and(query_param("page", "2"))
        .respond_with(html(EMPTY_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .and(query_param("page", "3"))
        .respond_with(html(LISTING_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(
        test_client(),
        CardExtractor::new(server.uri()),
        Duration::from_secs(1),
    );
    let request = ScrapeRequest::new(&category_url(&server), 5).unwrap();

    let outcome = orchestrator
        .scrape(&request, &CancellationToken::new(), |_| {})
        .await;

    assert_eq!(outcome.stop_reason, StopReason::EmptyPage { page_index: 2 });
    assert_eq!(outcome.pages_fetched, 2);
    assert_eq!(outcome.listings.len(), 2);
    assert_eq!(outcome.cards_found, 4);
    assert_eq!(outcome.cards_skipped, 2);
    assert!(outcome
        .listings
        .iter()
        .all(|l| l.page_index == 1 && l.source_category == "vetements-homme"));
    assert_eq!(
        outcome.listings[0].listing_url.as_deref(),
        Some(format!("{}/annonce/vetements-homme/chemise-en-lin-4521", server.uri()).as_str())
    );

    // The "Prix sur demande" card is dropped; the 15 000 CFA shirt survives.
    let clean = normalize_listings(&outcome.listings);
    assert_eq!(clean.len(), 1);
    assert_eq!(clean[0].price_value, 15_000);
    assert_eq!(clean[0].city, "Dakar");
    assert_eq!(clean[0].sub_category, "Shirts");
}

#[tokio::test]
async fn scrape_stops_on_http_error_keeping_earlier_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .and(query_param("page", "1"))
        .respond_with(html(LISTING_PAGE))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/categorie/vetements-homme"))
        .and(query_param("page", "3"))
        .respond_with(html(LISTING_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let orchestrator = Orchestrator::new(
        test_client(),
        CardExtractor::new(server.uri()),
        Duration::from_secs(1),
    );
    let request = ScrapeRequest::new(&category_url(&server), 3).unwrap();

    let outcome = orchestrator
        .scrape(&request, &CancellationToken::new(), |_| {})
        .await;

    assert!(matches!(
        outcome.stop_reason,
        StopReason::FetchFailed { page_index: 2, .. }
    ));
    assert_eq!(outcome.listings.len(), 2);
}
