//! End-to-end discovery against a mock listings site.
//!
//! Covers the three top-level paths: a probe hit, a search fallback, and a
//! total miss. The site is a `wiremock::MockServer`; the search collaborator
//! is a stub unless the test is about the DuckDuckGo client itself.

mod common;

use std::sync::Arc;

use common::*;
use rentscout::{
    DiscoveryError, DiscoveryOrigin, Discoverer, DuckDuckGoSearch, HttpClient, MiningResult,
    SkipReason,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn discoverer(server: &MockServer, search: Arc<StubSearch>) -> Discoverer {
    let config = fast_config(&server.uri());
    let transport = Arc::new(HttpClient::new(&config).unwrap());
    Discoverer::with_collaborators(config, transport, search).unwrap()
}

#[tokio::test]
async fn test_third_probe_wins_and_mismatch_is_dropped() {
    let server = MockServer::start().await;
    let empty = links_page(&[]);

    mount_page(&server, "/rent/society/pune-green-acres", &empty, 1).await;
    mount_page(&server, "/rent/society/pune_green-acres", &empty, 1).await;
    mount_page(
        &server,
        "/rent/society/green-acres_pune",
        &links_page(&[
            "/property/2-bhk-green-acres-for-rs-25,000",
            "/property/2-bhk-blue-ridge-for-rs-30,000",
        ]),
        1,
    )
    .await;
    // Probing short-circuits on the first hit.
    forbid_path(&server, "/rent/society/green-acres-pune").await;
    forbid_path(&server, "/rent/society/green-acres").await;

    mount_page(
        &server,
        "/property/2-bhk-green-acres-for-rs-25,000",
        &html_page("2 BHK Flat for Rent in Green Acres, Pune", "<p>Semi furnished</p>"),
        1,
    )
    .await;
    mount_page(
        &server,
        "/property/2-bhk-blue-ridge-for-rs-30,000",
        &html_page("2 BHK Flat for Rent in Blue Ridge", "<p>Hinjewadi</p>"),
        1,
    )
    .await;

    let search = Arc::new(StubSearch::new(vec![]));
    let d = discoverer(&server, search.clone());
    let report = d.discover_report("Green Acres", "Pune").await.unwrap();

    assert_eq!(
        report.origin,
        DiscoveryOrigin::DirectProbe {
            probe_url: format!("{}/rent/society/green-acres_pune", server.uri())
        }
    );
    assert_eq!(report.rents().len(), 1);
    assert_eq!(report.rents()["2 BHK"], 25000);
    assert_eq!(search.calls(), 0);

    let skipped: Vec<_> = report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].0.ends_with("/property/2-bhk-blue-ridge-for-rs-30,000"));
    assert_eq!(skipped[0].1, &SkipReason::SocietyMismatch);
}

#[tokio::test]
async fn test_search_fallback_filters_bad_listing_and_keeps_max() {
    let server = MockServer::start().await;
    let uri = server.uri();

    // No probe mocks: every probe URL 404s.
    let cheap = format!("{uri}/property/1-bhk-green-acres-for-rs-8,000");
    let dear = format!("{uri}/property/1-bhk-green-acres-for-rs-12,000");
    let shared = format!("{uri}/property/1-bhk-green-acres-for-rs-6,000-pune");

    let shared_href = ddg_wrap(&shared);
    let dear_href = ddg_wrap(&dear);
    let search = Arc::new(StubSearch::new(vec![
        (cheap.as_str(), "1 BHK Flat in Green Acres"),
        (shared_href.as_str(), "Shared room in Green Acres"),
        (dear_href.as_str(), "1 BHK Apartment in Green Acres"),
    ]));

    mount_page(
        &server,
        "/property/1-bhk-green-acres-for-rs-8,000",
        &html_page("1 BHK Flat in Green Acres", ""),
        1,
    )
    .await;
    mount_page(
        &server,
        "/property/1-bhk-green-acres-for-rs-12,000",
        &html_page("1 BHK Apartment in Green Acres", ""),
        1,
    )
    .await;
    forbid_path(&server, "/property/1-bhk-green-acres-for-rs-6,000-pune").await;

    let d = discoverer(&server, search.clone());
    let report = d.discover_report("Green Acres", "Pune").await.unwrap();

    assert_eq!(report.origin, DiscoveryOrigin::SearchFallback);
    assert_eq!(report.candidates.len(), 2);
    assert_eq!(report.rents().len(), 1);
    assert_eq!(report.rents()["1 BHK"], 12000);
    assert_eq!(report.best["1 BHK"].source_url, dear);

    let queries = search.queries.lock().unwrap().clone();
    assert_eq!(
        queries,
        vec![("Green Acres Pune for rent site:127.0.0.1".to_string(), 30)]
    );
}

#[tokio::test]
async fn test_total_miss_is_an_empty_success() {
    let server = MockServer::start().await;
    let search = Arc::new(StubSearch::new(vec![
        ("https://elsewhere.example/property/1-bhk-for-rs-9,000", "1 BHK Green Acres"),
        ("https://www.youtube.com/watch?v=abc", "Green Acres tour"),
    ]));

    let d = discoverer(&server, search.clone());
    let report = d.discover_report("Green Acres", "Pune").await.unwrap();

    assert_eq!(report.origin, DiscoveryOrigin::NotFound);
    assert!(report.candidates.is_empty());
    assert!(report.rents().is_empty());
    assert_eq!(search.calls(), 1);

    let rents = d.discover("Green Acres", "Pune").await.unwrap();
    assert!(rents.is_empty());
}

#[tokio::test]
async fn test_probe_hit_with_no_qualifying_listings_does_not_search() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/rent/society/pune-green-acres",
        &links_page(&["/property/2-bhk-green-acres-for-rs-9,000"]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/property/2-bhk-green-acres-for-rs-9,000",
        &html_page("2 BHK in Green Acres", ""),
        1,
    )
    .await;

    let search = Arc::new(StubSearch::new(vec![]));
    let d = discoverer(&server, search.clone());
    let report = d.discover_report("Green Acres", "Pune").await.unwrap();

    assert!(report.rents().is_empty());
    assert_eq!(search.calls(), 0);
    assert_eq!(
        report.outcomes[0].result,
        MiningResult::Skip(SkipReason::Implausible {
            bhk: "2 BHK".into(),
            rent: 9000
        })
    );
}

#[tokio::test]
async fn test_listing_fetch_retries_then_succeeds() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/rent/society/pune-green-acres",
        &links_page(&["/property/3-bhk-green-acres-for-rs-52,000"]),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/property/3-bhk-green-acres-for-rs-52,000"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/property/3-bhk-green-acres-for-rs-52,000",
        &html_page("3 BHK Green Acres", ""),
        1,
    )
    .await;

    let d = discoverer(&server, Arc::new(StubSearch::new(vec![])));
    let rents = d.discover("Green Acres", "Pune").await.unwrap();
    assert_eq!(rents["3 BHK"], 52000);
}

#[tokio::test]
async fn test_listing_fetch_failure_is_skipped_not_fatal() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/rent/society/pune-green-acres",
        &links_page(&[
            "/property/2-bhk-green-acres-for-rs-30,000",
            "/property/2-bhk-green-acres-for-rs-41,000",
        ]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/property/2-bhk-green-acres-for-rs-30,000",
        &html_page("2 BHK Green Acres", ""),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/property/2-bhk-green-acres-for-rs-41,000"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let d = discoverer(&server, Arc::new(StubSearch::new(vec![])));
    let report = d.discover_report("Green Acres", "Pune").await.unwrap();

    assert_eq!(report.rents()["2 BHK"], 30000);
    let failed = report
        .skipped()
        .find(|(url, _)| url.ends_with("41,000"))
        .map(|(_, reason)| reason.clone());
    assert_eq!(
        failed,
        Some(SkipReason::FetchFailed {
            reason: "unexpected status 500".into()
        })
    );
}

#[tokio::test]
async fn test_empty_input_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let d = discoverer(&server, Arc::new(StubSearch::new(vec![])));
    assert!(matches!(
        d.discover("", "Pune").await,
        Err(DiscoveryError::InvalidInput { field: "society", .. })
    ));
    assert!(matches!(
        d.discover("Green Acres", "   ").await,
        Err(DiscoveryError::InvalidInput { field: "city", .. })
    ));
}

#[tokio::test]
async fn test_duckduckgo_client_feeds_fallback() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let listing = format!("{uri}/property/2-bhk-green-acres-for-rs-33,000");

    let results_html = format!(
        r#"<html><body>
        <div class="result"><a class="result__a" href="{}">2 BHK Flat for Rent in Green Acres</a></div>
        <div class="result"><a class="result__a" href="{uri}/green-acres/reviews">Green Acres Reviews</a></div>
        </body></html>"#,
        ddg_wrap(&listing)
    );
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "Green Acres Pune for rent site:127.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_html))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/property/2-bhk-green-acres-for-rs-33,000",
        &html_page("2 BHK Flat for Rent in Green Acres", ""),
        1,
    )
    .await;

    let config = fast_config(&uri);
    let transport = Arc::new(HttpClient::new(&config).unwrap());
    let search = Arc::new(DuckDuckGoSearch::with_endpoint(&config, &format!("{uri}/html/")).unwrap());
    let d = Discoverer::with_collaborators(config, transport, search).unwrap();

    let rents = d.discover("Green Acres", "Pune").await.unwrap();
    assert_eq!(rents.len(), 1);
    assert_eq!(rents["2 BHK"], 33000);
}
