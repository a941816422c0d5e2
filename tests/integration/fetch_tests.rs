//! Transport behavior of the bounded fetcher

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use trend_harvest::config::HttpConfig;
use trend_harvest::crawler::fetcher::EMPTY_SENTINEL;
use trend_harvest::crawler::{BoundedFetcher, RequestDescriptor};
use trend_harvest::{FailurePolicy, FetchOutcome, HarvestError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers with the sentinel on the first request and a real page afterwards
struct SentinelOnce {
    calls: AtomicUsize,
}

impl Respond for SentinelOnce {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            ResponseTemplate::new(200).set_body_bytes(EMPTY_SENTINEL.to_vec())
        } else {
            ResponseTemplate::new(200).set_body_string("<html>listing</html>")
        }
    }
}

fn fetcher() -> BoundedFetcher {
    let config = HttpConfig {
        timeout_secs: 5,
        ..HttpConfig::default()
    };
    BoundedFetcher::from_config(&config).unwrap()
}

fn descriptor(server: &MockServer, route: &str) -> RequestDescriptor {
    RequestDescriptor::new(url::Url::parse(&format!("{}{}", server.uri(), route)).unwrap())
}

#[tokio::test]
async fn test_primary_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&descriptor(&server, "/page"), FailurePolicy::Fatal)
        .await
        .unwrap();

    let resource = outcome.into_resource().expect("fetched");
    assert_eq!(resource.body, b"hello");
    assert_eq!(resource.url, format!("{}/page", server.uri()));
}

#[tokio::test]
async fn test_redirect_is_handled_by_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/final", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/final"))
        .respond_with(ResponseTemplate::new(200).set_body_string("final page"))
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&descriptor(&server, "/moved"), FailurePolicy::Fatal)
        .await
        .unwrap();

    // Shaped like a primary success, keyed by the requested URL
    let resource = outcome.into_resource().expect("fallback succeeded");
    assert_eq!(resource.body, b"final page");
    assert_eq!(resource.url, format!("{}/moved", server.uri()));
}

#[tokio::test]
async fn test_sentinel_triggers_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listing"))
        .respond_with(SentinelOnce {
            calls: AtomicUsize::new(0),
        })
        .expect(2)
        .mount(&server)
        .await;

    let resource = fetcher()
        .fetch_required(&descriptor(&server, "/listing"))
        .await
        .unwrap();
    assert_eq!(resource.text(), "<html>listing</html>");
}

#[tokio::test]
async fn test_fatal_policy_returns_original_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let result = fetcher()
        .fetch(&descriptor(&server, "/broken"), FailurePolicy::Fatal)
        .await;

    match result {
        Err(HarvestError::HttpStatus { status, url }) => {
            assert_eq!(status, 500);
            assert_eq!(url, format!("{}/broken", server.uri()));
        }
        other => panic!("expected HTTP status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_degrade_policy_returns_absence() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&descriptor(&server, "/missing"), FailurePolicy::Degrade)
        .await
        .unwrap();

    match outcome {
        FetchOutcome::Degraded { url, error } => {
            assert_eq!(url, format!("{}/missing", server.uri()));
            assert!(error.contains("404"));
        }
        FetchOutcome::Fetched(_) => panic!("a 404 must not be fetched"),
    }
}

#[tokio::test]
async fn test_any_2xx_is_a_primary_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = fetcher()
        .fetch(&descriptor(&server, "/empty"), FailurePolicy::Fatal)
        .await
        .unwrap();
    assert!(outcome.is_fetched());
}

#[tokio::test]
async fn test_concurrency_ceiling_bounds_in_flight_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(200)))
        .mount(&server)
        .await;

    let config = HttpConfig {
        concurrency: 2,
        timeout_secs: 5,
        ..HttpConfig::default()
    };
    let fetcher = BoundedFetcher::from_config(&config).unwrap();
    let descriptors: Vec<_> = (0..6)
        .map(|i| descriptor(&server, &format!("/slow/{}", i)))
        .collect();

    let start = Instant::now();
    let outcomes = futures::future::join_all(
        descriptors
            .iter()
            .map(|d| fetcher.fetch(d, FailurePolicy::Fatal)),
    )
    .await;

    assert!(outcomes.iter().all(|o| matches!(o, Ok(FetchOutcome::Fetched(_)))));
    // Six requests, two at a time, 200ms each
    assert!(start.elapsed() >= Duration::from_millis(600));
}
