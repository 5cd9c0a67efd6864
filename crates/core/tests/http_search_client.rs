use std::time::Duration;

use hrbot_core::{
    probe_reachability, AppConfig, CandidateSearch, HttpCandidateSearch, SearchError, SearchQuery,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, timeout: Duration) -> HttpCandidateSearch {
    HttpCandidateSearch::new(format!("{}/search_candidates", server.uri()), timeout)
        .expect("client should build")
}

#[tokio::test]
async fn posts_query_as_json_and_decodes_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search_candidates"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "query": "rust engineer" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "filename": "E1.txt", "text": "{name=Ana}", "hybridScore": 0.9 },
                { "filename": "E2.txt", "text": "{name=Bo}", "score": 0.4 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let query = SearchQuery::parse("  rust engineer ").expect("query");
    let response = client.search(&query).await.expect("search should succeed");

    let results = response.results.expect("results");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].filename, "E1.txt");
    assert_eq!(results[0].hybrid_score, Some(0.9));
    assert_eq!(results[1].score, Some(0.4));
}

#[tokio::test]
async fn non_success_status_carries_upstream_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search_candidates"))
        .respond_with(ResponseTemplate::new(503).set_body_string("index is rebuilding"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let query = SearchQuery::parse("designer").expect("query");
    let error = client.search(&query).await.expect_err("503 must fail");

    assert_eq!(
        error,
        SearchError::Upstream { status: 503, body: "index is rebuilding".to_owned() }
    );
    assert_eq!(error.detail(), "index is rebuilding");
}

#[tokio::test]
async fn slow_service_times_out_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search_candidates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "results": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_millis(200));
    let query = SearchQuery::parse("analyst").expect("query");
    let error = client.search(&query).await.expect_err("request must time out");

    assert!(matches!(error, SearchError::Timeout(_)), "unexpected error: {error:?}");
}

#[tokio::test]
async fn null_body_is_treated_as_no_results() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search_candidates"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let query = SearchQuery::parse("nurse").expect("query");
    let response = client.search(&query).await.expect("null body is not an error");

    assert!(response.is_empty());
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search_candidates"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Duration::from_secs(5));
    let query = SearchQuery::parse("chef").expect("query");
    let error = client.search(&query).await.expect_err("html is not json");

    assert!(matches!(error, SearchError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let client = HttpCandidateSearch::new(
        "http://127.0.0.1:9/search_candidates",
        Duration::from_secs(2),
    )
    .expect("client should build");
    let query = SearchQuery::parse("pilot").expect("query");

    let error = client.search(&query).await.expect_err("nothing listens on port 9");
    assert!(
        matches!(error, SearchError::Transport(_) | SearchError::Timeout(_)),
        "unexpected error: {error:?}"
    );
    assert!(!error.detail().is_empty());
}

#[tokio::test]
async fn probe_reports_reachable_and_unreachable_hosts() {
    let server = MockServer::start().await;
    let mut config = AppConfig::default().search;
    config.host = server.address().ip().to_string();
    config.port = server.address().port();

    assert!(probe_reachability(&config).await.is_ok());

    config.host = "127.0.0.1".to_owned();
    config.port = 9;
    config.timeout_secs = 2;
    let error = probe_reachability(&config).await.expect_err("nothing listens on port 9");
    assert!(error.detail().contains("127.0.0.1:9"), "unexpected detail: {}", error.detail());
}
