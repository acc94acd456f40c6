//! Tests for pagination module

use super::*;
use crate::error::ErrorKind;
use crate::http::{HttpClient, HttpClientConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn records(start: usize, count: usize) -> serde_json::Value {
    json!((start..start + count)
        .map(|i| json!({"id": i.to_string(), "login": format!("user{i}")}))
        .collect::<Vec<_>>())
}

fn paginator_for(server: &MockServer) -> Paginator {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .api_key("test-key")
        .build();
    Paginator::new(HttpClient::with_config(config).unwrap())
}

async fn mount_page(
    server: &MockServer,
    endpoint: &str,
    page_size: u32,
    page: u32,
    response: ResponseTemplate,
) {
    Mock::given(method("POST"))
        .and(path(format!(
            "/{endpoint}/page_size:{page_size},page_number:{page}"
        )))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Type Tests
// ============================================================================

#[test]
fn test_endpoint_page_path() {
    let endpoint = EndpointSpec::list("USERS", "users/");
    assert_eq!(
        endpoint.page_path(250, 3),
        "users/page_size:250,page_number:3"
    );
}

#[test]
fn test_endpoint_effective_page_size() {
    let endpoint = EndpointSpec::list("USERS", "users");
    assert_eq!(endpoint.effective_page_size(250), 250);

    let endpoint = endpoint.with_page_size(50);
    assert_eq!(endpoint.effective_page_size(250), 50);

    let endpoint = EndpointSpec::list("USERS", "users").with_page_size(0);
    assert_eq!(endpoint.effective_page_size(250), 250);
}

#[test]
fn test_page_body_from_json() {
    let body = PageBody::from(json!([{"id": 1}, {"id": 2}]));
    assert_eq!(body.len(), 2);
    assert!(matches!(body, PageBody::List(_)));

    let body = PageBody::from(json!({"remaining": 10}));
    assert_eq!(body.len(), 1);
    assert!(matches!(body, PageBody::Object(_)));

    assert!(PageBody::from(json!([])).is_empty());
}

#[test]
fn test_record_set_preserves_order() {
    let mut set = RecordSet::new();
    set.push(json!({"id": 1}));
    set.extend(vec![json!({"id": 2}), json!({"id": 3})]);

    let ids: Vec<i64> = set.iter().map(|r| r["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(set.len(), 3);
}

#[test]
fn test_fetch_outcome_completeness() {
    let mut outcome = FetchOutcome::new(250);
    assert!(!outcome.is_complete());

    outcome.record_page(200);
    assert!(outcome.is_complete());

    outcome.fail(FetchFailure::status(2, 500, "boom"));
    assert!(!outcome.is_complete());
    assert_eq!(outcome.last_status, Some(500));

    let err = outcome.into_records("USERS").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.to_string().contains("HTTP 500: boom"));
}

#[test]
fn test_fetch_outcome_decode_failure_kind() {
    let mut outcome = FetchOutcome::new(250);
    outcome.fail(FetchFailure::decode(1, 200, "invalid JSON"));
    let err = outcome.into_records("USERS").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

// ============================================================================
// List Mode Tests
// ============================================================================

#[tokio::test]
async fn test_list_mode_stops_on_short_page() {
    let server = MockServer::start().await;
    mount_page(&server, "users", 250, 1, ResponseTemplate::new(200).set_body_json(records(0, 250))).await;
    mount_page(&server, "users", 250, 2, ResponseTemplate::new(200).set_body_json(records(250, 250))).await;
    mount_page(&server, "users", 250, 3, ResponseTemplate::new(200).set_body_json(records(500, 100))).await;

    let paginator = paginator_for(&server);
    let outcome = paginator
        .fetch_all(&EndpointSpec::list("USERS", "users"))
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.page_count, 3);
    assert_eq!(outcome.page_size, 250);
    assert_eq!(outcome.last_status, Some(200));
    assert_eq!(outcome.records.len(), 600);

    // Page order, then in-page order
    assert_eq!(outcome.records.as_slice()[0]["id"], "0");
    assert_eq!(outcome.records.as_slice()[250]["id"], "250");
    assert_eq!(outcome.records.as_slice()[599]["id"], "599");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_list_mode_single_short_page() {
    let server = MockServer::start().await;
    mount_page(&server, "courses", 250, 1, ResponseTemplate::new(200).set_body_json(records(0, 10))).await;

    let paginator = paginator_for(&server);
    let outcome = paginator
        .fetch_all(&EndpointSpec::list("COURSES", "courses"))
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.page_count, 1);
    assert_eq!(outcome.records.len(), 10);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_mode_empty_final_page() {
    let server = MockServer::start().await;
    mount_page(&server, "groups", 2, 1, ResponseTemplate::new(200).set_body_json(records(0, 2))).await;
    mount_page(&server, "groups", 2, 2, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let paginator = paginator_for(&server).with_default_page_size(2);
    let outcome = paginator
        .fetch_all(&EndpointSpec::list("GROUPS", "groups"))
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.page_count, 2);
    assert_eq!(outcome.records.len(), 2);
}

#[tokio::test]
async fn test_list_mode_endpoint_page_size_override() {
    let server = MockServer::start().await;
    mount_page(&server, "branches", 5, 1, ResponseTemplate::new(200).set_body_json(records(0, 5))).await;
    mount_page(&server, "branches", 5, 2, ResponseTemplate::new(200).set_body_json(records(5, 1))).await;

    let paginator = paginator_for(&server);
    let endpoint = EndpointSpec::list("BRANCHES", "branches").with_page_size(5);
    let outcome = paginator.fetch_all(&endpoint).await;

    assert_eq!(outcome.page_size, 5);
    assert_eq!(outcome.page_count, 2);
    assert_eq!(outcome.records.len(), 6);
}

#[tokio::test]
async fn test_list_mode_failure_keeps_earlier_pages() {
    let server = MockServer::start().await;
    mount_page(&server, "users", 3, 1, ResponseTemplate::new(200).set_body_json(records(0, 3))).await;
    mount_page(&server, "users", 3, 2, ResponseTemplate::new(500).set_body_string("oops")).await;

    let paginator = paginator_for(&server).with_default_page_size(3);
    let outcome = paginator
        .fetch_all(&EndpointSpec::list("USERS", "users"))
        .await;

    assert!(!outcome.is_complete());
    assert_eq!(outcome.last_status, Some(500));
    assert_eq!(outcome.page_count, 1);
    assert_eq!(outcome.records.len(), 3);

    let failure = outcome.failure.unwrap();
    assert_eq!(failure.page, 2);
    assert_eq!(failure.kind, ErrorKind::Transport);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_mode_invalid_json_is_decode_failure() {
    let server = MockServer::start().await;
    mount_page(&server, "users", 250, 1, ResponseTemplate::new(200).set_body_string("<html>maintenance</html>")).await;

    let paginator = paginator_for(&server);
    let outcome = paginator
        .fetch_all(&EndpointSpec::list("USERS", "users"))
        .await;

    assert!(!outcome.is_complete());
    assert_eq!(outcome.page_count, 0);
    assert_eq!(outcome.last_status, Some(200));
    assert_eq!(outcome.failure.unwrap().kind, ErrorKind::Decode);
}

#[tokio::test]
async fn test_list_mode_object_body_is_decode_failure() {
    let server = MockServer::start().await;
    mount_page(&server, "users", 250, 1, ResponseTemplate::new(200).set_body_json(json!({"error": {"message": "bad"}}))).await;

    let paginator = paginator_for(&server);
    let outcome = paginator
        .fetch_all(&EndpointSpec::list("USERS", "users"))
        .await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.failure.unwrap().kind, ErrorKind::Decode);
}

#[tokio::test]
async fn test_connection_failure_has_no_status() {
    let config = HttpClientConfig::builder()
        .base_url("http://127.0.0.1:1")
        .build();
    let paginator = Paginator::new(HttpClient::with_config(config).unwrap());
    let outcome = paginator
        .fetch_all(&EndpointSpec::list("USERS", "users"))
        .await;

    assert!(!outcome.is_complete());
    assert_eq!(outcome.last_status, None);
    assert_eq!(outcome.page_count, 0);
    assert_eq!(outcome.failure.unwrap().kind, ErrorKind::Transport);
}

// ============================================================================
// Singleton Mode Tests
// ============================================================================

#[tokio::test]
async fn test_singleton_mode_single_object() {
    let server = MockServer::start().await;
    let body = json!({"remaining": "1999", "limit": "2000", "reset": "1700000000"});
    mount_page(&server, "ratelimit", 250, 1, ResponseTemplate::new(200).set_body_json(body.clone())).await;

    let paginator = paginator_for(&server);
    let outcome = paginator
        .fetch_all(&EndpointSpec::singleton("RATELIMIT", "ratelimit"))
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.page_count, 1);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records.as_slice()[0], body);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_singleton_mode_list_body_stops_after_one_fetch() {
    let server = MockServer::start().await;
    mount_page(&server, "ratelimit", 2, 1, ResponseTemplate::new(200).set_body_json(records(0, 2))).await;

    let paginator = paginator_for(&server).with_default_page_size(2);
    let outcome = paginator
        .fetch_all(&EndpointSpec::singleton("RATELIMIT", "ratelimit"))
        .await;

    assert!(outcome.is_complete());
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

// ============================================================================
// Single Item Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_item_drops_list_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/id:173"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "173",
            "login": "jdoe",
            "courses": [{"id": "1"}],
            "branches": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let paginator = paginator_for(&server);
    let item = paginator
        .fetch_item("users/id:{userId}", "{userId}", "173")
        .await
        .unwrap();

    assert_eq!(item.len(), 2);
    assert_eq!(item["login"], "jdoe");
    assert!(!item.contains_key("courses"));
}

#[tokio::test]
async fn test_fetch_item_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/courses/id:9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let paginator = paginator_for(&server);
    let err = paginator
        .fetch_item("courses/id:{courseId}", "{courseId}", "9")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
}
