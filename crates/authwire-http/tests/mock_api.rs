//! Mock API tests for the reqwest transport.
//!
//! These tests use wiremock to simulate an API server with a refresh
//! endpoint and drive the full client pipeline over real HTTP.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use authwire_core::{
    BaseUrl, Client, ClientConfig, Error, MemoryCredentialStore, Navigator, RefreshError, Request,
    Slot, StatusCode, Transport, TransportError,
};
use authwire_http::ReqwestTransport;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a base URL from a mock server.
fn mock_base_url(server: &MockServer) -> BaseUrl {
    BaseUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

#[derive(Default)]
struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_string());
    }
}

fn client_for(
    server: &MockServer,
    store: Arc<MemoryCredentialStore>,
    navigator: Arc<RecordingNavigator>,
) -> Client {
    let transport = Arc::new(ReqwestTransport::new().unwrap());
    Client::builder(transport, store, navigator)
        .config(ClientConfig::new(mock_base_url(server)))
        .build()
        .unwrap()
}

// ============================================================================
// Authenticated Requests
// ============================================================================

#[tokio::test]
async fn test_request_carries_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "alice@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "r1"));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_for(&server, store, navigator);

    let response = client.execute(client.get("/api/me").unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["sub"], "alice@example.com");
}

#[tokio::test]
async fn test_post_body_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer a1"))
        .and(body_json(json!({"sku": "widget", "qty": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "r1"));
    let client = client_for(&server, store, Arc::default());

    let request = client
        .post("/orders")
        .unwrap()
        .json(&json!({"sku": "widget", "qty": 2}))
        .unwrap();
    let response = client.execute(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.json::<serde_json::Value>().unwrap()["id"], 7);
}

// ============================================================================
// Refresh Tests
// ============================================================================

#[tokio::test]
async fn test_expired_token_refreshes_and_replays() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Token expired"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1}, {"id": 2}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "r1"));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_for(&server, store.clone(), navigator.clone());

    let response = client.execute(client.get("/orders").unwrap()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>().unwrap(),
        json!([{"id": 1}, {"id": 2}])
    );
    assert_eq!(store.peek(Slot::Access).as_deref(), Some("a2"));
    assert!(navigator.visits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_request_is_not_decorated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "a2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(header("authorization", "Bearer a2"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "r1"));
    let client = client_for(&server, store, Arc::default());

    client.execute(client.get("/orders").unwrap()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let refresh = requests
        .iter()
        .find(|r| r.url.path() == "/api/refresh")
        .expect("refresh request sent");
    assert!(!refresh.headers.contains_key("authorization"));
    assert_eq!(
        refresh.headers.get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_refresh_server_error_logs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string("Internal Server Error")
                .insert_header("content-type", "text/plain"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "r1"));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_for(&server, store.clone(), navigator.clone());

    let result = client.execute(client.get("/orders").unwrap()).await;

    match result {
        Err(Error::Refresh(RefreshError::Rejected(err))) => {
            assert_eq!(err.status, 500);
            assert_eq!(err.message.as_deref(), Some("Internal Server Error"));
        }
        other => panic!("expected refresh rejection, got {:?}", other),
    }
    assert!(store.peek(Slot::Access).is_none());
    assert!(store.peek(Slot::Refresh).is_none());
    assert_eq!(*navigator.visits.lock().unwrap(), vec!["/login".to_string()]);
}

#[tokio::test]
async fn test_invalid_refresh_token_logs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid refresh token"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "expired-r1"));
    let navigator = Arc::new(RecordingNavigator::default());
    let client = client_for(&server, store.clone(), navigator.clone());

    let err = client
        .execute(client.get("/orders").unwrap())
        .await
        .unwrap_err();

    assert!(err.is_refresh_failure());
    assert!(err.to_string().contains("Invalid refresh token"));
    assert!(store.peek(Slot::Refresh).is_none());
    assert_eq!(navigator.visits.lock().unwrap().len(), 1);
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[tokio::test]
async fn test_server_errors_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_tokens("a1", "r1"));
    let client = client_for(&server, store.clone(), Arc::default());

    let response = client.execute(client.get("/orders").unwrap()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let err = response.error_for_status().unwrap_err();
    assert!(err.to_string().contains("503"));
    assert_eq!(store.peek(Slot::Access).as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_configured_timeout_reports_duration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let url = format!("{}/slow", server.uri()).parse().unwrap();

    let err = transport.send(Request::get(url)).await.unwrap_err();

    assert!(matches!(err, TransportError::Timeout { duration_ms: 100 }));
}

#[tokio::test]
async fn test_timeout_from_wrapped_client_has_no_duration() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let transport = ReqwestTransport::from_client(client);
    let url = format!("{}/slow", server.uri()).parse().unwrap();

    let err = transport.send(Request::get(url)).await.unwrap_err();

    match err {
        TransportError::Http { message } => assert!(message.contains("timed out")),
        other => panic!("expected untimed HTTP error, got {:?}", other),
    }
}
