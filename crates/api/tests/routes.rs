use account_api::{build_app, AppState};
use account_metrics::MetricsService;
use account_models::{Account, AccountError, AccountRequest, NewAccount};
use account_store::{AccountRegistry, AccountStore};
use account_testsupport::{test_config, test_state, AccountFactory};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

const BASE_URL: &str = "/accounts";

fn app() -> Router {
    build_app(test_state(test_config()).unwrap()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json_request(method: &str, uri: &str, body: &impl serde::Serialize) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

async fn create_accounts(app: &Router, count: usize) -> Vec<Account> {
    let mut accounts = Vec::with_capacity(count);
    for request in AccountFactory::build_many(count) {
        let (status, _, body) = send(app, json_request("POST", BASE_URL, &request)).await;
        assert_eq!(status, StatusCode::CREATED, "Could not create test Account");
        accounts.push(serde_json::from_slice(&body).unwrap());
    }
    accounts
}

#[tokio::test]
async fn index_returns_service_info() {
    let (status, _, body) = send(&app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);

    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["name"], "Account REST API Service");
    assert_eq!(data["version"], "1.0");
}

#[tokio::test]
async fn health_is_ok() {
    let (status, _, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], "OK");
}

#[tokio::test]
async fn create_account() {
    let app = app();
    let account = AccountFactory::build();

    let (status, headers, body) = send(&app, json_request("POST", BASE_URL, &account)).await;
    assert_eq!(status, StatusCode::CREATED);

    let new_account: Account = serde_json::from_slice(&body).unwrap();
    assert_eq!(
        headers.get(header::LOCATION).unwrap(),
        &format!("/accounts/{}", new_account.id)
    );
    assert_eq!(Some(new_account.name), account.name);
    assert_eq!(Some(new_account.email), account.email);
    assert_eq!(Some(new_account.address), account.address);
    assert_eq!(new_account.phone_number, account.phone_number);
    assert_eq!(Some(new_account.date_joined.to_string()), account.date_joined);
}

#[tokio::test]
async fn create_with_missing_data_is_bad_request() {
    let body = serde_json::json!({ "name": "not enough data" });
    let (status, _, body) = send(&app(), json_request("POST", BASE_URL, &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 400);
    assert_eq!(data["error"], "Bad Request");
    assert_eq!(data["message"], "Invalid Account: missing email");
}

#[tokio::test]
async fn create_with_malformed_json_is_bad_request() {
    let request = Request::post(BASE_URL)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, _, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_with_wrong_media_type_is_unsupported() {
    let account = AccountFactory::build();
    let request = Request::post(BASE_URL)
        .header(header::CONTENT_TYPE, "test/html")
        .body(Body::from(serde_json::to_vec(&account).unwrap()))
        .unwrap();

    let (status, _, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 415);
}

#[tokio::test]
async fn read_an_account() {
    let app = app();
    let created = create_accounts(&app, 1).await.remove(0);

    let (status, _, body) = send(&app, get(&format!("{BASE_URL}/{}", created.id))).await;
    assert_eq!(status, StatusCode::OK);
    let read: Account = serde_json::from_slice(&body).unwrap();
    assert_eq!(read, created);
}

#[tokio::test]
async fn account_not_found() {
    let (status, _, body) = send(&app(), get(&format!("{BASE_URL}/0"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["error"], "Not Found");
    assert_eq!(data["message"], "Account with id [0] could not be found.");
}

#[tokio::test]
async fn non_numeric_id_is_not_found() {
    let (status, _, _) = send(&app(), get(&format!("{BASE_URL}/abc"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_an_account() {
    let app = app();
    let created = create_accounts(&app, 1).await.remove(0);

    let mut change = AccountRequest::from(&created);
    let old_name = created.name.clone();
    change.name = Some("John 117".to_string());

    let (status, _, body) = send(
        &app,
        json_request("PUT", &format!("{BASE_URL}/{}", created.id), &change),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let updated: Account = serde_json::from_slice(&body).unwrap();
    assert_eq!(updated.name, "John 117");
    assert_ne!(updated.name, old_name);
    assert_eq!(updated.id, created.id);
}

#[tokio::test]
async fn update_a_non_existing_account() {
    let account = AccountFactory::build();
    let (status, _, _) = send(
        &app(),
        json_request("PUT", &format!("{BASE_URL}/0"), &account),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_an_account() {
    let app = app();
    let created = create_accounts(&app, 1).await.remove(0);

    let request = Request::delete(format!("{BASE_URL}/{}", created.id))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _, _) = send(&app, get(&format!("{BASE_URL}/{}", created.id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_non_existing_account_is_no_content() {
    let request = Request::delete(format!("{BASE_URL}/0"))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn list_accounts_in_creation_order() {
    let app = app();
    let created = create_accounts(&app, 10).await;

    let (status, _, body) = send(&app, get(BASE_URL)).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<Account> = serde_json::from_slice(&body).unwrap();
    assert_eq!(listed, created);
}

#[tokio::test]
async fn list_accounts_never_returns_404() {
    let (status, _, body) = send(&app(), get(BASE_URL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"[]");
}

#[tokio::test]
async fn list_accounts_by_name() {
    let app = app();
    let created = create_accounts(&app, 3).await;
    let wanted = &created[1];

    let uri = format!("{BASE_URL}?name={}", wanted.name.replace(' ', "%20"));
    let (status, _, body) = send(&app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<Account> = serde_json::from_slice(&body).unwrap();
    assert!(listed.contains(wanted));
    assert!(listed.iter().all(|a| a.name == wanted.name));
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (status, headers, body) = send(&app(), get("/nowhere")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 404);
}

#[tokio::test]
async fn wrong_method_is_json_405() {
    let request = Request::delete(BASE_URL).body(Body::empty()).unwrap();
    let (status, headers, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(headers.contains_key(header::ALLOW));
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["error"], "Method not Allowed");
}

#[tokio::test]
async fn duplicate_query_parameter_is_json_400() {
    let (status, headers, body) = send(&app(), get(&format!("{BASE_URL}?name=a&name=b"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 400);
    assert_eq!(data["error"], "Bad Request");
}

#[tokio::test]
async fn undecodable_id_is_json_404() {
    let (status, headers, body) = send(&app(), get(&format!("{BASE_URL}/%FF"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers[header::CONTENT_TYPE], "application/json");
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 404);

    let request = Request::delete(format!("{BASE_URL}/%FF"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let mut config = test_config();
    config.server.max_request_body_size_kb = 1;
    let app = build_app(test_state(config).unwrap()).unwrap();

    let request = Request::post(BASE_URL)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(vec![b' '; 4096]))
        .unwrap();
    let (status, _, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 413);
}

#[tokio::test]
async fn metrics_count_created_accounts() {
    let app = app();
    create_accounts(&app, 2).await;

    let (status, _, body) = send(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("accounts_created_total 2"));
}

// Security

#[tokio::test]
async fn security_headers() {
    let (status, headers, _) = send(&app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);

    let expected = [
        ("X-Frame-Options", "SAMEORIGIN"),
        ("X-XSS-Protection", "1; mode=block"),
        ("X-Content-Type-Options", "nosniff"),
        (
            "Content-Security-Policy",
            "default-src 'self'; object-src 'none'",
        ),
        ("Referrer-Policy", "strict-origin-when-cross-origin"),
    ];
    for (name, value) in expected {
        assert_eq!(headers.get(name).unwrap(), value, "header {name}");
    }
}

#[tokio::test]
async fn security_headers_on_errors_too() {
    let (status, headers, _) = send(&app(), get(&format!("{BASE_URL}/0"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "SAMEORIGIN");
}

#[tokio::test]
async fn cors_policies_headers() {
    let request = Request::get("/")
        .header(header::ORIGIN, "https://client.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
}

#[tokio::test]
async fn cors_headers_on_rewritten_errors() {
    let request = Request::delete(BASE_URL)
        .header(header::ORIGIN, "https://client.example.com")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 405);

    let mut config = test_config();
    config.server.max_request_body_size_kb = 1;
    let app = build_app(test_state(config).unwrap()).unwrap();
    let request = Request::post(BASE_URL)
        .header(header::ORIGIN, "https://client.example.com")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(vec![b' '; 4096]))
        .unwrap();
    let (status, headers, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
}

#[tokio::test]
async fn force_https_redirects() {
    let mut config = test_config();
    config.security.force_https = true;
    let app = build_app(test_state(config).unwrap()).unwrap();

    let request = Request::get("/accounts")
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "https://localhost:8080/accounts");
}

// Store outages

struct UnreachableStore;

fn store_down() -> AccountError {
    AccountError::StoreUnavailable {
        reason: "connection refused".to_string(),
    }
}

#[async_trait]
impl AccountStore for UnreachableStore {
    async fn create(&self, _account: NewAccount) -> Result<Account, AccountError> {
        Err(store_down())
    }

    async fn all(&self) -> Result<Vec<Account>, AccountError> {
        Err(store_down())
    }

    async fn find(&self, _id: i64) -> Result<Option<Account>, AccountError> {
        Err(store_down())
    }

    async fn find_by_name(&self, _name: &str) -> Result<Vec<Account>, AccountError> {
        Err(store_down())
    }

    async fn update(&self, _id: i64, _account: NewAccount) -> Result<Option<Account>, AccountError> {
        Err(store_down())
    }

    async fn delete(&self, _id: i64) -> Result<bool, AccountError> {
        Err(store_down())
    }

    async fn recreate(&self) -> Result<(), AccountError> {
        Err(store_down())
    }

    async fn ping(&self) -> Result<(), AccountError> {
        Err(store_down())
    }
}

fn unreachable_app() -> Router {
    let registry = AccountRegistry::new(Arc::new(UnreachableStore));
    let metrics = Arc::new(MetricsService::new().unwrap());
    build_app(AppState::new(test_config(), registry, metrics)).unwrap()
}

#[tokio::test]
async fn health_reports_unavailable_store() {
    let (status, _, body) = send(&unreachable_app(), get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], "UNAVAILABLE");
}

#[tokio::test]
async fn store_outage_is_sanitised_503() {
    let (status, _, body) = send(&unreachable_app(), get(BASE_URL)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let data: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(data["status"], 503);
    assert_eq!(data["message"], "Service Unavailable");
}
