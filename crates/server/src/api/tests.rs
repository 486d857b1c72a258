use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use userlake_bigquery::{BigQueryConfig, WarehouseClient, WarehouseError};
use userlake_core::config::ServerConfig;
use userlake_core::{Config, WarehouseRow, WarehouseValue};

use crate::router::build_router;
use crate::state::AppState;

// ── Fake warehouse ───────────────────────────────────────────────

enum Behavior {
    Rows(Vec<WarehouseRow>),
    Fail,
    Hang,
}

struct FakeWarehouse {
    behavior: Behavior,
    queries: Mutex<Vec<String>>,
    tokens: Mutex<Vec<CancellationToken>>,
}

impl FakeWarehouse {
    fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            queries: Mutex::new(Vec::new()),
            tokens: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    /// Tokens handed to the warehouse, in call order.
    fn tokens(&self) -> Vec<CancellationToken> {
        self.tokens.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarehouseClient for FakeWarehouse {
    async fn execute_query(
        &self,
        sql: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<WarehouseRow>, WarehouseError> {
        self.queries.lock().unwrap().push(sql.to_string());
        self.tokens.lock().unwrap().push(cancel.clone());
        match &self.behavior {
            Behavior::Rows(rows) => Ok(rows.clone()),
            Behavior::Fail => Err(WarehouseError::QueryFailed(
                "Not found: Table secret-project:crm.users".into(),
            )),
            Behavior::Hang => {
                cancel.cancelled().await;
                Err(WarehouseError::Cancelled)
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn server_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        allowed_origins: Vec::new(),
        query_timeout: Some(Duration::from_secs(60)),
    }
}

fn app_with(
    fake: Arc<FakeWarehouse>,
    server: ServerConfig,
    bigquery: BigQueryConfig,
) -> Router {
    build_router(Arc::new(AppState {
        config: Config {
            profile: String::new(),
            server,
        },
        bigquery,
        warehouse: fake,
    }))
}

fn app(fake: Arc<FakeWarehouse>) -> Router {
    app_with(fake, server_config(), BigQueryConfig::default())
}

async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let resp = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = resp.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, headers, body)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn user_row(id: &str, created_at: &str) -> WarehouseRow {
    WarehouseRow::new()
        .with("user_id", WarehouseValue::Text(id.into()))
        .with("email", WarehouseValue::Text(format!("{id}@example.com")))
        .with("phone_number", WarehouseValue::Null)
        .with("full_name", WarehouseValue::Text(format!("User {id}")))
        .with("role", WarehouseValue::Integer64(2))
        .with("created_at", WarehouseValue::Text(created_at.into()))
        .with("updated_at", WarehouseValue::Null)
}

// ── Health ───────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, _, body) = get(app(fake.clone()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
    assert!(fake.queries().is_empty());
}

// ── Validation ───────────────────────────────────────────────────

#[tokio::test]
async fn limit_out_of_range_is_400() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, body) = get_json(app(fake.clone()), "/users?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Value '0' must be between 1 and 1000.");
    assert!(fake.queries().is_empty());
}

#[tokio::test]
async fn non_numeric_limit_is_400() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, body) = get_json(app(fake), "/users?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid integer value: 'abc'.");
}

#[tokio::test]
async fn offset_above_maximum_is_400() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, body) = get_json(app(fake), "/users?offset=100001").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Value '100001' must be between 0 and 100000.");
}

#[tokio::test]
async fn duplicate_param_is_json_400() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, headers, body) = get(app(fake.clone()), "/users?limit=1&limit=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("limit"));
    assert!(fake.queries().is_empty());
}

#[tokio::test]
async fn validation_runs_before_identifier_check() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let bigquery = BigQueryConfig {
        dataset: "crm; DROP".into(),
        ..BigQueryConfig::default()
    };
    let (status, _) = get_json(
        app_with(fake, server_config(), bigquery),
        "/users?limit=-5",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Listing ──────────────────────────────────────────────────────

#[tokio::test]
async fn lists_users_in_warehouse_order() {
    let fake = FakeWarehouse::new(Behavior::Rows(vec![
        user_row("c", "2024-03-01 00:00:00 UTC"),
        user_row("b", "2024-02-01T00:00:00Z"),
        user_row("a", "2024-01-01 12:30:00.5 UTC"),
    ]));
    let (status, body) = get_json(app(fake.clone()), "/users").await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u["user_id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["c", "b", "a"]);

    let first = &users[0];
    assert_eq!(first["email"], "c@example.com");
    assert_eq!(first["phone_number"], Value::Null);
    assert_eq!(first["full_name"], "User c");
    assert_eq!(first["role"], 2);
    assert_eq!(first["created_at"], "2024-03-01T00:00:00.0000000Z");
    assert_eq!(first["updated_at"], Value::Null);
    assert_eq!(users[2]["created_at"], "2024-01-01T12:30:00.5000000Z");

    let queries = fake.queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].contains("FROM `soil-report-486813.crm.users`"));
    assert!(queries[0].contains("ORDER BY created_at DESC NULLS LAST"));
    assert!(queries[0].ends_with("LIMIT 200 OFFSET 0"));
}

#[tokio::test]
async fn explicit_paging_reaches_the_query() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, body) = get_json(app(fake.clone()), "/users?limit=25&offset=50").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(Vec::new()));
    assert!(fake.queries()[0].ends_with("LIMIT 25 OFFSET 50"));
}

#[tokio::test]
async fn blank_params_use_defaults() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, _) = get_json(app(fake.clone()), "/users?limit=&offset=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(fake.queries()[0].ends_with("LIMIT 200 OFFSET 0"));
}

// ── Failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn warehouse_failure_is_problem_500_without_details() {
    let fake = FakeWarehouse::new(Behavior::Fail);
    let (status, headers, body) = get(app(fake), "/users").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/problem+json"
    );

    let text = String::from_utf8(body).unwrap();
    assert!(!text.contains("secret-project"));
    assert!(!text.contains("Not found"));

    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["title"], "BigQuery query failed");
    assert_eq!(json["status"], 500);
}

#[tokio::test]
async fn invalid_identifiers_are_configuration_error() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let bigquery = BigQueryConfig {
        table: "users`; DROP TABLE x; --".into(),
        ..BigQueryConfig::default()
    };
    let (status, _, body) = get(app_with(fake.clone(), server_config(), bigquery), "/users").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let text = String::from_utf8(body).unwrap();
    assert!(!text.contains("DROP"));
    let json: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["title"], "Configuration error");
    assert!(fake.queries().is_empty());
}

#[tokio::test]
async fn deadline_cancels_query_with_499() {
    let fake = FakeWarehouse::new(Behavior::Hang);
    let server = ServerConfig {
        query_timeout: Some(Duration::from_millis(50)),
        ..server_config()
    };
    let (status, _, body) = get(app_with(fake.clone(), server, BigQueryConfig::default()), "/users").await;
    assert_eq!(status.as_u16(), 499);
    assert!(body.is_empty());
    assert_eq!(fake.queries().len(), 1);
}

#[tokio::test]
async fn client_disconnect_cancels_warehouse_call() {
    let fake = FakeWarehouse::new(Behavior::Hang);
    let server = ServerConfig {
        query_timeout: None,
        ..server_config()
    };
    let app = app_with(fake.clone(), server, BigQueryConfig::default());

    let request = tokio::spawn(async move {
        app.oneshot(Request::get("/users").body(Body::empty()).unwrap())
            .await
    });

    // Wait until the handler is parked inside the warehouse call.
    let token = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let Some(token) = fake.tokens().pop() {
                return token;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("warehouse was never called");
    assert!(!token.is_cancelled());

    request.abort();

    tokio::time::timeout(Duration::from_secs(5), token.cancelled())
        .await
        .expect("dropping the request did not cancel the warehouse call");
    assert!(request.await.unwrap_err().is_cancelled());
}

// ── CORS ─────────────────────────────────────────────────────────

async fn allow_origin_for(origins: &[&str], origin: &str) -> Option<String> {
    let server = ServerConfig {
        allowed_origins: origins.iter().map(|s| s.to_string()).collect(),
        ..server_config()
    };
    let app = app_with(
        FakeWarehouse::new(Behavior::Rows(Vec::new())),
        server,
        BigQueryConfig::default(),
    );
    let resp = app
        .oneshot(
            Request::get("/")
                .header(header::ORIGIN, origin)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    resp.headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .map(|v| v.to_str().unwrap().to_string())
}

#[tokio::test]
async fn cors_wildcard_allows_any_origin() {
    assert_eq!(
        allow_origin_for(&["*"], "https://anywhere.example").await.as_deref(),
        Some("*")
    );
}

#[tokio::test]
async fn cors_list_echoes_only_listed_origins() {
    let origins = ["https://app.example", "https://admin.example"];
    assert_eq!(
        allow_origin_for(&origins, "https://admin.example").await.as_deref(),
        Some("https://admin.example")
    );
    assert_eq!(allow_origin_for(&origins, "https://evil.example").await, None);
}

#[tokio::test]
async fn cors_disabled_when_no_origins() {
    assert_eq!(allow_origin_for(&[], "https://app.example").await, None);
}

// ── Docs ─────────────────────────────────────────────────────────

#[tokio::test]
async fn docs_page_is_served() {
    let fake = FakeWarehouse::new(Behavior::Rows(Vec::new()));
    let (status, _, _) = get(app(fake), "/docs").await;
    assert_eq!(status, StatusCode::OK);
}
