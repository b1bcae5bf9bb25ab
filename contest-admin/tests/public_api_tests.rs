//! Integration tests for public endpoints and the pluggable admin gate

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use contest_admin::api::{AdminIdentity, AuthorizationGate, GateError};
use contest_admin::db::sessions::create_session;
use contest_admin::{build_router, AppState};
use contest_common::db::init_in_memory_database;
use serde_json::Value;
use tower::util::ServiceExt;

/// Admits anyone carrying `x-test-admin: yes`
struct HeaderGate;

#[async_trait]
impl AuthorizationGate for HeaderGate {
    async fn authorize(&self, headers: &HeaderMap) -> Result<AdminIdentity, GateError> {
        match headers.get("x-test-admin").and_then(|v| v.to_str().ok()) {
            Some("yes") => Ok(AdminIdentity {
                email: "test@example.org".to_string(),
            }),
            Some(_) => Err(GateError::NotAdmin("test@example.org".to_string())),
            None => Err(GateError::Unauthenticated),
        }
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let pool = init_in_memory_database().await.unwrap();
    let app = build_router(AppState::new(pool, 1024));

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "contest-admin");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn test_sessions_listed_newest_first() {
    let pool = init_in_memory_database().await.unwrap();
    create_session(&pool, "Regional", "2022", false).await.unwrap();
    create_session(&pool, "Regional", "2024", true).await.unwrap();
    let app = build_router(AppState::new(pool, 1024));

    let (status, body) = send(&app, get("/api/sessions")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["year"], "2024");
    assert_eq!(body[0]["is_active"], true);
    assert_eq!(body[1]["year"], "2022");
}

#[tokio::test]
async fn test_blank_session_filter_is_bad_request() {
    let pool = init_in_memory_database().await.unwrap();
    let app = build_router(AppState::new(pool, 1024));

    let (status, _) = send(&app, get("/api/teams?session_id=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/results")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Array(vec![]));
}

#[tokio::test]
async fn test_custom_gate_decides_access() {
    let pool = init_in_memory_database().await.unwrap();
    let session = create_session(&pool, "Regional", "2024", true).await.unwrap();
    let app = build_router(AppState::with_gate(pool, Arc::new(HeaderGate), 64 * 1024));

    let body = format!(
        "--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"t.csv\"\r\n\r\n\
         team_name,member_names\nAlpha,Ann\r\n\
         --b\r\nContent-Disposition: form-data; name=\"sessionId\"\r\n\r\n{}\r\n--b--\r\n",
        session
    );
    let request = |admin: Option<&str>| {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/admin/upload-csv/teams")
            .header("content-type", "multipart/form-data; boundary=b");
        if let Some(value) = admin {
            builder = builder.header("x-test-admin", value);
        }
        builder.body(Body::from(body.clone())).unwrap()
    };

    assert_eq!(send(&app, request(None)).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(send(&app, request(Some("no"))).await.0, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request(Some("yes"))).await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["inserted"], 1);

    let (_, teams) = send(&app, get(&format!("/api/teams?session_id={}", session))).await;
    assert_eq!(teams[0]["team_name"], "Alpha");
    assert_eq!(teams[0]["members"][0]["role"], "Contestant");
}
