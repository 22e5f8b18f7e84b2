use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use coursehub::auth::TokenGenerator;
use coursehub::config::HubConfig;
use coursehub::demo::{CourseRestorer, DemoCourse};
use coursehub::directory::Directory;
use coursehub::files::BackupStorage;
use coursehub::notify::LogNotifier;
use coursehub::search::{SearchEngine, SearchOptions};
use coursehub::server::{AppState, create_router};
use coursehub::store::{SqliteStore, Store};
use coursehub::types::Token;

pub struct TestHub {
    pub router: Router,
    pub admin_token: String,
    pub data_dir: tempfile::TempDir,
}

pub struct StubRestorer;

impl CourseRestorer for StubRestorer {
    fn restore(&self, _backup: &Path, shortname: &str) -> anyhow::Result<DemoCourse> {
        Ok(DemoCourse {
            id: 4242,
            url: format!("https://hub.example/demo/{shortname}"),
        })
    }
}

pub fn test_hub() -> TestHub {
    test_hub_with(HubConfig::default(), false)
}

pub fn test_hub_with(config: HubConfig, with_restorer: bool) -> TestHub {
    let data_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SqliteStore::in_memory().unwrap());
    store.initialize().unwrap();

    let generator = TokenGenerator::new();
    let (admin_token, lookup, hash) = generator.generate().unwrap();
    store
        .create_token(&Token {
            id: Uuid::new_v4().to_string(),
            token_hash: hash,
            token_lookup: lookup,
            is_admin: true,
            site_id: None,
            created_at: Utc::now(),
            expires_at: None,
            last_used_at: None,
        })
        .unwrap();

    let notifier = Arc::new(LogNotifier);
    let state = Arc::new(AppState {
        store: store.clone(),
        directory: Directory::new(store.clone(), config.clone(), notifier.clone()),
        search: SearchEngine::new(store, SearchOptions, &config),
        backups: BackupStorage::new(data_dir.path()),
        config,
        notifier,
        restorer: if with_restorer {
            Some(Arc::new(StubRestorer))
        } else {
            None
        },
    });

    TestHub {
        router: create_router(state),
        admin_token,
        data_dir,
    }
}

/// Sends a JSON request and returns status plus parsed body. A non-JSON
/// body comes back as `Value::Null`.
pub async fn request(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Sends a raw-bytes request and returns status plus the raw response body.
pub async fn request_bytes(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = router
        .clone()
        .oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

/// Registers a site and returns its token.
pub async fn register_site(router: &Router, url: &str, name: &str) -> (i64, String) {
    let (status, body) = request(
        router,
        "POST",
        "/api/v1/hub/sites",
        None,
        Some(serde_json::json!({ "url": url, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register_site failed: {body}");

    let site_id = body["data"]["site"]["id"].as_i64().unwrap();
    let token = body["data"]["token"].as_str().unwrap().to_string();
    (site_id, token)
}

/// Publishes one course and returns the directory entry id.
pub async fn publish_course(router: &Router, token: &str, submission: Value) -> i64 {
    let (status, body) = request(
        router,
        "POST",
        "/api/v1/hub/site/courses",
        Some(token),
        Some(serde_json::json!({ "courses": [submission] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "publish failed: {body}");

    let outcome = &body["data"]["courses"][0];
    assert_ne!(outcome["status"], "rejected", "publish rejected: {body}");
    outcome["id"].as_i64().unwrap()
}
