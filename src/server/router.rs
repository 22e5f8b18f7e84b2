use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use serde_json::json;

use super::hub::{admin_router, hub_router};
use crate::config::HubConfig;
use crate::demo::CourseRestorer;
use crate::directory::Directory;
use crate::files::BackupStorage;
use crate::notify::Notifier;
use crate::search::SearchEngine;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub directory: Directory,
    pub search: SearchEngine,
    pub backups: BackupStorage,
    pub config: HubConfig,
    pub notifier: Arc<dyn Notifier>,
    /// Course engine hook for demo provisioning, when the deployment has one.
    pub restorer: Option<Arc<dyn CourseRestorer>>,
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

/// Rejects every hub call while the hub is switched off. The health probe
/// stays reachable.
async fn require_hub_enabled(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.enabled {
        let body = json!({ "data": null, "error": "Hub is disabled" });
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
    }
    next.run(request).await
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let hub = Router::new()
        .merge(hub_router())
        .nest("/admin", admin_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_hub_enabled,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1/hub", hub)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}
