use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{RequireAdmin, RequireSite};
use crate::server::AppState;
use crate::server::dto::{RegisterSiteResponse, SyncSitesRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::{Site, SiteRecord};

/// Public registration endpoint. Registering an unknown URL issues the
/// site's credential; the token appears in this response and nowhere else.
pub async fn register_site(
    State(state): State<Arc<AppState>>,
    Json(record): Json<SiteRecord>,
) -> impl IntoResponse {
    let (site, token) = state.directory.register_site(&record)?;
    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisterSiteResponse { site, token })),
    ))
}

/// Refreshes the metadata of the authenticated site.
pub async fn update_site_info(
    auth: RequireSite,
    State(state): State<Arc<AppState>>,
    Json(record): Json<SiteRecord>,
) -> impl IntoResponse {
    if record.url != auth.site.url {
        return Err(ApiError::bad_request(
            "a site cannot change its URL; unregister and register again",
        ));
    }
    let site = state.directory.update_site_info(&auth.site, &record)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(site)))
}

/// Self-service unregistration. Withdraws the site's courses and revokes
/// its credential.
pub async fn unregister_site(
    auth: RequireSite,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    state.directory.unregister_site(auth.site.id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// Admin-side removal of a registration.
pub async fn admin_unregister_site(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    state.directory.unregister_site(id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

/// The full site register, deleted entries included. This is the feed a
/// downstream hub pulls when synchronizing.
pub async fn list_sites(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let sites: Vec<Site> = state
        .store
        .list_sites(true)
        .api_err("Failed to list sites")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(sites)))
}

/// Merges an upstream site register into the local one.
pub async fn sync_sites(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(request): Json<SyncSitesRequest>,
) -> impl IntoResponse {
    let records: Vec<SiteRecord> = request.sites;
    let summary = state.directory.reconcile_sites(&records)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(summary)))
}
