use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tokio::io::AsyncReadExt;

use crate::auth::{MaybeAdmin, RequireAdmin, RequireSite};
use crate::demo::provision_demo_course;
use crate::directory::RegistrationStatus;
use crate::files::BackupStorageError;
use crate::search::{Audience, SearchQuery, SortOption};
use crate::server::AppState;
use crate::server::dto::{
    RegisterCoursesRequest, RegisterCoursesResponse, SearchParams, UnregisterCoursesRequest,
};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::parse_id_list;
use crate::types::{Course, Dimension};

/// Publishes a batch of courses on behalf of the authenticated site.
/// Per-item outcomes; one rejected item never fails the batch.
pub async fn register_courses(
    auth: RequireSite,
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterCoursesRequest>,
) -> impl IntoResponse {
    if request.courses.is_empty() {
        return Err(ApiError::bad_request("no courses submitted"));
    }

    let outcomes = state
        .directory
        .register_courses(&auth.site, &request.courses)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(RegisterCoursesResponse {
        courses: outcomes,
    })))
}

/// Withdraws directory entries owned by the authenticated site and removes
/// their stored backup and screenshot files.
pub async fn unregister_courses(
    auth: RequireSite,
    State(state): State<Arc<AppState>>,
    Json(request): Json<UnregisterCoursesRequest>,
) -> impl IntoResponse {
    if request.ids.is_empty() {
        return Err(ApiError::bad_request("no entry ids submitted"));
    }

    // Screenshot counts must be read before the rows go away.
    let mut screenshot_counts: HashMap<i64, i64> = HashMap::new();
    for &id in &request.ids {
        if let Some(course) = state.store.get_course(id).api_err("Failed to load entry")? {
            if course.site_id == auth.site.id {
                screenshot_counts.insert(id, course.screenshot_count);
            }
        }
    }

    let outcomes = state
        .directory
        .unregister_courses(&auth.site, &request.ids)?;

    for outcome in &outcomes {
        if outcome.status == RegistrationStatus::Rejected {
            continue;
        }
        let Some(id) = outcome.id else { continue };
        let Some(&count) = screenshot_counts.get(&id) else {
            continue;
        };
        // The row is already gone; log and keep going.
        if let Err(e) = state
            .backups
            .delete_course_files(auth.site.id, id, count)
            .await
        {
            tracing::warn!(entry_id = id, error = %e, "failed to remove files of withdrawn entry");
        }
    }

    Ok::<_, ApiError>(Json(ApiResponse::success(RegisterCoursesResponse {
        courses: outcomes,
    })))
}

/// Public faceted search. An admin bearer token reveals hidden entries and
/// entries of deactivated sites.
pub async fn search_courses(
    MaybeAdmin(admin): MaybeAdmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let mut facets: Vec<(Dimension, Vec<i64>)> = Vec::new();
    for (dimension, raw) in [
        (Dimension::Subject, &params.subject),
        (Dimension::SchoolType, &params.schooltype),
        (Dimension::SchoolYear, &params.schoolyear),
        (Dimension::CompUse, &params.compuse),
    ] {
        if let Some(raw) = raw {
            let ids = parse_id_list(dimension.name(), raw)?;
            if !ids.is_empty() {
                facets.push((dimension, ids));
            }
        }
    }

    if params.oer == Some(true) {
        let options = state
            .store
            .list_dimension_options(Dimension::Oer)
            .api_err("Failed to resolve OER option")?;
        facets.push((Dimension::Oer, options.into_iter().map(|o| o.id).collect()));
    }

    let audience = match params.audience.as_deref() {
        None => Audience::All,
        Some(raw) => Audience::from_str(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown audience: {raw}")))?,
    };
    let sort = match params.sort.as_deref() {
        None => SortOption::default(),
        Some(raw) => SortOption::from_value(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown sort option: {raw}")))?,
    };

    let query = SearchQuery {
        text: params.q,
        facets,
        audience,
        site_id: params.site,
        sort,
        offset: params.offset.unwrap_or(0),
    };

    let courses: Vec<Course> = state.search.search(&query, admin)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(courses)))
}

/// Stores the backup of a published course and records it on the entry.
pub async fn upload_backup(
    auth: RequireSite,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> impl IntoResponse {
    // Ownership is checked up front so a foreign upload never hits disk.
    let course = state
        .store
        .get_course(id)
        .api_err("Failed to load entry")?
        .or_not_found("No such entry")?;
    if course.site_id != auth.site.id {
        return Err(ApiError::forbidden("entry belongs to another site"));
    }

    let handle = state
        .backups
        .put_backup(auth.site.id, id, &body)
        .await
        .map_err(map_storage_error)?;

    let course = state.directory.attach_backup(&auth.site, id, &handle)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(course)))
}

/// Serves the stored backup of a visible, downloadable entry.
pub async fn download_backup(
    MaybeAdmin(admin): MaybeAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let course = visible_course(&state, id, admin)?;
    if !course.downloadable {
        return Err(ApiError::forbidden("entry is not downloadable"));
    }
    if course.backup_path.is_none() {
        return Err(ApiError::not_found("entry has no backup"));
    }

    let (mut reader, size) = state
        .backups
        .get_backup(course.site_id, course.id)
        .await
        .map_err(map_storage_error)?;

    let mut data = Vec::with_capacity(size as usize);
    reader
        .read_to_end(&mut data)
        .await
        .map_err(|_| ApiError::internal("Failed to read backup"))?;

    Ok::<_, ApiError>((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.mbz\"", course.shortname),
            ),
        ],
        data,
    ))
}

/// Records a screenshot upload for an entry owned by the site.
pub async fn upload_screenshot(
    auth: RequireSite,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    body: Bytes,
) -> impl IntoResponse {
    let count = state.directory.attach_screenshot(&auth.site, id)?;
    state
        .backups
        .put_screenshot(auth.site.id, id, count, &body)
        .await
        .map_err(map_storage_error)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        json!({ "screenshot_count": count }),
    )))
}

pub async fn download_screenshot(
    MaybeAdmin(admin): MaybeAdmin,
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let course = visible_course(&state, id, admin)?;
    if index < 1 || index > course.screenshot_count {
        return Err(ApiError::not_found("No such screenshot"));
    }

    let data = state
        .backups
        .get_screenshot(course.site_id, course.id, index)
        .await
        .map_err(map_storage_error)?;

    Ok::<_, ApiError>(([(header::CONTENT_TYPE, "image/png")], data))
}

/// Admin toggle of the hidden flag. Returns the new state.
pub async fn toggle_visibility(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let hidden = state.directory.toggle_visibility(id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(json!({ "hidden": hidden }))))
}

/// Materializes a demo course from the entry's uploaded backup.
pub async fn provision_demo(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let restorer = state.restorer.as_ref().ok_or(ApiError {
        status: StatusCode::NOT_IMPLEMENTED,
        message: "no course engine configured".to_string(),
    })?;

    let demo = provision_demo_course(
        &state.store,
        &state.notifier,
        restorer,
        state.backups.root(),
        id,
    )?;

    Ok::<_, ApiError>(Json(ApiResponse::success(json!({
        "demo_course_id": demo.id,
        "demo_course_url": demo.url,
    }))))
}

/// Loads an entry the caller is allowed to see. Hidden entries and entries
/// of deactivated sites exist only for administrators.
fn visible_course(state: &Arc<AppState>, id: i64, admin: bool) -> Result<Course, ApiError> {
    let course = state
        .store
        .get_course(id)
        .api_err("Failed to load entry")?
        .or_not_found("No such entry")?;

    if admin {
        return Ok(course);
    }
    if course.hidden {
        return Err(ApiError::not_found("No such entry"));
    }
    let site = state
        .store
        .get_site(course.site_id)
        .api_err("Failed to load site")?
        .or_not_found("No such entry")?;
    if site.deleted {
        return Err(ApiError::not_found("No such entry"));
    }
    Ok(course)
}

fn map_storage_error(e: BackupStorageError) -> ApiError {
    match e {
        BackupStorageError::NotFound => ApiError::not_found("File not found"),
        BackupStorageError::EmptyUpload => ApiError::bad_request("Empty upload"),
        BackupStorageError::Io(e) => {
            tracing::error!("backup storage io error: {e}");
            ApiError::internal("Storage failure")
        }
    }
}
