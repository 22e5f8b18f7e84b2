mod courses;
mod info;
mod sites;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use super::AppState;

/// The public and site-token surface of the hub.
pub fn hub_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/info", get(info::get_info))
        .route("/forminfo", get(info::get_forminfo))
        .route("/sites", post(sites::register_site))
        .route(
            "/site",
            put(sites::update_site_info).delete(sites::unregister_site),
        )
        .route(
            "/site/courses",
            post(courses::register_courses).delete(courses::unregister_courses),
        )
        .route("/site/courses/{id}/backup", put(courses::upload_backup))
        .route(
            "/site/courses/{id}/screenshots",
            post(courses::upload_screenshot),
        )
        .route("/courses", get(courses::search_courses))
        .route("/courses/{id}/backup", get(courses::download_backup))
        .route(
            "/courses/{id}/screenshots/{index}",
            get(courses::download_screenshot),
        )
}

/// Register administration, gated by admin tokens.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sites", get(sites::list_sites))
        .route("/sites/sync", post(sites::sync_sites))
        .route(
            "/courses/{id}/visibility",
            post(courses::toggle_visibility),
        )
        .route("/courses/{id}/demo", post(courses::provision_demo))
        .route("/sites/{id}", delete(sites::admin_unregister_site))
}
