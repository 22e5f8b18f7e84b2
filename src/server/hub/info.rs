use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::{DimensionInfo, FormInfoResponse, HubInfoResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::{Dimension, DimensionKind};

/// Public hub metadata, as shown before a site decides to register.
pub async fn get_info(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sites = state
        .store
        .count_active_sites()
        .api_err("Failed to count sites")?;
    let courses = state
        .store
        .count_visible_courses()
        .api_err("Failed to count courses")?;

    let config = &state.config;
    Ok::<_, ApiError>(Json(ApiResponse::success(HubInfoResponse {
        name: config.name.clone(),
        description: config.description.clone(),
        contact_name: config.contact_name.clone(),
        contact_email: config.contact_email.clone(),
        language: config.language.clone(),
        privacy: config.privacy,
        sites,
        courses,
    })))
}

/// The dimension catalog and search option tables, for form rendering.
pub async fn get_forminfo(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut dimensions = Vec::with_capacity(Dimension::ALL.len());
    for dimension in Dimension::ALL {
        let options = match dimension.kind() {
            DimensionKind::FixedOption => Some(
                state
                    .store
                    .list_dimension_options(dimension)
                    .api_err("Failed to list dimension options")?,
            ),
            DimensionKind::FreeForm => None,
        };
        dimensions.push(DimensionInfo {
            name: dimension.name(),
            kind: match dimension.kind() {
                DimensionKind::FixedOption => "fixed",
                DimensionKind::FreeForm => "free",
            },
            multi_valued: dimension.multi_valued(),
            options,
        });
    }

    let options = state.search.options();
    Ok::<_, ApiError>(Json(ApiResponse::success(FormInfoResponse {
        dimensions,
        sort_options: options.sort_options(),
        audiences: options.audience_options(),
        max_results: state.config.max_results,
    })))
}
