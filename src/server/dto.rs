use serde::{Deserialize, Serialize};

use crate::directory::CourseItemOutcome;
use crate::search::{AudienceInfo, SortOptionInfo};
use crate::types::{CourseSubmission, Site, SitePrivacy, SiteRecord, TagOption};

/// Response to a site registration. `token` is present only when a new
/// credential was issued; it is never shown again.
#[derive(Debug, Serialize)]
pub struct RegisterSiteResponse {
    pub site: Site,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterCoursesRequest {
    pub courses: Vec<CourseSubmission>,
}

#[derive(Debug, Serialize)]
pub struct RegisterCoursesResponse {
    pub courses: Vec<CourseItemOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct UnregisterCoursesRequest {
    pub ids: Vec<i64>,
}

/// Query parameters of the public course search. Facet parameters are
/// comma-separated option id lists.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub subject: Option<String>,
    pub schooltype: Option<String>,
    pub schoolyear: Option<String>,
    pub compuse: Option<String>,
    pub oer: Option<bool>,
    pub audience: Option<String>,
    pub sort: Option<String>,
    pub site: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SyncSitesRequest {
    pub sites: Vec<SiteRecord>,
}

/// Public hub metadata plus directory counters.
#[derive(Debug, Serialize)]
pub struct HubInfoResponse {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub language: String,
    pub privacy: SitePrivacy,
    pub sites: i64,
    pub courses: i64,
}

/// Everything a client needs to render the publication and search forms.
#[derive(Debug, Serialize)]
pub struct FormInfoResponse {
    pub dimensions: Vec<DimensionInfo>,
    pub sort_options: Vec<SortOptionInfo>,
    pub audiences: Vec<AudienceInfo>,
    pub max_results: i64,
}

#[derive(Debug, Serialize)]
pub struct DimensionInfo {
    pub name: &'static str,
    pub kind: &'static str,
    pub multi_valued: bool,
    /// Admissible values; present for fixed-option dimensions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<TagOption>>,
}
