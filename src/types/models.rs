use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Dimension;

/// Visibility of a registered site in the public directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SitePrivacy {
    #[default]
    Public,
    Private,
    Hidden,
}

impl SitePrivacy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SitePrivacy::Public => "public",
            SitePrivacy::Private => "private",
            SitePrivacy::Hidden => "hidden",
        }
    }

    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "public" => Some(SitePrivacy::Public),
            "private" => Some(SitePrivacy::Private),
            "hidden" => Some(SitePrivacy::Hidden),
            _ => None,
        }
    }
}

/// A remote installation registered with the hub. Never hard-deleted:
/// unregistering flips `deleted`, which also pulls the site's published
/// courses out of public search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    pub privacy: SitePrivacy,
    /// Per-site publication quota. None = hub default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_publications_per_day: Option<i64>,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The wire shape of a site registration, used both by `register_site` and
/// as one element of a register synchronization batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub privacy: SitePrivacy,
    #[serde(default)]
    pub max_publications_per_day: Option<i64>,
    /// Set by an upstream register to request local deactivation.
    #[serde(default)]
    pub deleted: bool,
}

impl From<Site> for SiteRecord {
    fn from(site: Site) -> Self {
        Self {
            url: site.url,
            name: site.name,
            description: site.description,
            contact_name: site.contact_name,
            contact_email: site.contact_email,
            language: site.language,
            country: site.country,
            privacy: site.privacy,
            max_publications_per_day: site.max_publications_per_day,
            deleted: site.deleted,
        }
    }
}

/// One published course owned by a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub site_id: i64,
    /// The course id on the publishing site. `(site_id, site_course_id)` is
    /// unique in the directory.
    pub site_course_id: i64,
    pub shortname: String,
    pub fullname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    pub enrollable: bool,
    pub downloadable: bool,
    /// Hidden entries are excluded from search unless revealed by an admin.
    pub hidden: bool,
    pub screenshot_count: i64,
    /// Opaque handle into the backup file store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    /// Mapping to a locally materialized demo instance, if one was restored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_course_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_course_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_downloadable() -> bool {
    true
}

/// A course publication submitted by a registered site. Carries the course
/// fields plus the tag values for every dimension: fixed dimensions as
/// option-id sets, free-form tags as raw text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourseSubmission {
    pub site_course_id: i64,
    pub fullname: String,
    pub shortname: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub publisher_name: Option<String>,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub enrollable: bool,
    #[serde(default = "default_downloadable")]
    pub downloadable: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub subjects: Vec<i64>,
    #[serde(default)]
    pub school_types: Vec<i64>,
    #[serde(default)]
    pub school_years: Vec<i64>,
    #[serde(default)]
    pub comp_uses: Vec<i64>,
    #[serde(default)]
    pub oer: bool,
    /// Comma-separated free tags.
    #[serde(default)]
    pub tags: Option<String>,
}

/// One admissible value of a tag dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagOption {
    pub id: i64,
    pub dimension: Dimension,
    pub value: String,
}

/// An auth credential. Site tokens prove a call originates from a registered
/// site; admin tokens gate the register endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}
