use crate::types::SitePrivacy;

/// Hub-level settings, constructed once at startup and passed explicitly to
/// the components that read them. There are no ambient config lookups.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// When false the protocol surface answers 503 on every hub route.
    pub enabled: bool,
    pub name: String,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub language: String,
    pub privacy: SitePrivacy,
    /// Fixed search page size.
    pub max_results: i64,
    /// Default per-site publication quota over a trailing 24h window.
    /// A site-level override takes precedence.
    pub max_publications_per_day: i64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "Course Hub".to_string(),
            description: None,
            contact_name: None,
            contact_email: None,
            language: "en".to_string(),
            privacy: SitePrivacy::Public,
            max_results: 50,
            max_publications_per_day: 10,
        }
    }
}
