mod schema;
mod sqlite;

pub use sqlite::SqliteStore;
pub(crate) use schema::SCHEMA;

use crate::error::Result;
use crate::search::SearchFilter;
use crate::tags::TagValues;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Site operations
    fn create_site(&self, record: &SiteRecord) -> Result<Site>;
    fn get_site(&self, id: i64) -> Result<Option<Site>>;
    fn get_site_by_url(&self, url: &str) -> Result<Option<Site>>;
    fn list_sites(&self, include_deleted: bool) -> Result<Vec<Site>>;
    fn update_site(&self, site: &Site) -> Result<()>;
    /// Soft-deletes the site. Its published entries stay in the database,
    /// still reachable by id, but vanish from public search.
    fn deactivate_site(&self, id: i64) -> Result<bool>;
    fn count_active_sites(&self) -> Result<i64>;

    // Token operations
    fn create_token(&self, token: &Token) -> Result<()>;
    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>>;
    fn delete_site_tokens(&self, site_id: i64) -> Result<()>;
    fn site_has_token(&self, site_id: i64) -> Result<bool>;
    fn update_token_last_used(&self, id: &str) -> Result<()>;
    fn has_admin_token(&self) -> Result<bool>;

    // Course directory operations. register_course runs in one transaction
    // covering the course row, the quota check and every tag write.
    fn register_course(
        &self,
        site_id: i64,
        submission: &CourseSubmission,
        max_per_day: i64,
    ) -> Result<(Course, bool)>;
    fn get_course(&self, id: i64) -> Result<Option<Course>>;
    fn get_course_by_origin(&self, site_id: i64, site_course_id: i64) -> Result<Option<Course>>;
    fn list_site_courses(&self, site_id: i64) -> Result<Vec<Course>>;
    fn delete_course(&self, id: i64) -> Result<bool>;
    fn count_visible_courses(&self) -> Result<i64>;
    fn toggle_course_visibility(&self, id: i64) -> Result<bool>;
    fn set_course_backup(&self, id: i64, path: &str) -> Result<()>;
    fn set_course_demo(&self, id: i64, demo_id: i64, demo_url: &str) -> Result<()>;
    fn increment_screenshot_count(&self, id: i64) -> Result<i64>;

    // Search
    fn search_courses(&self, filter: &SearchFilter) -> Result<Vec<Course>>;

    // Tag catalog
    fn save_course_tags(
        &self,
        course_id: i64,
        dimension: Dimension,
        values: &TagValues,
    ) -> Result<()>;
    fn delete_tag_option(&self, dimension: Dimension, option_id: i64) -> Result<bool>;
    fn course_tag_options(&self, course_id: i64, dimension: Dimension) -> Result<Vec<TagOption>>;
    fn list_dimension_options(&self, dimension: Dimension) -> Result<Vec<TagOption>>;
    fn seed_tag_defaults(&self) -> Result<()>;
}
