//! Read-side faceted search over the course directory.

use std::sync::Arc;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

use crate::config::HubConfig;
use crate::error::Result;
use crate::store::Store;
use crate::types::{Course, Dimension};

/// Which publication type the caller is searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    All,
    Downloadable,
    Enrollable,
}

impl Audience {
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Audience::All),
            "downloadable" => Some(Audience::Downloadable),
            "enrollable" => Some(Audience::Enrollable),
            _ => None,
        }
    }
}

/// The fixed sort table. `Relevance` and `Rating` are promised by the search
/// form but no scoring or rating data exists in the directory, so both fall
/// back to recency. Known limitation, kept deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    Relevance,
    Rating,
    #[default]
    DateDesc,
    DateAsc,
    AlphabetAsc,
    AlphabetDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 6] = [
        SortOption::Relevance,
        SortOption::Rating,
        SortOption::DateDesc,
        SortOption::DateAsc,
        SortOption::AlphabetAsc,
        SortOption::AlphabetDesc,
    ];

    #[must_use]
    pub fn value(self) -> &'static str {
        match self {
            SortOption::Relevance => "relevance",
            SortOption::Rating => "rating",
            SortOption::DateDesc => "date",
            SortOption::DateAsc => "dateReverse",
            SortOption::AlphabetAsc => "alphabet",
            SortOption::AlphabetDesc => "alphabetReverse",
        }
    }

    #[must_use]
    pub fn from_value(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.value() == value)
    }

    /// `(column, direction)` actually applied to the query.
    #[must_use]
    pub fn order(self) -> (&'static str, &'static str) {
        match self {
            // No relevance scoring or rating data exists; fall back to recency.
            SortOption::Relevance | SortOption::Rating | SortOption::DateDesc => {
                ("published_at", "DESC")
            }
            SortOption::DateAsc => ("published_at", "ASC"),
            SortOption::AlphabetAsc => ("fullname", "ASC"),
            SortOption::AlphabetDesc => ("fullname", "DESC"),
        }
    }
}

/// A fully resolved directory query, as executed by the store.
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    /// Substring match against fullname, description and publisher.
    pub text: Option<String>,
    /// AND across dimensions; within one dimension an entry matches if it
    /// has at least one assignment in the accepted set.
    pub facets: Vec<(Dimension, Vec<i64>)>,
    pub audience: Audience,
    /// Restrict results to one publishing site.
    pub site_id: Option<i64>,
    /// Admin reveal: include hidden entries and entries of deleted sites.
    pub include_hidden: bool,
    pub sort: SortOption,
    pub limit: i64,
    pub offset: i64,
}

/// Builds the directory query. Returns the SQL and its positional
/// parameters; only whitelisted sort columns are interpolated.
pub(crate) fn build_sql(filter: &SearchFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(
        "SELECT c.id, c.site_id, c.site_course_id, c.shortname, c.fullname, c.description,
                c.language, c.license, c.publisher_name, c.creator_name, c.enrollable,
                c.downloadable, c.hidden, c.screenshot_count, c.backup_path,
                c.demo_course_id, c.demo_course_url, c.published_at, c.updated_at
         FROM courses c
         JOIN sites s ON s.id = c.site_id
         WHERE 1 = 1",
    );
    let mut params: Vec<Value> = Vec::new();

    if !filter.include_hidden {
        sql.push_str(" AND c.hidden = 0 AND s.deleted = 0");
    }

    if let Some(site_id) = filter.site_id {
        params.push(Value::Integer(site_id));
        sql.push_str(&format!(" AND c.site_id = ?{}", params.len()));
    }

    match filter.audience {
        Audience::All => {}
        Audience::Downloadable => sql.push_str(" AND c.downloadable = 1"),
        Audience::Enrollable => sql.push_str(" AND c.enrollable = 1"),
    }

    if let Some(text) = filter.text.as_deref() {
        let text = text.trim();
        if !text.is_empty() {
            let pattern = format!("%{}%", text.to_lowercase());
            params.push(Value::Text(pattern));
            let n = params.len();
            sql.push_str(&format!(
                " AND (lower(c.fullname) LIKE ?{n}
                   OR lower(COALESCE(c.description, '')) LIKE ?{n}
                   OR lower(COALESCE(c.publisher_name, '')) LIKE ?{n})"
            ));
        }
    }

    for (dimension, option_ids) in &filter.facets {
        if option_ids.is_empty() {
            continue;
        }
        let mut placeholders = Vec::with_capacity(option_ids.len());
        for id in option_ids {
            params.push(Value::Integer(*id));
            placeholders.push(format!("?{}", params.len()));
        }
        params.push(Value::Text(dimension.name().to_string()));
        let dim_param = params.len();
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM tag_assignments ta
                          JOIN tag_options opt ON opt.id = ta.option_id
                          WHERE ta.course_id = c.id
                            AND opt.dimension = ?{dim_param}
                            AND ta.option_id IN ({}))",
            placeholders.join(", ")
        ));
    }

    let (column, direction) = filter.sort.order();
    sql.push_str(&format!(" ORDER BY c.{column} {direction}, c.id DESC"));

    params.push(Value::Integer(filter.limit));
    sql.push_str(&format!(" LIMIT ?{}", params.len()));
    params.push(Value::Integer(filter.offset));
    sql.push_str(&format!(" OFFSET ?{}", params.len()));

    (sql, params)
}

/// Explicitly constructed provider of the option tables the search form
/// exposes. Stateless; passed to callers instead of a process-wide cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions;

#[derive(Debug, Serialize)]
pub struct SortOptionInfo {
    pub value: &'static str,
    pub column: &'static str,
    pub direction: &'static str,
}

#[derive(Debug, Serialize)]
pub struct AudienceInfo {
    pub value: &'static str,
}

impl SearchOptions {
    #[must_use]
    pub fn sort_options(&self) -> Vec<SortOptionInfo> {
        SortOption::ALL
            .into_iter()
            .map(|sort| {
                let (column, direction) = sort.order();
                SortOptionInfo {
                    value: sort.value(),
                    column,
                    direction,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn audience_options(&self) -> Vec<AudienceInfo> {
        vec![
            AudienceInfo { value: "all" },
            AudienceInfo {
                value: "downloadable",
            },
            AudienceInfo {
                value: "enrollable",
            },
        ]
    }
}

/// The search engine: resolves caller input into a `SearchFilter`, applying
/// the visibility policy and the configured page size.
pub struct SearchEngine {
    store: Arc<dyn Store>,
    options: SearchOptions,
    max_results: i64,
}

/// Caller-facing query parameters, before policy is applied.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub facets: Vec<(Dimension, Vec<i64>)>,
    pub audience: Audience,
    pub site_id: Option<i64>,
    pub sort: SortOption,
    pub offset: i64,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn Store>, options: SearchOptions, config: &HubConfig) -> Self {
        Self {
            store,
            options,
            max_results: config.max_results,
        }
    }

    #[must_use]
    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Runs a query. An empty query returns all visible entries. Hidden
    /// entries are included only when `admin_reveal` is set.
    pub fn search(&self, query: &SearchQuery, admin_reveal: bool) -> Result<Vec<Course>> {
        let filter = SearchFilter {
            text: query.text.clone(),
            facets: query.facets.clone(),
            audience: query.audience,
            site_id: query.site_id,
            include_hidden: admin_reveal,
            sort: query.sort,
            limit: self.max_results,
            offset: query.offset.max(0),
        };

        self.store.search_courses(&filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_fallback_to_recency() {
        assert_eq!(SortOption::Relevance.order(), ("published_at", "DESC"));
        assert_eq!(SortOption::Rating.order(), ("published_at", "DESC"));
        assert_eq!(SortOption::DateAsc.order(), ("published_at", "ASC"));
        assert_eq!(SortOption::AlphabetDesc.order(), ("fullname", "DESC"));
    }

    #[test]
    fn test_sort_wire_values() {
        assert_eq!(SortOption::from_value("dateReverse"), Some(SortOption::DateAsc));
        assert_eq!(SortOption::from_value("alphabet"), Some(SortOption::AlphabetAsc));
        assert_eq!(SortOption::from_value("bogus"), None);
    }

    #[test]
    fn test_build_sql_visibility_and_facets() {
        let filter = SearchFilter {
            text: Some("algebra".to_string()),
            facets: vec![(Dimension::Subject, vec![3, 4]), (Dimension::SchoolType, vec![7])],
            audience: Audience::Downloadable,
            site_id: None,
            include_hidden: false,
            sort: SortOption::DateDesc,
            limit: 50,
            offset: 0,
        };

        let (sql, params) = build_sql(&filter);
        assert!(sql.contains("c.hidden = 0"));
        assert!(sql.contains("s.deleted = 0"));
        assert!(sql.contains("c.downloadable = 1"));
        // one LIKE pattern, three facet ids, two dimension names, limit, offset
        assert_eq!(params.len(), 8);
        assert_eq!(sql.matches("EXISTS").count(), 2);
    }

    #[test]
    fn test_build_sql_admin_reveal_drops_visibility_clauses() {
        let filter = SearchFilter {
            include_hidden: true,
            limit: 10,
            ..SearchFilter::default()
        };
        let (sql, _) = build_sql(&filter);
        assert!(!sql.contains("c.hidden = 0"));
    }

    #[test]
    fn test_build_sql_empty_facet_set_ignored() {
        let filter = SearchFilter {
            facets: vec![(Dimension::Subject, vec![])],
            limit: 10,
            ..SearchFilter::default()
        };
        let (sql, _) = build_sql(&filter);
        assert!(!sql.contains("EXISTS"));
    }
}
