use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::search::{SearchFilter, build_sql};
use crate::tags::{self, TagValues};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn map_site(row: &Row<'_>) -> rusqlite::Result<Site> {
    Ok(Site {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        contact_name: row.get(4)?,
        contact_email: row.get(5)?,
        language: row.get(6)?,
        country: row.get(7)?,
        privacy: SitePrivacy::from_str(&row.get::<_, String>(8)?).unwrap_or_default(),
        max_publications_per_day: row.get(9)?,
        deleted: row.get(10)?,
        created_at: parse_datetime(&row.get::<_, String>(11)?),
        updated_at: parse_datetime(&row.get::<_, String>(12)?),
    })
}

const SITE_COLUMNS: &str = "id, url, name, description, contact_name, contact_email, language,
     country, privacy, max_publications_per_day, deleted, created_at, updated_at";

pub(crate) fn map_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        site_id: row.get(1)?,
        site_course_id: row.get(2)?,
        shortname: row.get(3)?,
        fullname: row.get(4)?,
        description: row.get(5)?,
        language: row.get(6)?,
        license: row.get(7)?,
        publisher_name: row.get(8)?,
        creator_name: row.get(9)?,
        enrollable: row.get(10)?,
        downloadable: row.get(11)?,
        hidden: row.get(12)?,
        screenshot_count: row.get(13)?,
        backup_path: row.get(14)?,
        demo_course_id: row.get(15)?,
        demo_course_url: row.get(16)?,
        published_at: parse_datetime(&row.get::<_, String>(17)?),
        updated_at: parse_datetime(&row.get::<_, String>(18)?),
    })
}

const COURSE_COLUMNS: &str = "id, site_id, site_course_id, shortname, fullname, description,
     language, license, publisher_name, creator_name, enrollable, downloadable, hidden,
     screenshot_count, backup_path, demo_course_id, demo_course_url, published_at, updated_at";

/// Probes `base`, `base_`, `base_1`, `base_2`, ... until a shortname is
/// free. Inputs are near-unique, so the probe rarely loops.
fn resolve_shortname(conn: &Connection, base: &str, exclude_id: Option<i64>) -> Result<String> {
    let taken = |candidate: &str| -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM courses WHERE shortname = ?1 AND id != ?2",
                params![candidate, exclude_id.unwrap_or(-1)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    };

    if !taken(base)? {
        return Ok(base.to_string());
    }

    let candidate = format!("{base}_");
    if !taken(&candidate)? {
        return Ok(candidate);
    }

    let mut i: u64 = 1;
    loop {
        let candidate = format!("{base}_{i}");
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        i += 1;
    }
}

/// Writes the full tag set of a submission. Runs inside the registration
/// transaction.
fn save_submission_tags(
    conn: &Connection,
    course_id: i64,
    submission: &CourseSubmission,
) -> Result<()> {
    tags::save(
        conn,
        course_id,
        Dimension::Subject,
        &TagValues::OptionIds(submission.subjects.clone()),
    )?;
    tags::save(
        conn,
        course_id,
        Dimension::SchoolType,
        &TagValues::OptionIds(submission.school_types.clone()),
    )?;
    tags::save(
        conn,
        course_id,
        Dimension::SchoolYear,
        &TagValues::OptionIds(submission.school_years.clone()),
    )?;
    tags::save(
        conn,
        course_id,
        Dimension::CompUse,
        &TagValues::OptionIds(submission.comp_uses.clone()),
    )?;

    // The OER dimension has exactly one seeded option; the submission
    // carries a flag rather than an id.
    let oer_ids = if submission.oer {
        let id: Option<i64> = conn
            .query_row(
                "SELECT id FROM tag_options WHERE dimension = 'oer' LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        match id {
            Some(id) => vec![id],
            None => return Err(Error::Config("oer option not seeded".to_string())),
        }
    } else {
        Vec::new()
    };
    tags::save(conn, course_id, Dimension::Oer, &TagValues::OptionIds(oer_ids))?;

    tags::save(
        conn,
        course_id,
        Dimension::Tags,
        &TagValues::Text(submission.tags.clone().into_iter().collect()),
    )?;
    tags::save(
        conn,
        course_id,
        Dimension::CourseName,
        &TagValues::Text(vec![submission.fullname.clone()]),
    )?;
    tags::save(
        conn,
        course_id,
        Dimension::Description,
        &TagValues::Text(submission.description.clone().into_iter().collect()),
    )?;

    Ok(())
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;
        tags::seed_defaults(&conn)?;
        Ok(())
    }

    // Site operations

    fn create_site(&self, record: &SiteRecord) -> Result<Site> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO sites (url, name, description, contact_name, contact_email, language,
                                country, privacy, max_publications_per_day)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.url,
                record.name,
                record.description,
                record.contact_name,
                record.contact_email,
                record.language,
                record.country,
                record.privacy.as_str(),
                record.max_publications_per_day,
            ],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            &format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?1"),
            params![id],
            map_site,
        )
        .map_err(Error::from)
    }

    fn get_site(&self, id: i64) -> Result<Option<Site>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?1"),
            params![id],
            map_site,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_site_by_url(&self, url: &str) -> Result<Option<Site>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SITE_COLUMNS} FROM sites WHERE url = ?1"),
            params![url],
            map_site,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_sites(&self, include_deleted: bool) -> Result<Vec<Site>> {
        let conn = self.conn();
        let sql = if include_deleted {
            format!("SELECT {SITE_COLUMNS} FROM sites ORDER BY id")
        } else {
            format!("SELECT {SITE_COLUMNS} FROM sites WHERE deleted = 0 ORDER BY id")
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_site)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_site(&self, site: &Site) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE sites SET url = ?1, name = ?2, description = ?3, contact_name = ?4,
                    contact_email = ?5, language = ?6, country = ?7, privacy = ?8,
                    max_publications_per_day = ?9, deleted = ?10, updated_at = ?11
             WHERE id = ?12",
            params![
                site.url,
                site.name,
                site.description,
                site.contact_name,
                site.contact_email,
                site.language,
                site.country,
                site.privacy.as_str(),
                site.max_publications_per_day,
                site.deleted,
                format_datetime(&Utc::now()),
                site.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn deactivate_site(&self, id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE sites SET deleted = 1, updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(rows > 0)
    }

    fn count_active_sites(&self) -> Result<i64> {
        self.conn()
            .query_row("SELECT COUNT(*) FROM sites WHERE deleted = 0", [], |row| {
                row.get(0)
            })
            .map_err(Error::from)
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, is_admin, site_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.is_admin,
                token.site_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::Conflict("token lookup collision".to_string()))
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, is_admin, site_id, created_at, expires_at, last_used_at
             FROM tokens WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Token {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    is_admin: row.get(3)?,
                    site_id: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    expires_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                    last_used_at: row.get::<_, Option<String>>(7)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_site_tokens(&self, site_id: i64) -> Result<()> {
        self.conn()
            .execute("DELETE FROM tokens WHERE site_id = ?1", params![site_id])?;
        Ok(())
    }

    fn site_has_token(&self, site_id: i64) -> Result<bool> {
        let found: Option<String> = self
            .conn()
            .query_row(
                "SELECT id FROM tokens WHERE site_id = ?1 LIMIT 1",
                params![site_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn has_admin_token(&self) -> Result<bool> {
        let found: Option<String> = self
            .conn()
            .query_row(
                "SELECT id FROM tokens WHERE is_admin = 1 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    // Course directory operations

    fn register_course(
        &self,
        site_id: i64,
        submission: &CourseSubmission,
        max_per_day: i64,
    ) -> Result<(Course, bool)> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let existing: Option<(i64, String)> = tx
            .query_row(
                "SELECT id, shortname FROM courses WHERE site_id = ?1 AND site_course_id = ?2",
                params![site_id, submission.site_course_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let now = format_datetime(&Utc::now());
        let (course_id, inserted) = match existing {
            Some((id, current_shortname)) => {
                let shortname = if submission.shortname != current_shortname {
                    resolve_shortname(&tx, &submission.shortname, Some(id))?
                } else {
                    current_shortname
                };

                tx.execute(
                    "UPDATE courses SET shortname = ?1, fullname = ?2, description = ?3,
                            language = ?4, license = ?5, publisher_name = ?6, creator_name = ?7,
                            enrollable = ?8, downloadable = ?9, hidden = ?10, updated_at = ?11
                     WHERE id = ?12",
                    params![
                        shortname,
                        submission.fullname,
                        submission.description,
                        submission.language,
                        submission.license,
                        submission.publisher_name,
                        submission.creator_name,
                        submission.enrollable,
                        submission.downloadable,
                        submission.hidden,
                        now,
                        id,
                    ],
                )?;
                (id, false)
            }
            None => {
                // Quota applies to new publications only; the window slides,
                // entries age out of it without any scheduled reset.
                let since = Utc::now() - Duration::hours(24);
                let recent: i64 = tx.query_row(
                    "SELECT COUNT(*) FROM courses WHERE site_id = ?1 AND published_at > ?2",
                    params![site_id, format_datetime(&since)],
                    |row| row.get(0),
                )?;
                if recent >= max_per_day {
                    return Err(Error::QuotaExceeded);
                }

                let shortname = resolve_shortname(&tx, &submission.shortname, None)?;
                tx.execute(
                    "INSERT INTO courses (site_id, site_course_id, shortname, fullname,
                            description, language, license, publisher_name, creator_name,
                            enrollable, downloadable, hidden)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        site_id,
                        submission.site_course_id,
                        shortname,
                        submission.fullname,
                        submission.description,
                        submission.language,
                        submission.license,
                        submission.publisher_name,
                        submission.creator_name,
                        submission.enrollable,
                        submission.downloadable,
                        submission.hidden,
                    ],
                )?;
                (tx.last_insert_rowid(), true)
            }
        };

        save_submission_tags(&tx, course_id, submission)?;
        tx.commit()?;

        let course = conn.query_row(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
            params![course_id],
            map_course,
        )?;
        Ok((course, inserted))
    }

    fn get_course(&self, id: i64) -> Result<Option<Course>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ?1"),
            params![id],
            map_course,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_course_by_origin(&self, site_id: i64, site_course_id: i64) -> Result<Option<Course>> {
        let conn = self.conn();
        conn.query_row(
            &format!(
                "SELECT {COURSE_COLUMNS} FROM courses WHERE site_id = ?1 AND site_course_id = ?2"
            ),
            params![site_id, site_course_id],
            map_course,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_site_courses(&self, site_id: i64) -> Result<Vec<Course>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE site_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(params![site_id], map_course)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_course(&self, id: i64) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tags::delete_course_tags(&tx, id)?;
        let rows = tx.execute("DELETE FROM courses WHERE id = ?1", params![id])?;

        tx.commit()?;
        Ok(rows > 0)
    }

    fn count_visible_courses(&self) -> Result<i64> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM courses c JOIN sites s ON s.id = c.site_id
                 WHERE c.hidden = 0 AND s.deleted = 0",
                [],
                |row| row.get(0),
            )
            .map_err(Error::from)
    }

    fn toggle_course_visibility(&self, id: i64) -> Result<bool> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE courses SET hidden = 1 - hidden, updated_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        conn.query_row("SELECT hidden FROM courses WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .map_err(Error::from)
    }

    fn set_course_backup(&self, id: i64, path: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE courses SET backup_path = ?1, updated_at = ?2 WHERE id = ?3",
            params![path, format_datetime(&Utc::now()), id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn set_course_demo(&self, id: i64, demo_id: i64, demo_url: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE courses SET demo_course_id = ?1, demo_course_url = ?2, updated_at = ?3
             WHERE id = ?4",
            params![demo_id, demo_url, format_datetime(&Utc::now()), id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn increment_screenshot_count(&self, id: i64) -> Result<i64> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE courses SET screenshot_count = screenshot_count + 1, updated_at = ?1
             WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        if rows == 0 {
            return Err(Error::NotFound);
        }
        conn.query_row(
            "SELECT screenshot_count FROM courses WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .map_err(Error::from)
    }

    // Search

    fn search_courses(&self, filter: &SearchFilter) -> Result<Vec<Course>> {
        let conn = self.conn();
        let (sql, values) = build_sql(filter);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), map_course)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Tag catalog

    fn save_course_tags(
        &self,
        course_id: i64,
        dimension: Dimension,
        values: &TagValues,
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tags::save(&tx, course_id, dimension, values)?;
        tx.commit()?;
        Ok(())
    }

    fn delete_tag_option(&self, dimension: Dimension, option_id: i64) -> Result<bool> {
        tags::delete_option(&self.conn(), dimension, option_id)
    }

    fn course_tag_options(&self, course_id: i64, dimension: Dimension) -> Result<Vec<TagOption>> {
        tags::options_for_course(&self.conn(), course_id, dimension)
    }

    fn list_dimension_options(&self, dimension: Dimension) -> Result<Vec<TagOption>> {
        tags::dimension_options(&self.conn(), dimension)
    }

    fn seed_tag_defaults(&self) -> Result<()> {
        tags::seed_defaults(&self.conn())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
    }

    fn test_site(store: &SqliteStore) -> Site {
        store
            .create_site(&SiteRecord {
                url: "https://school.example".to_string(),
                name: "Example School".to_string(),
                description: None,
                contact_name: None,
                contact_email: None,
                language: Some("de".to_string()),
                country: Some("DE".to_string()),
                privacy: SitePrivacy::Public,
                max_publications_per_day: None,
                deleted: false,
            })
            .unwrap()
    }

    fn submission(site_course_id: i64, shortname: &str) -> CourseSubmission {
        CourseSubmission {
            site_course_id,
            fullname: format!("Course {shortname}"),
            shortname: shortname.to_string(),
            downloadable: true,
            ..CourseSubmission::default()
        }
    }

    #[test]
    fn test_register_course_upsert_by_origin() {
        let store = test_store();
        let site = test_site(&store);

        let (first, inserted) = store
            .register_course(site.id, &submission(7, "algebra"), 10)
            .unwrap();
        assert!(inserted);

        let mut update = submission(7, "algebra");
        update.fullname = "Algebra II".to_string();
        let (second, inserted) = store.register_course(site.id, &update, 10).unwrap();
        assert!(!inserted);
        assert_eq!(second.id, first.id);
        assert_eq!(second.fullname, "Algebra II");
        assert_eq!(store.list_site_courses(site.id).unwrap().len(), 1);
    }

    #[test]
    fn test_register_course_quota() {
        let store = test_store();
        let site = test_site(&store);

        store.register_course(site.id, &submission(1, "a"), 2).unwrap();
        store.register_course(site.id, &submission(2, "b"), 2).unwrap();

        let result = store.register_course(site.id, &submission(3, "c"), 2);
        assert!(matches!(result, Err(Error::QuotaExceeded)));
        assert_eq!(store.list_site_courses(site.id).unwrap().len(), 2);

        // Updating an existing entry is not a new publication.
        let (_, inserted) = store.register_course(site.id, &submission(1, "a"), 2).unwrap();
        assert!(!inserted);
    }

    #[test]
    fn test_shortname_collision_probe() {
        let store = test_store();
        let site = test_site(&store);

        let (a, _) = store.register_course(site.id, &submission(1, "maths"), 10).unwrap();
        let (b, _) = store.register_course(site.id, &submission(2, "maths"), 10).unwrap();
        let (c, _) = store.register_course(site.id, &submission(3, "maths"), 10).unwrap();
        let (d, _) = store.register_course(site.id, &submission(4, "maths"), 10).unwrap();

        assert_eq!(a.shortname, "maths");
        assert_eq!(b.shortname, "maths_");
        assert_eq!(c.shortname, "maths_1");
        assert_eq!(d.shortname, "maths_2");
    }

    #[test]
    fn test_register_course_atomic_on_tag_failure() {
        let store = test_store();
        let site = test_site(&store);

        let mut bad = submission(1, "broken");
        bad.subjects = vec![999_999];
        let result = store.register_course(site.id, &bad, 10);
        assert!(matches!(result, Err(Error::Validation(_))));

        // The whole item rolled back: no course row, no partial tags.
        assert!(store.list_site_courses(site.id).unwrap().is_empty());
    }

    #[test]
    fn test_deactivate_site_hides_courses_but_keeps_rows() {
        let store = test_store();
        let site = test_site(&store);

        let (course, _) = store.register_course(site.id, &submission(1, "a"), 10).unwrap();

        assert!(store.deactivate_site(site.id).unwrap());

        let reloaded = store.get_site(site.id).unwrap().unwrap();
        assert!(reloaded.deleted);

        // The entry row survives the deactivation and stays reachable by id,
        // but public search no longer returns it.
        assert!(store.get_course(course.id).unwrap().is_some());

        let filter = SearchFilter {
            limit: 50,
            ..SearchFilter::default()
        };
        assert!(store.search_courses(&filter).unwrap().is_empty());

        let revealed = SearchFilter {
            include_hidden: true,
            limit: 50,
            ..SearchFilter::default()
        };
        assert_eq!(store.search_courses(&revealed).unwrap().len(), 1);
    }

    #[test]
    fn test_site_url_unique() {
        let store = test_store();
        test_site(&store);

        let result = store.create_site(&SiteRecord {
            url: "https://school.example".to_string(),
            name: "Duplicate".to_string(),
            description: None,
            contact_name: None,
            contact_email: None,
            language: None,
            country: None,
            privacy: SitePrivacy::Public,
            max_publications_per_day: None,
            deleted: false,
        });
        assert!(result.is_err());
    }
}
