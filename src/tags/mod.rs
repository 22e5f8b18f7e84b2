//! Tag catalog persistence.
//!
//! Tags are stored in two tables: every admissible value lives in
//! `tag_options`, and the links between courses and values live in
//! `tag_assignments`. Fixed-option and free-form dimensions share this
//! model; they differ only in who owns the option rows. Everything here
//! operates on a plain connection so the store can run a whole course
//! registration, tags included, inside one transaction.

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Error, Result};
use crate::types::{Dimension, DimensionKind, TagOption};

/// Submitted values for one dimension: option ids for fixed dimensions,
/// raw text for free-form ones.
#[derive(Debug, Clone)]
pub enum TagValues {
    OptionIds(Vec<i64>),
    Text(Vec<String>),
}

/// Replaces a course's assignments for one dimension with the submitted
/// values.
///
/// Fixed dimensions diff the old and new option-id sets and touch only
/// assignment rows. Free-form dimensions drop the old assignments together
/// with any now-orphaned options, then re-create options from the text,
/// reusing an existing value case-insensitively instead of inserting a
/// duplicate.
pub fn save(
    conn: &Connection,
    course_id: i64,
    dimension: Dimension,
    values: &TagValues,
) -> Result<()> {
    match (dimension.kind(), values) {
        (DimensionKind::FixedOption, TagValues::OptionIds(ids)) => {
            save_fixed(conn, course_id, dimension, ids)
        }
        (DimensionKind::FreeForm, TagValues::Text(texts)) => {
            save_free_form(conn, course_id, dimension, texts)
        }
        _ => Err(Error::Validation(format!(
            "dimension '{}' does not accept the submitted value kind",
            dimension.name()
        ))),
    }
}

fn save_fixed(conn: &Connection, course_id: i64, dimension: Dimension, ids: &[i64]) -> Result<()> {
    let existing: Vec<i64> = assigned_option_ids(conn, course_id, dimension)?;

    for id in &existing {
        if !ids.contains(id) {
            conn.execute(
                "DELETE FROM tag_assignments WHERE course_id = ?1 AND option_id = ?2",
                params![course_id, id],
            )?;
        }
    }

    for id in ids {
        let valid: Option<i64> = conn
            .query_row(
                "SELECT id FROM tag_options WHERE id = ?1 AND dimension = ?2",
                params![id, dimension.name()],
                |row| row.get(0),
            )
            .optional()?;
        if valid.is_none() {
            return Err(Error::Validation(format!(
                "unknown {} option id {id}",
                dimension.name()
            )));
        }

        if !existing.contains(id) {
            conn.execute(
                "INSERT OR IGNORE INTO tag_assignments (course_id, option_id) VALUES (?1, ?2)",
                params![course_id, id],
            )?;
        }
    }

    Ok(())
}

fn save_free_form(
    conn: &Connection,
    course_id: i64,
    dimension: Dimension,
    texts: &[String],
) -> Result<()> {
    clear_dimension(conn, course_id, dimension)?;

    let mut values: Vec<&str> = Vec::new();
    for text in texts {
        if dimension.multi_valued() {
            values.extend(text.split(','));
        } else {
            values.push(text);
        }
    }

    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM tag_options WHERE dimension = ?1 AND lower(value) = lower(?2)",
                params![dimension.name(), value],
                |row| row.get(0),
            )
            .optional()?;

        let option_id = match existing {
            Some(id) => id,
            None => {
                conn.execute(
                    "INSERT INTO tag_options (dimension, value) VALUES (?1, ?2)",
                    params![dimension.name(), value],
                )?;
                conn.last_insert_rowid()
            }
        };

        conn.execute(
            "INSERT OR IGNORE INTO tag_assignments (course_id, option_id) VALUES (?1, ?2)",
            params![course_id, option_id],
        )?;
    }

    Ok(())
}

/// Option ids currently assigned to a course for one dimension.
fn assigned_option_ids(
    conn: &Connection,
    course_id: i64,
    dimension: Dimension,
) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT opt.id
         FROM tag_options opt
         JOIN tag_assignments ta ON ta.option_id = opt.id
         WHERE ta.course_id = ?1 AND opt.dimension = ?2",
    )?;
    let rows = stmt.query_map(params![course_id, dimension.name()], |row| row.get(0))?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Removes one dimension's assignments from a course and garbage-collects
/// free-form options that no other course references anymore.
fn clear_dimension(conn: &Connection, course_id: i64, dimension: Dimension) -> Result<()> {
    let option_ids = assigned_option_ids(conn, course_id, dimension)?;

    for option_id in option_ids {
        conn.execute(
            "DELETE FROM tag_assignments WHERE course_id = ?1 AND option_id = ?2",
            params![course_id, option_id],
        )?;
        delete_option(conn, dimension, option_id)?;
    }

    Ok(())
}

/// Deletes a free-form option if no assignment references it anymore.
/// Fixed options are multiply referenced and protected: this is a no-op.
pub fn delete_option(conn: &Connection, dimension: Dimension, option_id: i64) -> Result<bool> {
    if dimension.kind() == DimensionKind::FixedOption {
        return Ok(false);
    }

    let referenced: Option<i64> = conn
        .query_row(
            "SELECT course_id FROM tag_assignments WHERE option_id = ?1 LIMIT 1",
            params![option_id],
            |row| row.get(0),
        )
        .optional()?;

    if referenced.is_some() {
        return Ok(false);
    }

    let rows = conn.execute(
        "DELETE FROM tag_options WHERE id = ?1 AND dimension = ?2",
        params![option_id, dimension.name()],
    )?;
    Ok(rows > 0)
}

/// Removes every assignment of a course across all dimensions, deleting
/// exclusively-owned free-form options along the way. Used when a directory
/// entry is unregistered.
pub fn delete_course_tags(conn: &Connection, course_id: i64) -> Result<()> {
    for dimension in Dimension::ALL {
        clear_dimension(conn, course_id, dimension)?;
    }
    Ok(())
}

/// Options assigned to a course for one dimension, most recent first.
pub fn options_for_course(
    conn: &Connection,
    course_id: i64,
    dimension: Dimension,
) -> Result<Vec<TagOption>> {
    let mut stmt = conn.prepare(
        "SELECT opt.id, opt.value
         FROM tag_options opt
         JOIN tag_assignments ta ON ta.option_id = opt.id
         WHERE ta.course_id = ?1 AND opt.dimension = ?2
         ORDER BY opt.id DESC",
    )?;

    let rows = stmt.query_map(params![course_id, dimension.name()], |row| {
        Ok(TagOption {
            id: row.get(0)?,
            dimension,
            value: row.get(1)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// The most recently assigned value for one dimension of a course.
pub fn most_recent_value(
    conn: &Connection,
    course_id: i64,
    dimension: Dimension,
) -> Result<Option<String>> {
    let options = options_for_course(conn, course_id, dimension)?;
    Ok(options.into_iter().next().map(|o| o.value))
}

/// All stored options of one dimension, ordered by value.
pub fn dimension_options(conn: &Connection, dimension: Dimension) -> Result<Vec<TagOption>> {
    let mut stmt =
        conn.prepare("SELECT id, value FROM tag_options WHERE dimension = ?1 ORDER BY value")?;

    let rows = stmt.query_map(params![dimension.name()], |row| {
        Ok(TagOption {
            id: row.get(0)?,
            dimension,
            value: row.get(1)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Inserts the default options of every fixed dimension. Idempotent:
/// values already present (compared by string) are left alone, so this is
/// safe to run on every install or upgrade.
pub fn seed_defaults(conn: &Connection) -> Result<()> {
    for dimension in Dimension::ALL {
        for value in dimension.seed_values() {
            let exists: Option<i64> = conn
                .query_row(
                    "SELECT id FROM tag_options WHERE dimension = ?1 AND value = ?2",
                    params![dimension.name(), value],
                    |row| row.get(0),
                )
                .optional()?;

            if exists.is_none() {
                conn.execute(
                    "INSERT INTO tag_options (dimension, value) VALUES (?1, ?2)",
                    params![dimension.name(), value],
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SCHEMA;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        seed_defaults(&conn).unwrap();
        conn
    }

    fn insert_course(conn: &Connection, shortname: &str) -> i64 {
        conn.execute(
            "INSERT INTO sites (url, name) VALUES ('https://school.example', 'School')
             ON CONFLICT(url) DO NOTHING",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO courses (site_id, site_course_id, shortname, fullname)
             VALUES (1, (SELECT COALESCE(MAX(site_course_id), 0) + 1 FROM courses), ?1, ?1)",
            params![shortname],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn option_id(conn: &Connection, dimension: Dimension, value: &str) -> i64 {
        conn.query_row(
            "SELECT id FROM tag_options WHERE dimension = ?1 AND value = ?2",
            params![dimension.name(), value],
            |row| row.get(0),
        )
        .unwrap()
    }

    fn count_options(conn: &Connection, dimension: Dimension) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM tag_options WHERE dimension = ?1",
            params![dimension.name()],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_seed_defaults_idempotent() {
        let conn = test_conn();
        let before = count_options(&conn, Dimension::SchoolType);
        seed_defaults(&conn).unwrap();
        assert_eq!(count_options(&conn, Dimension::SchoolType), before);
    }

    #[test]
    fn test_fixed_save_diffs_assignments() {
        let conn = test_conn();
        let course = insert_course(&conn, "c1");
        let math = option_id(&conn, Dimension::Subject, "Mathematik");
        let physics = option_id(&conn, Dimension::Subject, "Physik");
        let biology = option_id(&conn, Dimension::Subject, "Biologie");

        save(
            &conn,
            course,
            Dimension::Subject,
            &TagValues::OptionIds(vec![math, physics]),
        )
        .unwrap();
        let before = count_options(&conn, Dimension::Subject);

        save(
            &conn,
            course,
            Dimension::Subject,
            &TagValues::OptionIds(vec![physics, biology]),
        )
        .unwrap();

        let assigned = options_for_course(&conn, course, Dimension::Subject).unwrap();
        let mut ids: Vec<i64> = assigned.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        let mut expected = vec![physics, biology];
        expected.sort_unstable();
        assert_eq!(ids, expected);

        // Option rows are never touched for fixed dimensions.
        assert_eq!(count_options(&conn, Dimension::Subject), before);
    }

    #[test]
    fn test_fixed_save_rejects_unknown_option() {
        let conn = test_conn();
        let course = insert_course(&conn, "c1");

        let result = save(
            &conn,
            course,
            Dimension::Subject,
            &TagValues::OptionIds(vec![999_999]),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_free_form_dedup_case_insensitive() {
        let conn = test_conn();
        let course_a = insert_course(&conn, "a");
        let course_b = insert_course(&conn, "b");

        save(
            &conn,
            course_a,
            Dimension::Tags,
            &TagValues::Text(vec!["Math".to_string()]),
        )
        .unwrap();

        save(
            &conn,
            course_b,
            Dimension::Tags,
            &TagValues::Text(vec!["math, Math , physics".to_string()]),
        )
        .unwrap();

        assert_eq!(count_options(&conn, Dimension::Tags), 2);
        let assigned = options_for_course(&conn, course_b, Dimension::Tags).unwrap();
        assert_eq!(assigned.len(), 2);
    }

    #[test]
    fn test_free_form_empty_values_dropped() {
        let conn = test_conn();
        let course = insert_course(&conn, "c1");

        save(
            &conn,
            course,
            Dimension::Tags,
            &TagValues::Text(vec!["alpha, , beta,,  ".to_string()]),
        )
        .unwrap();

        let assigned = options_for_course(&conn, course, Dimension::Tags).unwrap();
        let mut values: Vec<String> = assigned.into_iter().map(|o| o.value).collect();
        values.sort();
        assert_eq!(values, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_single_valued_dimension_keeps_commas() {
        let conn = test_conn();
        let course = insert_course(&conn, "c1");

        save(
            &conn,
            course,
            Dimension::Description,
            &TagValues::Text(vec!["Numbers, fractions, and decimals".to_string()]),
        )
        .unwrap();

        let assigned = options_for_course(&conn, course, Dimension::Description).unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].value, "Numbers, fractions, and decimals");
    }

    #[test]
    fn test_delete_option_protected_for_fixed() {
        let conn = test_conn();
        let math = option_id(&conn, Dimension::Subject, "Mathematik");

        assert!(!delete_option(&conn, Dimension::Subject, math).unwrap());
        assert_eq!(option_id(&conn, Dimension::Subject, "Mathematik"), math);
    }

    #[test]
    fn test_delete_option_reference_counted() {
        let conn = test_conn();
        let course_a = insert_course(&conn, "a");
        let course_b = insert_course(&conn, "b");

        save(
            &conn,
            course_a,
            Dimension::Tags,
            &TagValues::Text(vec!["shared".to_string()]),
        )
        .unwrap();
        save(
            &conn,
            course_b,
            Dimension::Tags,
            &TagValues::Text(vec!["shared".to_string()]),
        )
        .unwrap();

        let shared = option_id(&conn, Dimension::Tags, "shared");
        assert!(!delete_option(&conn, Dimension::Tags, shared).unwrap());

        conn.execute(
            "DELETE FROM tag_assignments WHERE option_id = ?1",
            params![shared],
        )
        .unwrap();
        assert!(delete_option(&conn, Dimension::Tags, shared).unwrap());
    }

    #[test]
    fn test_delete_course_tags_keeps_shared_and_fixed_options() {
        let conn = test_conn();
        let course_a = insert_course(&conn, "a");
        let course_b = insert_course(&conn, "b");
        let math = option_id(&conn, Dimension::Subject, "Mathematik");

        save(
            &conn,
            course_a,
            Dimension::Subject,
            &TagValues::OptionIds(vec![math]),
        )
        .unwrap();
        save(
            &conn,
            course_a,
            Dimension::Tags,
            &TagValues::Text(vec!["solo, shared".to_string()]),
        )
        .unwrap();
        save(
            &conn,
            course_b,
            Dimension::Tags,
            &TagValues::Text(vec!["shared".to_string()]),
        )
        .unwrap();

        delete_course_tags(&conn, course_a).unwrap();

        assert!(options_for_course(&conn, course_a, Dimension::Subject)
            .unwrap()
            .is_empty());
        assert!(options_for_course(&conn, course_a, Dimension::Tags)
            .unwrap()
            .is_empty());

        // Fixed option survives, shared free option survives, exclusive one is gone.
        assert_eq!(option_id(&conn, Dimension::Subject, "Mathematik"), math);
        assert_eq!(count_options(&conn, Dimension::Tags), 1);
        assert_eq!(
            options_for_course(&conn, course_b, Dimension::Tags).unwrap()[0].value,
            "shared"
        );
    }

    #[test]
    fn test_options_for_course_most_recent_first() {
        let conn = test_conn();
        let course = insert_course(&conn, "c1");

        save(
            &conn,
            course,
            Dimension::CourseName,
            &TagValues::Text(vec!["First name".to_string()]),
        )
        .unwrap();
        save(
            &conn,
            course,
            Dimension::Tags,
            &TagValues::Text(vec!["early".to_string()]),
        )
        .unwrap();
        save(
            &conn,
            course,
            Dimension::Tags,
            &TagValues::Text(vec!["early, late".to_string()]),
        )
        .unwrap();

        let options = options_for_course(&conn, course, Dimension::Tags).unwrap();
        assert!(options[0].id > options[1].id);
        assert_eq!(
            most_recent_value(&conn, course, Dimension::Tags).unwrap(),
            Some(options[0].value.clone())
        );
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let conn = test_conn();
        let course = insert_course(&conn, "c1");

        let result = save(
            &conn,
            course,
            Dimension::Subject,
            &TagValues::Text(vec!["Mathematik".to_string()]),
        );
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = save(
            &conn,
            course,
            Dimension::Tags,
            &TagValues::OptionIds(vec![1]),
        );
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
