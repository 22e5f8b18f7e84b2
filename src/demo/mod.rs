//! Demo course provisioning. When a directory entry carries an uploaded
//! backup, the hub can materialize a local browsable copy of the course and
//! link it from the entry.

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::store::Store;

/// A materialized demo instance.
#[derive(Debug, Clone)]
pub struct DemoCourse {
    pub id: i64,
    pub url: String,
}

/// Restores a backup file into a live demo course. The hub itself has no
/// course engine; deployments plug one in behind this trait.
pub trait CourseRestorer: Send + Sync {
    fn restore(&self, backup: &Path, shortname: &str) -> anyhow::Result<DemoCourse>;
}

/// Provisions a demo course for a directory entry from its stored backup.
/// The entry gains the demo mapping and is unhidden once the restore
/// succeeds.
pub fn provision_demo_course(
    store: &Arc<dyn Store>,
    notifier: &Arc<dyn Notifier>,
    restorer: &Arc<dyn CourseRestorer>,
    backup_dir: &Path,
    entry_id: i64,
) -> Result<DemoCourse> {
    let course = store.get_course(entry_id)?.ok_or(Error::NotFound)?;

    let relative = match course.backup_path.as_deref() {
        Some(path) => path,
        None => {
            notifier.restore_error_occurred(&format!("entry {entry_id} has no uploaded backup"));
            return Err(Error::Restore(format!(
                "entry {entry_id} has no uploaded backup"
            )));
        }
    };

    let backup = backup_dir.join(relative);
    if !backup.exists() {
        notifier.restore_error_occurred(&format!(
            "backup file missing for entry {entry_id}: {}",
            backup.display()
        ));
        return Err(Error::Restore(format!(
            "backup file missing for entry {entry_id}"
        )));
    }

    let demo = match restorer.restore(&backup, &course.shortname) {
        Ok(demo) => demo,
        Err(e) => {
            notifier.restore_error_occurred(&format!("restore failed for entry {entry_id}: {e}"));
            return Err(Error::Restore(e.to_string()));
        }
    };

    store.set_course_demo(entry_id, demo.id, &demo.url)?;
    if course.hidden {
        store.toggle_course_visibility(entry_id)?;
    }

    notifier.course_restore_completed(demo.id, entry_id);
    Ok(demo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::testing::RecordingNotifier;
    use crate::store::SqliteStore;
    use crate::types::{CourseSubmission, SitePrivacy, SiteRecord};

    struct StubRestorer {
        fail: bool,
    }

    impl CourseRestorer for StubRestorer {
        fn restore(&self, _backup: &Path, shortname: &str) -> anyhow::Result<DemoCourse> {
            if self.fail {
                anyhow::bail!("engine unavailable");
            }
            Ok(DemoCourse {
                id: 77,
                url: format!("https://hub.example/demo/{shortname}"),
            })
        }
    }

    fn setup(hidden: bool) -> (Arc<dyn Store>, Arc<RecordingNotifier>, i64, tempfile::TempDir) {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let store: Arc<dyn Store> = Arc::new(store);

        let site = store
            .create_site(&SiteRecord {
                url: "https://a.example".to_string(),
                name: "A".to_string(),
                description: None,
                contact_name: None,
                contact_email: None,
                language: None,
                country: None,
                privacy: SitePrivacy::Public,
                max_publications_per_day: None,
                deleted: false,
            })
            .unwrap();

        let (course, _) = store
            .register_course(
                site.id,
                &CourseSubmission {
                    site_course_id: 1,
                    fullname: "Algebra".to_string(),
                    shortname: "algebra".to_string(),
                    hidden,
                    ..CourseSubmission::default()
                },
                10,
            )
            .unwrap();

        let backup_dir = tempfile::tempdir().unwrap();
        let backup_file = backup_dir
            .path()
            .join(format!("{}/{}.mbz", site.id, course.id));
        std::fs::create_dir_all(backup_file.parent().unwrap()).unwrap();
        std::fs::write(&backup_file, b"mbz").unwrap();
        store
            .set_course_backup(course.id, &format!("{}/{}.mbz", site.id, course.id))
            .unwrap();

        (store, Arc::new(RecordingNotifier::default()), course.id, backup_dir)
    }

    #[test]
    fn test_provision_links_demo_and_unhides() {
        let (store, notifier, entry_id, backup_dir) = setup(true);
        let restorer: Arc<dyn CourseRestorer> = Arc::new(StubRestorer { fail: false });
        let notifier_dyn: Arc<dyn Notifier> = notifier.clone();

        let demo =
            provision_demo_course(&store, &notifier_dyn, &restorer, backup_dir.path(), entry_id)
                .unwrap();
        assert_eq!(demo.id, 77);

        let course = store.get_course(entry_id).unwrap().unwrap();
        assert_eq!(course.demo_course_id, Some(77));
        assert!(course.demo_course_url.unwrap().contains("algebra"));
        assert!(!course.hidden);

        let events = notifier.events.lock().unwrap();
        assert!(events.iter().any(|e| e.starts_with("restore_completed:77:")));
    }

    #[test]
    fn test_provision_restore_failure_notifies() {
        let (store, notifier, entry_id, backup_dir) = setup(false);
        let restorer: Arc<dyn CourseRestorer> = Arc::new(StubRestorer { fail: true });
        let notifier_dyn: Arc<dyn Notifier> = notifier.clone();

        let result =
            provision_demo_course(&store, &notifier_dyn, &restorer, backup_dir.path(), entry_id);
        assert!(matches!(result, Err(Error::Restore(_))));

        let course = store.get_course(entry_id).unwrap().unwrap();
        assert_eq!(course.demo_course_id, None);

        let events = notifier.events.lock().unwrap();
        assert!(events.iter().any(|e| e.starts_with("restore_error:")));
    }

    #[test]
    fn test_provision_missing_backup_file_is_an_error() {
        let (store, notifier, entry_id, backup_dir) = setup(false);
        let missing = backup_dir.path().join("nope");
        let restorer: Arc<dyn CourseRestorer> = Arc::new(StubRestorer { fail: false });
        let notifier_dyn: Arc<dyn Notifier> = notifier.clone();

        let result = provision_demo_course(&store, &notifier_dyn, &restorer, &missing, entry_id);
        assert!(matches!(result, Err(Error::Restore(_))));
    }
}
