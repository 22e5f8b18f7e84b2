//! Lifecycle notifications emitted by the directory.
//!
//! Consumers plug in by implementing [`Notifier`]; the default sink writes
//! structured log events. Handlers must be cheap, they run inline on the
//! request path.

use crate::types::{Course, Site};

pub trait Notifier: Send + Sync {
    /// A site finished uploading a course backup.
    fn backup_uploaded(&self, site: &Site, course: &Course);

    /// Restoring a backup into a demo course failed.
    fn restore_error_occurred(&self, detail: &str);

    /// A demo course was materialized for a directory entry.
    fn course_restore_completed(&self, course_id: i64, entry_id: i64);
}

/// Default sink: tracing events, one per notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn backup_uploaded(&self, site: &Site, course: &Course) {
        tracing::info!(
            site_id = site.id,
            site_url = %site.url,
            course_id = course.id,
            shortname = %course.shortname,
            "backup uploaded"
        );
    }

    fn restore_error_occurred(&self, detail: &str) {
        tracing::error!(detail, "demo course restore failed");
    }

    fn course_restore_completed(&self, course_id: i64, entry_id: i64) {
        tracing::info!(course_id, entry_id, "demo course restore completed");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records notifications for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub events: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn backup_uploaded(&self, site: &Site, course: &Course) {
            self.events
                .lock()
                .unwrap()
                .push(format!("backup_uploaded:{}:{}", site.id, course.id));
        }

        fn restore_error_occurred(&self, detail: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("restore_error:{detail}"));
        }

        fn course_restore_completed(&self, course_id: i64, entry_id: i64) {
            self.events
                .lock()
                .unwrap()
                .push(format!("restore_completed:{course_id}:{entry_id}"));
        }
    }
}
