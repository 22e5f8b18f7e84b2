//! The registry itself: site registration, course publication and the
//! upstream register merge. All policy lives here; the store only persists.

use std::sync::Arc;

use serde::Serialize;

use crate::auth::TokenGenerator;
use crate::config::HubConfig;
use crate::error::{Error, Result};
use crate::notify::Notifier;
use crate::store::Store;
use crate::types::*;

/// Per-item outcome of a publication batch. One bad item never fails the
/// batch; the caller gets a status per submitted course.
#[derive(Debug, Clone, Serialize)]
pub struct CourseItemOutcome {
    pub site_course_id: i64,
    pub status: RegistrationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Updated,
    Rejected,
}

/// What a register merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub inserted: u64,
    pub updated: u64,
    pub deactivated: u64,
}

pub struct Directory {
    store: Arc<dyn Store>,
    config: HubConfig,
    notifier: Arc<dyn Notifier>,
    tokens: TokenGenerator,
}

impl Directory {
    pub fn new(store: Arc<dyn Store>, config: HubConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            config,
            notifier,
            tokens: TokenGenerator::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Registers a site, keyed by URL. Re-registering an active site updates
    /// its metadata and keeps the existing credential; re-registering a
    /// deactivated site reactivates it under a fresh credential. The raw
    /// token is returned exactly once, when one is issued.
    pub fn register_site(&self, record: &SiteRecord) -> Result<(Site, Option<String>)> {
        validate_site_record(record)?;

        match self.store.get_site_by_url(&record.url)? {
            None => {
                let site = self.store.create_site(record)?;
                let raw = self.issue_site_token(site.id)?;
                tracing::info!(site_id = site.id, url = %site.url, "site registered");
                Ok((site, Some(raw)))
            }
            Some(mut site) => {
                let reactivated = site.deleted;
                apply_record(&mut site, record);
                site.deleted = false;
                self.store.update_site(&site)?;

                let raw = if reactivated || !self.store.site_has_token(site.id)? {
                    // Rotation: the old credential dies with the old
                    // registration.
                    self.store.delete_site_tokens(site.id)?;
                    Some(self.issue_site_token(site.id)?)
                } else {
                    None
                };

                if reactivated {
                    tracing::info!(site_id = site.id, url = %site.url, "site reactivated");
                }
                Ok((site, raw))
            }
        }
    }

    /// Updates the metadata of an already registered site.
    pub fn update_site_info(&self, site: &Site, record: &SiteRecord) -> Result<Site> {
        validate_site_record(record)?;

        let mut updated = site.clone();
        apply_record(&mut updated, record);
        self.store.update_site(&updated)?;
        Ok(updated)
    }

    /// Unregisters a site: the registration is soft-deleted and its tokens
    /// revoked. Published entries keep their rows but leave public search
    /// with the site.
    pub fn unregister_site(&self, site_id: i64) -> Result<()> {
        if !self.store.deactivate_site(site_id)? {
            return Err(Error::NotFound);
        }
        self.store.delete_site_tokens(site_id)?;
        tracing::info!(site_id, "site unregistered");
        Ok(())
    }

    /// Publishes a batch of courses for a site. Items are processed
    /// independently; each outcome reports registered, updated or rejected.
    pub fn register_courses(
        &self,
        site: &Site,
        submissions: &[CourseSubmission],
    ) -> Result<Vec<CourseItemOutcome>> {
        let max_per_day = self.quota_for(site);
        let mut outcomes = Vec::with_capacity(submissions.len());

        for submission in submissions {
            let outcome = match validate_submission(submission)
                .and_then(|()| self.store.register_course(site.id, submission, max_per_day))
            {
                Ok((course, inserted)) => CourseItemOutcome {
                    site_course_id: submission.site_course_id,
                    status: if inserted {
                        RegistrationStatus::Registered
                    } else {
                        RegistrationStatus::Updated
                    },
                    id: Some(course.id),
                    reason: None,
                },
                Err(e) => {
                    tracing::warn!(
                        site_id = site.id,
                        site_course_id = submission.site_course_id,
                        error = %e,
                        "course registration rejected"
                    );
                    CourseItemOutcome {
                        site_course_id: submission.site_course_id,
                        status: RegistrationStatus::Rejected,
                        id: None,
                        reason: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Withdraws directory entries by their hub ids. Entries owned by other
    /// sites and unknown ids are rejected per item, never across the batch.
    pub fn unregister_courses(
        &self,
        site: &Site,
        entry_ids: &[i64],
    ) -> Result<Vec<CourseItemOutcome>> {
        let mut outcomes = Vec::with_capacity(entry_ids.len());

        for &id in entry_ids {
            let outcome = match self.store.get_course(id)? {
                Some(course) if course.site_id == site.id => {
                    self.store.delete_course(id)?;
                    CourseItemOutcome {
                        site_course_id: course.site_course_id,
                        status: RegistrationStatus::Updated,
                        id: Some(id),
                        reason: None,
                    }
                }
                Some(_) => CourseItemOutcome {
                    site_course_id: 0,
                    status: RegistrationStatus::Rejected,
                    id: Some(id),
                    reason: Some("entry belongs to another site".to_string()),
                },
                None => CourseItemOutcome {
                    site_course_id: 0,
                    status: RegistrationStatus::Rejected,
                    id: Some(id),
                    reason: Some("no such entry".to_string()),
                },
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Flips the hidden flag of an entry. Returns the new hidden state.
    pub fn toggle_visibility(&self, entry_id: i64) -> Result<bool> {
        self.store.toggle_course_visibility(entry_id)
    }

    /// Records an uploaded backup against an entry owned by `site`.
    pub fn attach_backup(&self, site: &Site, entry_id: i64, path: &str) -> Result<Course> {
        let course = self
            .store
            .get_course(entry_id)?
            .ok_or(Error::NotFound)?;
        if course.site_id != site.id {
            return Err(Error::AuthorizationFailure);
        }

        self.store.set_course_backup(entry_id, path)?;
        let course = self
            .store
            .get_course(entry_id)?
            .ok_or(Error::NotFound)?;

        self.notifier.backup_uploaded(site, &course);
        Ok(course)
    }

    /// Records a screenshot upload and returns the new count.
    pub fn attach_screenshot(&self, site: &Site, entry_id: i64) -> Result<i64> {
        let course = self
            .store
            .get_course(entry_id)?
            .ok_or(Error::NotFound)?;
        if course.site_id != site.id {
            return Err(Error::AuthorizationFailure);
        }
        self.store.increment_screenshot_count(entry_id)
    }

    /// The effective publication quota for a site.
    #[must_use]
    pub fn quota_for(&self, site: &Site) -> i64 {
        site.max_publications_per_day
            .unwrap_or(self.config.max_publications_per_day)
    }

    /// Full-replace merge of an upstream site register into the local one,
    /// keyed by URL. Locally absent records are inserted, present ones
    /// updated, and records flagged deleted upstream are deactivated here.
    /// Running the same batch twice is a no-op the second time.
    pub fn reconcile_sites(&self, records: &[SiteRecord]) -> Result<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();

        for record in records {
            if let Err(e) = validate_site_record(record) {
                tracing::warn!(url = %record.url, error = %e, "skipping invalid register record");
                continue;
            }

            match self.store.get_site_by_url(&record.url)? {
                None => {
                    if record.deleted {
                        // Never seen here and already gone upstream.
                        continue;
                    }
                    self.store.create_site(record)?;
                    summary.inserted += 1;
                }
                Some(mut site) => {
                    if record.deleted {
                        if !site.deleted {
                            self.store.deactivate_site(site.id)?;
                            self.store.delete_site_tokens(site.id)?;
                            summary.deactivated += 1;
                        }
                        continue;
                    }

                    let changed = site_differs(&site, record);
                    if changed || site.deleted {
                        apply_record(&mut site, record);
                        site.deleted = false;
                        self.store.update_site(&site)?;
                        summary.updated += 1;
                    }
                }
            }
        }

        tracing::info!(
            inserted = summary.inserted,
            updated = summary.updated,
            deactivated = summary.deactivated,
            "site register reconciled"
        );
        Ok(summary)
    }

    fn issue_site_token(&self, site_id: i64) -> Result<String> {
        let (raw, lookup, hash) = self.tokens.generate()?;
        self.store.create_token(&Token {
            id: uuid::Uuid::new_v4().to_string(),
            token_hash: hash,
            token_lookup: lookup,
            is_admin: false,
            site_id: Some(site_id),
            created_at: chrono::Utc::now(),
            expires_at: None,
            last_used_at: None,
        })?;
        Ok(raw)
    }
}

fn validate_site_record(record: &SiteRecord) -> Result<()> {
    if record.name.trim().is_empty() {
        return Err(Error::Validation("site name must not be empty".to_string()));
    }
    if !record.url.starts_with("http://") && !record.url.starts_with("https://") {
        return Err(Error::Validation(format!(
            "site url must be http(s): {}",
            record.url
        )));
    }
    Ok(())
}

fn validate_submission(submission: &CourseSubmission) -> Result<()> {
    if submission.site_course_id <= 0 {
        return Err(Error::Validation(
            "site_course_id must be positive".to_string(),
        ));
    }
    if submission.fullname.trim().is_empty() {
        return Err(Error::Validation("fullname must not be empty".to_string()));
    }
    if submission.shortname.trim().is_empty() {
        return Err(Error::Validation("shortname must not be empty".to_string()));
    }
    Ok(())
}

fn apply_record(site: &mut Site, record: &SiteRecord) {
    site.name = record.name.clone();
    site.description = record.description.clone();
    site.contact_name = record.contact_name.clone();
    site.contact_email = record.contact_email.clone();
    site.language = record.language.clone();
    site.country = record.country.clone();
    site.privacy = record.privacy;
    site.max_publications_per_day = record.max_publications_per_day;
}

fn site_differs(site: &Site, record: &SiteRecord) -> bool {
    site.name != record.name
        || site.description != record.description
        || site.contact_name != record.contact_name
        || site.contact_email != record.contact_email
        || site.language != record.language
        || site.country != record.country
        || site.privacy != record.privacy
        || site.max_publications_per_day != record.max_publications_per_day
}
