//! Pull-based synchronization with an upstream hub. The upstream exposes its
//! full site register; we fetch it and merge it into the local one.

use serde::Deserialize;

use crate::directory::{Directory, ReconcileSummary};
use crate::error::{Error, Result};
use crate::types::{Site, SiteRecord};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    error: Option<String>,
}

pub struct UpstreamClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetches the upstream site register, deleted registrations included.
    pub async fn fetch_sites_register(&self) -> Result<Vec<SiteRecord>> {
        let url = format!("{}/api/v1/hub/admin/sites", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(Error::AuthenticationFailure);
        }
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "upstream returned {status} for {url}"
            )));
        }

        let envelope: Envelope<Vec<Site>> = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("invalid register payload: {e}")))?;

        match envelope.data {
            Some(sites) => Ok(sites.into_iter().map(SiteRecord::from).collect()),
            None => Err(Error::Upstream(
                envelope
                    .error
                    .unwrap_or_else(|| "empty register payload".to_string()),
            )),
        }
    }
}

/// Drives one synchronization round against the configured upstream.
pub struct SyncController {
    client: UpstreamClient,
}

impl SyncController {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub async fn run(&self, directory: &Directory) -> Result<ReconcileSummary> {
        let records = self.client.fetch_sites_register().await?;
        tracing::info!(records = records.len(), "fetched upstream site register");
        directory.reconcile_sites(&records)
    }
}
