//! Connection settings for the Rancher management server

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{RancherError, Result};

/// Timeout applied to chart index downloads
pub const DEFAULT_INDEX_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout applied to management API calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Path segment of the v3 management API
const MANAGEMENT_API_SEGMENT: &str = "/v3";

/// Steve API collection serving ClusterRepo objects
const CLUSTER_REPO_COLLECTION: &str = "/v1/catalog.cattle.io.clusterrepos";

/// Settings for one Rancher installation
#[derive(Clone)]
pub struct RancherConfig {
    /// Management API base, e.g. `https://rancher.example.com/v3`
    pub url: String,

    /// Bearer token
    pub token: String,

    /// Verify the server certificate (off by default, Rancher often runs self-signed)
    pub verify_tls: bool,

    pub index_timeout: Duration,

    /// Clusters scanned at the same time
    pub concurrency: usize,
}

impl RancherConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            verify_tls: false,
            index_timeout: DEFAULT_INDEX_TIMEOUT,
            concurrency: 1,
        }
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Reject settings that cannot work before any request is sent
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(RancherError::InvalidConfig(
                "RANCHER_URL is required".to_string(),
            ));
        }
        if self.token.trim().is_empty() {
            return Err(RancherError::InvalidConfig(
                "RANCHER_TOKEN is required".to_string(),
            ));
        }
        if self.concurrency == 0 {
            return Err(RancherError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.index_timeout.is_zero() {
            return Err(RancherError::InvalidConfig(
                "index timeout must be greater than zero".to_string(),
            ));
        }

        let parsed = Url::parse(&self.url)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RancherError::InvalidConfig(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }

        Ok(())
    }

    /// Join a path onto the management API base
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// URL serving the index of a ClusterRepo.
    ///
    /// The repo collection lives on the Steve API next to `/v3`, so the first
    /// `/v3` in the configured URL is swapped for the collection path.
    pub fn cluster_repo_index_url(&self, repo: &str) -> String {
        let base = self
            .url
            .replacen(MANAGEMENT_API_SEGMENT, CLUSTER_REPO_COLLECTION, 1);
        format!("{}/{}?link=index", base.trim_end_matches('/'), repo)
    }
}

impl fmt::Debug for RancherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RancherConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("verify_tls", &self.verify_tls)
            .field("index_timeout", &self.index_timeout)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
