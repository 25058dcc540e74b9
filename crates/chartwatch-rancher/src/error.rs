//! Error types for chartwatch-rancher

use chartwatch_core::CoreError;
use thiserror::Error;

/// Result type for chartwatch-rancher operations
pub type Result<T> = std::result::Result<T, RancherError>;

/// Errors raised while talking to Rancher or to a downstream cluster
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RancherError {
    /// Kubernetes API error
    #[error("Kubernetes API error: {0}")]
    Api(#[from] kube::Error),

    /// Generated kubeconfig could not be turned into a client
    #[error("invalid kubeconfig for cluster '{cluster}': {message}")]
    Kubeconfig { cluster: String, message: String },

    /// Non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Token rejected
    #[error("authentication failed for {url}\nHint: Check that RANCHER_TOKEN is valid and not expired")]
    AuthFailed { url: String },

    /// Request timed out
    #[error("request timed out: {url}")]
    Timeout { url: String },

    /// Connection or transport failure
    #[error("network error: {message}")]
    Network { message: String },

    /// Malformed URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response body could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Chart index could not be parsed
    #[error("chart index error: {0}")]
    Index(#[from] CoreError),

    /// Missing or invalid settings
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Cluster could not be reached
    #[error("cluster '{cluster}' unavailable: {message}")]
    Unavailable { cluster: String, message: String },
}

impl RancherError {
    /// Map a failed request, keeping the URL that was being fetched
    pub(crate) fn from_request(e: reqwest::Error, url: &str) -> Self {
        if e.is_timeout() {
            RancherError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_connect() {
            RancherError::Network {
                message: format!("connection to {} failed: {}", url, e),
            }
        } else if let Some(status) = e.status() {
            RancherError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            }
        } else if e.is_decode() {
            RancherError::Serialization(e.to_string())
        } else {
            RancherError::Network {
                message: e.to_string(),
            }
        }
    }

    /// Check whether the error came from the API server rejecting credentials
    pub fn is_auth(&self) -> bool {
        matches!(self, RancherError::AuthFailed { .. })
    }
}

impl From<reqwest::Error> for RancherError {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        RancherError::from_request(e, &url)
    }
}

impl From<serde_json::Error> for RancherError {
    fn from(e: serde_json::Error) -> Self {
        RancherError::Serialization(e.to_string())
    }
}
