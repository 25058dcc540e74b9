//! Rancher management API client
//!
//! Covers the three calls chartwatch needs from the management server:
//! listing downstream clusters, minting a kubeconfig for one of them and
//! downloading ClusterRepo chart indexes.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use chartwatch_core::ChartIndex;

use crate::config::{DEFAULT_REQUEST_TIMEOUT, RancherConfig};
use crate::error::{RancherError, Result};
use crate::source::ClusterRef;

/// Collection envelope returned by `/v3` list endpoints
#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

/// Body of the `generateKubeconfig` action
#[derive(Debug, Deserialize)]
struct GeneratedKubeconfig {
    config: String,
}

/// Authenticated client for one Rancher installation
pub struct ManagementClient {
    client: reqwest::Client,
    config: RancherConfig,
}

impl ManagementClient {
    /// Build a client; the configuration is validated first
    pub fn new(config: RancherConfig) -> Result<Self> {
        config.validate()?;

        if !config.verify_tls {
            tracing::debug!("TLS certificate verification disabled for {}", config.url);
        }

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RancherError::Network {
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RancherConfig {
        &self.config
    }

    /// List the downstream clusters visible to the token
    pub async fn list_clusters(&self) -> Result<Vec<ClusterRef>> {
        let url = self.config.api_url("clusters");
        let response = self
            .send(self.client.get(&url).header(ACCEPT, "application/json"), &url)
            .await?;
        let clusters: Collection<ClusterRef> = read_json(response, &url).await?;

        tracing::debug!("found {} clusters", clusters.data.len());
        Ok(clusters.data)
    }

    /// Ask Rancher for a kubeconfig proxying to `cluster`
    pub async fn generate_kubeconfig(&self, cluster: &ClusterRef) -> Result<String> {
        let url = self.config.api_url(&format!("clusters/{}", cluster.id));
        let request = self
            .client
            .post(&url)
            .query(&[("action", "generateKubeconfig")])
            .header(ACCEPT, "application/json");
        let response = self.send(request, &url).await?;
        let generated: GeneratedKubeconfig = read_json(response, &url).await?;

        Ok(generated.config)
    }

    /// Download and parse the chart index of a ClusterRepo
    pub async fn fetch_index(&self, repo: &str) -> Result<ChartIndex> {
        let url = self.config.cluster_repo_index_url(repo);
        let request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .timeout(self.config.index_timeout);
        let response = self.send(request, &url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RancherError::from_request(e, &url))?;

        Ok(ChartIndex::from_slice(&bytes)?)
    }

    /// Attach the bearer token, send, and map error statuses
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .send()
            .await
            .map_err(|e| RancherError::from_request(e, url))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RancherError::AuthFailed {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(RancherError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| RancherError::from_request(e, url))?;
    Ok(serde_json::from_slice(&bytes)?)
}
