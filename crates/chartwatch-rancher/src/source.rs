//! Where cluster data comes from
//!
//! The scanner only sees the [`ClusterSource`] trait, so it can run against
//! a live Rancher installation or against [`crate::MockClusterSource`].

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use chartwatch_core::{CatalogEntry, EncodedRelease};

use crate::cluster::ClusterConnection;
use crate::config::RancherConfig;
use crate::error::Result;
use crate::management::ManagementClient;

/// A downstream cluster as listed by the management API
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterRef {
    /// Rancher identifier, e.g. `c-m-8ffq2x` or `local`
    pub id: String,

    /// Display name, used as the cluster label in reports
    #[serde(default)]
    pub name: String,
}

impl ClusterRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Label used in logs and reports; falls back to the id
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Provider of clusters, catalogs and release payloads
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Every cluster to scan
    async fn clusters(&self) -> Result<Vec<ClusterRef>>;

    /// Charts available to `cluster`, latest version per chart per repository
    async fn catalog(&self, cluster: &ClusterRef) -> Result<Vec<CatalogEntry>>;

    /// Raw Helm release payloads stored in `cluster`
    async fn releases(&self, cluster: &ClusterRef) -> Result<Vec<EncodedRelease>>;
}

/// Live source backed by the Rancher management API
pub struct RancherSource {
    management: ManagementClient,
}

impl RancherSource {
    pub fn new(config: RancherConfig) -> Result<Self> {
        Ok(Self {
            management: ManagementClient::new(config)?,
        })
    }

    pub fn management(&self) -> &ManagementClient {
        &self.management
    }

    async fn connect(&self, cluster: &ClusterRef) -> Result<ClusterConnection> {
        let kubeconfig = self.management.generate_kubeconfig(cluster).await?;
        ClusterConnection::from_kubeconfig(cluster.label(), &kubeconfig).await
    }

    /// Fetch one repository index; failures are logged and yield nothing
    async fn repo_catalog(&self, cluster: &ClusterRef, repo: String) -> Vec<CatalogEntry> {
        match self.management.fetch_index(&repo).await {
            Ok(index) => index.into_catalog(&repo),
            Err(e) => {
                tracing::warn!(
                    cluster = %cluster.label(),
                    repo = %repo,
                    "skipping chart index: {}",
                    e
                );
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl ClusterSource for RancherSource {
    async fn clusters(&self) -> Result<Vec<ClusterRef>> {
        self.management.list_clusters().await
    }

    async fn catalog(&self, cluster: &ClusterRef) -> Result<Vec<CatalogEntry>> {
        let repos = self.connect(cluster).await?.cluster_repos().await?;
        tracing::debug!(
            cluster = %cluster.label(),
            "found {} cluster repos",
            repos.len()
        );

        // join_all keeps repository order
        let catalogs = join_all(
            repos
                .into_iter()
                .map(|repo| self.repo_catalog(cluster, repo)),
        )
        .await;

        Ok(catalogs.into_iter().flatten().collect())
    }

    async fn releases(&self, cluster: &ClusterRef) -> Result<Vec<EncodedRelease>> {
        self.connect(cluster).await?.release_payloads().await
    }
}
