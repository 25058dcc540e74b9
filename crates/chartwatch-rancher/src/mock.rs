//! In-memory cluster source for testing
//!
//! Lets the scanner and the CLI be exercised without a Rancher server or a
//! Kubernetes cluster.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use chartwatch_core::{CatalogEntry, EncodedRelease};

use crate::error::{RancherError, Result};
use crate::source::{ClusterRef, ClusterSource};

/// In-memory [`ClusterSource`]
#[derive(Clone, Default)]
pub struct MockClusterSource {
    clusters: Vec<ClusterRef>,
    catalogs: HashMap<String, Vec<CatalogEntry>>,
    releases: HashMap<String, Vec<EncodedRelease>>,
    failing_catalogs: HashSet<String>,
    failing_releases: HashSet<String>,
    list_error: Option<String>,
    calls: Arc<RwLock<CallCounts>>,
}

/// Number of calls made against the mock, for assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallCounts {
    pub clusters: usize,
    pub catalogs: usize,
    pub releases: usize,
}

impl MockClusterSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cluster with an empty catalog and no releases
    pub fn with_cluster(mut self, cluster: ClusterRef) -> Self {
        self.clusters.push(cluster);
        self
    }

    pub fn with_catalog(mut self, cluster_id: &str, catalog: Vec<CatalogEntry>) -> Self {
        self.catalogs.insert(cluster_id.to_string(), catalog);
        self
    }

    pub fn with_releases(mut self, cluster_id: &str, releases: Vec<EncodedRelease>) -> Self {
        self.releases.insert(cluster_id.to_string(), releases);
        self
    }

    /// Make the catalog call fail for one cluster
    pub fn fail_catalog(mut self, cluster_id: &str) -> Self {
        self.failing_catalogs.insert(cluster_id.to_string());
        self
    }

    /// Make the release call fail for one cluster
    pub fn fail_releases(mut self, cluster_id: &str) -> Self {
        self.failing_releases.insert(cluster_id.to_string());
        self
    }

    /// Make listing clusters fail
    pub fn fail_listing(mut self, message: impl Into<String>) -> Self {
        self.list_error = Some(message.into());
        self
    }

    pub fn call_counts(&self) -> CallCounts {
        self.calls.read().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, update: impl FnOnce(&mut CallCounts)) {
        if let Ok(mut calls) = self.calls.write() {
            update(&mut calls);
        }
    }

    fn unavailable(cluster: &ClusterRef, what: &str) -> RancherError {
        RancherError::Unavailable {
            cluster: cluster.label().to_string(),
            message: format!("{} unavailable", what),
        }
    }
}

#[async_trait]
impl ClusterSource for MockClusterSource {
    async fn clusters(&self) -> Result<Vec<ClusterRef>> {
        self.record(|c| c.clusters += 1);
        match &self.list_error {
            Some(message) => Err(RancherError::Network {
                message: message.clone(),
            }),
            None => Ok(self.clusters.clone()),
        }
    }

    async fn catalog(&self, cluster: &ClusterRef) -> Result<Vec<CatalogEntry>> {
        self.record(|c| c.catalogs += 1);
        if self.failing_catalogs.contains(&cluster.id) {
            return Err(Self::unavailable(cluster, "catalog"));
        }
        Ok(self.catalogs.get(&cluster.id).cloned().unwrap_or_default())
    }

    async fn releases(&self, cluster: &ClusterRef) -> Result<Vec<EncodedRelease>> {
        self.record(|c| c.releases += 1);
        if self.failing_releases.contains(&cluster.id) {
            return Err(Self::unavailable(cluster, "secrets API"));
        }
        Ok(self.releases.get(&cluster.id).cloned().unwrap_or_default())
    }
}
