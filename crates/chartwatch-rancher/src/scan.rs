//! Fleet-wide scan
//!
//! For each cluster: fetch its catalog, fetch its release payloads, then
//! resolve them. A cluster whose catalog is unavailable is still reported
//! (every release comes out as not found); a cluster whose releases cannot be
//! listed is skipped. Neither stops the scan of the other clusters.

use futures::stream::{self, StreamExt};

use chartwatch_core::{ResolvedApplication, Resolver};

use crate::error::Result;
use crate::source::{ClusterRef, ClusterSource};

/// Scans every cluster of a [`ClusterSource`]
pub struct FleetScanner<S> {
    source: S,
    concurrency: usize,
}

impl<S: ClusterSource> FleetScanner<S> {
    /// Scanner processing one cluster at a time
    pub fn new(source: S) -> Self {
        Self {
            source,
            concurrency: 1,
        }
    }

    /// Scan up to `concurrency` clusters at once. Output order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// List clusters and scan all of them.
    ///
    /// Only a failure to list clusters is returned as an error.
    pub async fn scan(&self) -> Result<Vec<ResolvedApplication>> {
        let clusters = self.source.clusters().await?;
        tracing::info!("scanning {} clusters", clusters.len());

        Ok(self.scan_clusters(&clusters).await)
    }

    /// Scan the given clusters, concatenating results in cluster order
    pub async fn scan_clusters(&self, clusters: &[ClusterRef]) -> Vec<ResolvedApplication> {
        stream::iter(clusters)
            .map(|cluster| async move {
                match self.scan_cluster(cluster).await {
                    Ok(applications) => applications,
                    Err(e) => {
                        tracing::warn!(cluster = %cluster.label(), "skipping cluster: {}", e);
                        Vec::new()
                    }
                }
            })
            .buffered(self.concurrency)
            .concat()
            .await
    }

    /// Resolve the releases of a single cluster
    pub async fn scan_cluster(&self, cluster: &ClusterRef) -> Result<Vec<ResolvedApplication>> {
        let name = cluster.label();
        tracing::debug!(cluster = %name, "processing cluster");

        let catalog = match self.source.catalog(cluster).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(
                    cluster = %name,
                    "chart catalog unavailable, continuing without it: {}",
                    e
                );
                Vec::new()
            }
        };

        let payloads = self.source.releases(cluster).await?;
        let applications = Resolver::new(name, &catalog).resolve_encoded(&payloads);

        tracing::debug!(
            cluster = %name,
            catalog = catalog.len(),
            "resolved {} applications",
            applications.len()
        );
        Ok(applications)
    }
}
