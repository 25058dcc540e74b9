//! Per-cluster resolution of installed releases against the catalog

use serde::Serialize;

use crate::catalog::{CatalogEntry, find_latest};
use crate::dedup::dedup_by_revision;
use crate::internal::is_internal_chart;
use crate::release::{EncodedRelease, InstalledRelease, decode_release};
use crate::version::{INTERNAL, MANAGED, UNKNOWN, is_newer};

/// An installed release with its update verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedApplication {
    pub release: InstalledRelease,
    pub current_version: String,
    pub latest_version: String,
    pub update_available: bool,
    pub cluster: String,
}

/// Reporting category of a resolved application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Chart lifecycle is owned by the platform
    Managed,
    /// Chart is internal and unpublished
    Internal,
    /// No catalog entry matched
    NotFound,
    UpdateAvailable,
    UpToDate,
}

impl ResolvedApplication {
    pub fn update_status(&self) -> UpdateStatus {
        match self.latest_version.as_str() {
            MANAGED => UpdateStatus::Managed,
            INTERNAL => UpdateStatus::Internal,
            UNKNOWN => UpdateStatus::NotFound,
            _ if self.update_available => UpdateStatus::UpdateAvailable,
            _ => UpdateStatus::UpToDate,
        }
    }
}

/// Resolves the releases of one cluster against that cluster's catalog
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    cluster: &'a str,
    catalog: &'a [CatalogEntry],
}

impl<'a> Resolver<'a> {
    pub fn new(cluster: &'a str, catalog: &'a [CatalogEntry]) -> Self {
        Self { cluster, catalog }
    }

    pub fn cluster(&self) -> &str {
        self.cluster
    }

    /// Resolve a single (already deduplicated) release.
    ///
    /// A catalog match replaces the provisional repo label. Internal charts
    /// always report `managed` as their latest version.
    pub fn resolve(&self, mut release: InstalledRelease) -> ResolvedApplication {
        let latest = find_latest(self.catalog, &release.chart_name, &release.sources);
        if !latest.is_unknown() {
            release.chart_repo = latest.repo;
        }

        let latest_version = if is_internal_chart(&release.chart_name) {
            MANAGED.to_string()
        } else {
            latest.version
        };

        let update_available = is_newer(&release.version, &latest_version);

        tracing::debug!(
            cluster = self.cluster,
            chart = %release.chart_name,
            repo = %release.chart_repo,
            current = %release.version,
            latest = %latest_version,
            update = update_available,
            "resolved release"
        );

        ResolvedApplication {
            current_version: release.version.clone(),
            latest_version,
            update_available,
            cluster: self.cluster.to_string(),
            release,
        }
    }

    /// Deduplicate by revision, then resolve every survivor
    pub fn resolve_all<I>(&self, releases: I) -> Vec<ResolvedApplication>
    where
        I: IntoIterator<Item = InstalledRelease>,
    {
        dedup_by_revision(releases)
            .into_iter()
            .map(|release| self.resolve(release))
            .collect()
    }

    /// Decode raw secret payloads, then deduplicate and resolve them
    pub fn resolve_encoded(&self, payloads: &[EncodedRelease]) -> Vec<ResolvedApplication> {
        self.resolve_all(decode_payloads(payloads))
    }
}

/// Decode every payload, skipping the ones that cannot be read
pub fn decode_payloads(payloads: &[EncodedRelease]) -> Vec<InstalledRelease> {
    payloads
        .iter()
        .filter_map(|encoded| match decode_release(&encoded.payload) {
            Ok(record) => Some(InstalledRelease::from_record(&record)),
            Err(e) => {
                tracing::debug!(
                    namespace = %encoded.namespace,
                    secret = %encoded.secret_name,
                    stage = %e.stage(),
                    "skipping unreadable release: {}",
                    e
                );
                None
            }
        })
        .collect()
}
