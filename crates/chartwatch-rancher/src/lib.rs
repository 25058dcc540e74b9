//! Chartwatch Rancher - cluster access for chartwatch
//!
//! This crate gathers what the resolution engine in `chartwatch-core` needs
//! from a Rancher-managed fleet:
//! - `management`: Rancher management API (clusters, kubeconfigs, chart indexes)
//! - `cluster`: Helm release secrets and ClusterRepos of one downstream cluster
//! - `source`: The `ClusterSource` abstraction and its live implementation
//! - `scan`: Fleet-wide scan with per-cluster failure isolation
//!
//! # Example
//!
//! ```ignore
//! use chartwatch_rancher::{FleetScanner, RancherConfig, RancherSource};
//!
//! let config = RancherConfig::new("https://rancher.example.com/v3", token);
//! let scanner = FleetScanner::new(RancherSource::new(config)?).with_concurrency(4);
//! for app in scanner.scan().await? {
//!     println!("{} {} {}", app.cluster, app.release.name, app.latest_version);
//! }
//! ```

pub mod cluster;
pub mod config;
pub mod error;
pub mod management;
pub mod mock;
pub mod scan;
pub mod source;

pub use cluster::{ClusterConnection, HELM_OWNER_SELECTOR, RELEASE_DATA_KEY, release_payload};
pub use config::{DEFAULT_INDEX_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, RancherConfig};
pub use error::{RancherError, Result};
pub use management::ManagementClient;
pub use mock::{CallCounts, MockClusterSource};
pub use scan::FleetScanner;
pub use source::{ClusterRef, ClusterSource, RancherSource};
