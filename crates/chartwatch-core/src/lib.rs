//! Chartwatch Core - release-to-catalog resolution for Helm-managed fleets
//!
//! This crate holds the decision logic of chartwatch. It never talks to a
//! cluster; callers hand it already-fetched data:
//! - `release`: Decode persisted Helm release payloads into `InstalledRelease`
//! - `catalog`: Reduce chart indexes to a catalog and match releases against it
//! - `dedup`: Keep the highest revision per namespace/name
//! - `version`: Permissive major.minor.patch comparison
//! - `internal`: Charts whose lifecycle belongs to the platform
//! - `resolver`: Tie the above together for one cluster

pub mod catalog;
pub mod dedup;
pub mod error;
pub mod internal;
pub mod release;
pub mod resolver;
pub mod version;

pub use catalog::{
    CatalogEntry, CatalogMatch, ChartIndex, IndexEntry, LatestChart, MatchTier, find_latest,
    find_match,
};
pub use dedup::dedup_by_revision;
pub use error::{CoreError, DecodeError, DecodeStage, Result};
pub use internal::is_internal_chart;
pub use release::{
    ChartMetadata, ChartPayload, EncodedRelease, InstalledRelease, ReleaseInfo, ReleaseRecord,
    decode_release, encode_release,
};
pub use resolver::{ResolvedApplication, Resolver, UpdateStatus, decode_payloads};
pub use version::{INTERNAL, MANAGED, UNKNOWN, Version, compare, is_newer};
