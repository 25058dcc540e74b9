//! Helm release records as persisted in cluster secrets
//!
//! Helm stores each revision of a release in a Secret labelled `owner=helm`.
//! The `release` key holds the release document gzip-compressed and then
//! base64 encoded. [`decode_release`] reverses that chain and
//! [`InstalledRelease::from_record`] keeps only the fields needed for matching.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::{Read, Write};

use crate::error::{DecodeError, Result};
use crate::version::UNKNOWN;

/// A decoded Helm release document.
///
/// Only the fields chartwatch reads are modelled; everything else in the
/// document (manifest, values, hooks) is ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub namespace: String,

    /// Revision number (Helm calls this field `version`)
    #[serde(default)]
    pub version: u32,

    #[serde(default)]
    pub info: ReleaseInfo,

    #[serde(default)]
    pub chart: ChartPayload,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPayload {
    #[serde(default)]
    pub metadata: ChartMetadata,
}

/// Chart metadata (the `Chart.yaml` of the installed chart)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartMetadata {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
}

/// Accept `null` wherever a list is expected
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// An encoded release payload together with the secret it was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedRelease {
    pub namespace: String,
    pub secret_name: String,
    pub payload: String,
}

impl EncodedRelease {
    pub fn new(
        namespace: impl Into<String>,
        secret_name: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            secret_name: secret_name.into(),
            payload: payload.into(),
        }
    }
}

/// Decode a stored release (base64 + gunzip + YAML/JSON document)
#[must_use = "decoded release should be used"]
pub fn decode_release(encoded: &str) -> std::result::Result<ReleaseRecord, DecodeError> {
    let compressed = STANDARD.decode(encoded)?;

    let mut document = Vec::new();
    flate2::read::GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut document)
        .map_err(DecodeError::Decompress)?;

    // Helm writes JSON; the YAML parser caps key length, so it only gets the rest
    if starts_with_brace(&document) {
        Ok(serde_json::from_slice(&document)?)
    } else {
        Ok(serde_yaml::from_slice(&document)?)
    }
}

/// Check whether the first non-whitespace byte opens a JSON object
fn starts_with_brace(document: &[u8]) -> bool {
    document
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_some_and(|byte| *byte == b'{')
}

/// Encode a release the way Helm stores it (JSON + gzip + base64)
#[must_use = "encoded release should be stored"]
pub fn encode_release(record: &ReleaseRecord) -> Result<String> {
    let json = serde_json::to_vec(record)?;
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(STANDARD.encode(compressed))
}

/// The normalized view of an installed release used for catalog matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledRelease {
    pub name: String,
    pub namespace: String,
    pub chart_name: String,

    /// Best-known repository label; provisional until a catalog match overrides it
    pub chart_repo: String,

    /// Installed chart version
    pub version: String,
    pub status: String,
    pub revision: u32,
    pub sources: Vec<String>,
}

impl InstalledRelease {
    /// Extract the matching fields from a decoded release.
    ///
    /// A chart name of the form `repo/chart` is split into its two halves.
    /// Otherwise the repo label is guessed from the owner segment of the
    /// first GitHub source URL, falling back to `unknown`.
    pub fn from_record(record: &ReleaseRecord) -> Self {
        let metadata = &record.chart.metadata;
        let mut chart_repo = UNKNOWN.to_string();
        let mut chart_name = metadata.name.clone();

        if !metadata.name.is_empty() {
            let parts: Vec<&str> = metadata.name.split('/').collect();
            if let [repo, chart] = parts.as_slice() {
                chart_repo = (*repo).to_string();
                chart_name = (*chart).to_string();
            } else if !metadata.sources.is_empty() {
                chart_repo = repo_from_sources(&metadata.sources);
            }
        }

        Self {
            name: record.name.clone(),
            namespace: record.namespace.clone(),
            chart_name,
            chart_repo,
            version: metadata.version.clone(),
            status: record.info.status.clone(),
            revision: record.version,
            sources: metadata.sources.clone(),
        }
    }

    /// Identity key: releases are unique per namespace and name
    pub fn key(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }
}

impl From<ReleaseRecord> for InstalledRelease {
    fn from(record: ReleaseRecord) -> Self {
        Self::from_record(&record)
    }
}

/// Owner segment of the first GitHub URL (`https://github.com/<owner>/...`)
fn repo_from_sources(sources: &[String]) -> String {
    sources
        .iter()
        .filter(|source| source.contains("github.com"))
        .find_map(|source| source.split('/').nth(3).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeStage;

    fn record(chart_name: &str, sources: &[&str]) -> ReleaseRecord {
        ReleaseRecord {
            name: "web".to_string(),
            namespace: "apps".to_string(),
            version: 4,
            info: ReleaseInfo {
                status: "deployed".to_string(),
            },
            chart: ChartPayload {
                metadata: ChartMetadata {
                    name: chart_name.to_string(),
                    version: "1.4.2".to_string(),
                    sources: sources.iter().map(|s| s.to_string()).collect(),
                },
            },
        }
    }

    fn gzip_base64(document: &[u8]) -> String {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(document).unwrap();
        STANDARD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let original = record("nginx", &["https://github.com/bitnami/charts"]);
        let encoded = encode_release(&original).unwrap();
        let decoded = decode_release(&encoded).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_decode_helm_json_document() {
        let document = br#"{
            "name": "ingress",
            "namespace": "kube-system",
            "version": 12,
            "manifest": "---\nkind: Deployment\n",
            "info": {"status": "superseded", "description": "Upgrade complete"},
            "chart": {
                "metadata": {
                    "name": "ingress-nginx",
                    "version": "4.10.0",
                    "appVersion": "1.10.0",
                    "sources": ["https://github.com/kubernetes/ingress-nginx"]
                },
                "templates": [],
                "values": {"controller": {"replicaCount": 2}}
            }
        }"#;

        let decoded = decode_release(&gzip_base64(document)).unwrap();
        assert_eq!(decoded.name, "ingress");
        assert_eq!(decoded.namespace, "kube-system");
        assert_eq!(decoded.version, 12);
        assert_eq!(decoded.info.status, "superseded");
        assert_eq!(decoded.chart.metadata.name, "ingress-nginx");
        assert_eq!(decoded.chart.metadata.version, "4.10.0");
        assert_eq!(decoded.chart.metadata.sources.len(), 1);
    }

    #[test]
    fn test_decode_json_with_long_key() {
        let mut values = serde_json::Map::new();
        values.insert("k".repeat(2048), serde_json::Value::Bool(true));
        let document = serde_json::json!({
            "name": "web",
            "namespace": "apps",
            "version": 3,
            "info": {"status": "deployed"},
            "chart": {
                "metadata": {"name": "nginx", "version": "15.0.0"},
                "values": values
            }
        });

        let compact = serde_json::to_vec(&document).unwrap();
        let decoded = decode_release(&gzip_base64(&compact)).unwrap();
        assert_eq!(decoded.name, "web");
        assert_eq!(decoded.version, 3);
        assert_eq!(decoded.chart.metadata.name, "nginx");
    }

    #[test]
    fn test_decode_json_after_leading_whitespace() {
        let document = b"\n  \t{\"name\": \"web\", \"version\": 1}";
        let decoded = decode_release(&gzip_base64(document)).unwrap();
        assert_eq!(decoded.name, "web");
    }

    #[test]
    fn test_decode_invalid_json_is_document_stage() {
        let err = decode_release(&gzip_base64(br#"{"name": "web", "#)).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
        assert_eq!(err.stage(), DecodeStage::Document);
    }

    #[test]
    fn test_decode_yaml_document() {
        let document = b"name: cache
namespace: data
version: 2
chart:
  metadata:
    name: redis
    version: 17.0.1
";
        let decoded = decode_release(&gzip_base64(document)).unwrap();
        assert_eq!(decoded.name, "cache");
        assert_eq!(decoded.version, 2);
        assert_eq!(decoded.chart.metadata.version, "17.0.1");
        assert!(decoded.chart.metadata.sources.is_empty());
        assert_eq!(decoded.info.status, "");
    }

    #[test]
    fn test_decode_null_sources() {
        let document = br#"{"name": "a", "namespace": "b", "version": 1,
            "chart": {"metadata": {"name": "c", "version": "1.0.0", "sources": null}}}"#;
        let decoded = decode_release(&gzip_base64(document)).unwrap();
        assert!(decoded.chart.metadata.sources.is_empty());
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = decode_release("not valid base64!!!").unwrap_err();
        assert_eq!(err.stage(), DecodeStage::Base64);
    }

    #[test]
    fn test_decode_not_gzip() {
        let err = decode_release(&STANDARD.encode(b"plain text")).unwrap_err();
        assert_eq!(err.stage(), DecodeStage::Decompress);
    }

    #[test]
    fn test_decode_invalid_document() {
        let err = decode_release(&gzip_base64(b"[1, 2")).unwrap_err();
        assert_eq!(err.stage(), DecodeStage::Document);
    }

    #[test]
    fn test_decode_wrong_shape() {
        let err = decode_release(&gzip_base64(br#"{"version": "not-a-number"}"#)).unwrap_err();
        assert_eq!(err.stage(), DecodeStage::Document);
    }

    #[test]
    fn test_extract_repo_chart_split() {
        let installed = InstalledRelease::from_record(&record("bitnami/nginx", &[]));
        assert_eq!(installed.chart_repo, "bitnami");
        assert_eq!(installed.chart_name, "nginx");
    }

    #[test]
    fn test_extract_multiple_slashes_not_split() {
        let installed = InstalledRelease::from_record(&record("a/b/c", &[]));
        assert_eq!(installed.chart_repo, UNKNOWN);
        assert_eq!(installed.chart_name, "a/b/c");
    }

    #[test]
    fn test_extract_repo_from_github_source() {
        let installed = InstalledRelease::from_record(&record(
            "nginx",
            &[
                "https://nginx.org",
                "https://github.com/bitnami/charts/tree/main/bitnami/nginx",
            ],
        ));
        assert_eq!(installed.chart_repo, "bitnami");
        assert_eq!(installed.chart_name, "nginx");
    }

    #[test]
    fn test_extract_skips_short_github_urls() {
        let installed = InstalledRelease::from_record(&record(
            "app",
            &["github.com/org/app", "https://github.com/acme/app"],
        ));
        assert_eq!(installed.chart_repo, "acme");
    }

    #[test]
    fn test_extract_no_github_source() {
        let installed =
            InstalledRelease::from_record(&record("app", &["https://gitlab.com/org/app"]));
        assert_eq!(installed.chart_repo, UNKNOWN);
    }

    #[test]
    fn test_extract_no_sources() {
        let installed = InstalledRelease::from_record(&record("app", &[]));
        assert_eq!(installed.chart_repo, UNKNOWN);
        assert_eq!(installed.chart_name, "app");
    }

    #[test]
    fn test_extract_copies_release_fields() {
        let installed: InstalledRelease = record("app", &["https://example.com"]).into();
        assert_eq!(installed.name, "web");
        assert_eq!(installed.namespace, "apps");
        assert_eq!(installed.version, "1.4.2");
        assert_eq!(installed.status, "deployed");
        assert_eq!(installed.revision, 4);
        assert_eq!(installed.sources, vec!["https://example.com".to_string()]);
        assert_eq!(installed.key(), ("apps", "web"));
    }
}
