//! Chart catalog and release matching
//!
//! A catalog is the flat list of charts a cluster can install, one entry per
//! chart key per repository, holding only the most recent version. Chart names
//! drift between repositories (forks, renamed charts, `repo/chart` prefixes), so
//! matching falls back through three tiers:
//!
//! 1. **Name and source**: key or display name matches and the source URLs overlap
//! 2. **Name**: key or display name matches
//! 3. **Source**: the source URLs overlap, whatever the name
//!
//! Each tier scans the whole catalog before the next one is tried.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{CoreError, Result};
use crate::release::null_as_empty;
use crate::version::UNKNOWN;

/// Latest version of one chart in one repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub version: String,

    /// Repository identifier the chart was listed in
    pub repo: String,

    /// Key the chart is indexed under
    pub chart: String,

    /// Name declared in the chart metadata
    pub name: String,

    pub home: String,
    pub sources: Vec<String>,
}

impl CatalogEntry {
    /// Check whether the key or the display name equals `name`
    pub fn has_name(&self, name: &str) -> bool {
        self.chart == name || self.name == name
    }

    /// Check whether this entry shares at least one source URL with `sources`
    pub fn shares_source(&self, sources: &[String]) -> bool {
        sources_intersect(&self.sources, sources)
    }
}

/// Chart repository index (`index.yaml`, or its JSON rendering)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartIndex {
    /// Versions by chart key, newest first. Document order is preserved.
    #[serde(default)]
    pub entries: IndexMap<String, Vec<IndexEntry>>,
}

/// One chart version in an index
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub home: Option<String>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub sources: Vec<String>,
}

impl ChartIndex {
    /// Parse an index document; YAML and JSON are both accepted
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_yaml::from_slice(bytes).map_err(|e| CoreError::IndexParse {
            message: e.to_string(),
        })
    }

    /// Reduce the index to catalog entries for `repo`.
    ///
    /// The first version listed under each key is taken as the latest; keys
    /// with no versions are dropped.
    pub fn into_catalog(self, repo: &str) -> Vec<CatalogEntry> {
        self.entries
            .into_iter()
            .filter_map(|(chart, versions)| {
                let latest = versions.into_iter().next()?;
                Some(CatalogEntry {
                    version: latest.version,
                    repo: repo.to_string(),
                    chart,
                    name: latest.name,
                    home: latest.home.unwrap_or_default(),
                    sources: latest.sources,
                })
            })
            .collect()
    }
}

/// Which fallback tier produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    NameAndSource,
    Name,
    Source,
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchTier::NameAndSource => write!(f, "name+source"),
            MatchTier::Name => write!(f, "name"),
            MatchTier::Source => write!(f, "source"),
        }
    }
}

/// A catalog entry selected for a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogMatch<'a> {
    pub entry: &'a CatalogEntry,
    pub tier: MatchTier,
}

/// Latest available version and the repository offering it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestChart {
    pub version: String,
    pub repo: String,
}

impl LatestChart {
    /// The result when nothing in the catalog matched
    pub fn unknown() -> Self {
        Self {
            version: UNKNOWN.to_string(),
            repo: UNKNOWN.to_string(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.repo == UNKNOWN
    }
}

/// Find the catalog entry corresponding to an installed chart
pub fn find_match<'a>(
    catalog: &'a [CatalogEntry],
    chart_name: &str,
    sources: &[String],
) -> Option<CatalogMatch<'a>> {
    let by_name_and_source = || {
        catalog
            .iter()
            .find(|entry| entry.has_name(chart_name) && entry.shares_source(sources))
            .map(|entry| CatalogMatch {
                entry,
                tier: MatchTier::NameAndSource,
            })
    };
    let by_name = || {
        catalog
            .iter()
            .find(|entry| entry.has_name(chart_name))
            .map(|entry| CatalogMatch {
                entry,
                tier: MatchTier::Name,
            })
    };
    let by_source = || {
        catalog
            .iter()
            .find(|entry| entry.shares_source(sources))
            .map(|entry| CatalogMatch {
                entry,
                tier: MatchTier::Source,
            })
    };

    by_name_and_source().or_else(by_name).or_else(by_source)
}

/// Resolve the latest version for an installed chart; never fails
pub fn find_latest(
    catalog: &[CatalogEntry],
    chart_name: &str,
    sources: &[String],
) -> LatestChart {
    find_match(catalog, chart_name, sources)
        .map(|found| LatestChart {
            version: found.entry.version.clone(),
            repo: found.entry.repo.clone(),
        })
        .unwrap_or_else(LatestChart::unknown)
}

/// Non-empty set intersection; an empty side never matches
pub fn sources_intersect(a: &[String], b: &[String]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }

    let known: HashSet<&str> = a.iter().map(String::as_str).collect();
    b.iter().any(|source| known.contains(source.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(repo: &str, chart: &str, version: &str, sources: &[&str]) -> CatalogEntry {
        CatalogEntry {
            version: version.to_string(),
            repo: repo.to_string(),
            chart: chart.to_string(),
            name: chart.to_string(),
            home: String::new(),
            sources: strings(sources),
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_name_and_source_beats_earlier_name_match() {
        let catalog = vec![
            entry("repo-a", "nginx", "1.0.0", &["github.com/a/nginx"]),
            entry("repo-b", "nginx", "2.0.0", &["github.com/b/nginx"]),
        ];

        let found = find_match(&catalog, "nginx", &strings(&["github.com/b/nginx"])).unwrap();
        assert_eq!(found.tier, MatchTier::NameAndSource);
        assert_eq!(found.entry.version, "2.0.0");

        let latest = find_latest(&catalog, "nginx", &strings(&["github.com/b/nginx"]));
        assert_eq!(latest.version, "2.0.0");
        assert_eq!(latest.repo, "repo-b");
    }

    #[test]
    fn test_name_only_fallback_takes_first() {
        let catalog = vec![
            entry("repo-a", "nginx", "1.0.0", &["github.com/a/nginx"]),
            entry("repo-b", "nginx", "2.0.0", &["github.com/b/nginx"]),
        ];

        let found = find_match(&catalog, "nginx", &[]).unwrap();
        assert_eq!(found.tier, MatchTier::Name);
        assert_eq!(found.entry.repo, "repo-a");
    }

    #[test]
    fn test_display_name_matches() {
        let mut renamed = entry("repo", "key-differs", "3.1.0", &[]);
        renamed.name = "grafana".to_string();

        let found = find_match(std::slice::from_ref(&renamed), "grafana", &[]).unwrap();
        assert_eq!(found.tier, MatchTier::Name);
        assert_eq!(found.entry.version, "3.1.0");
    }

    #[test]
    fn test_source_only_fallback() {
        let catalog = vec![
            entry("repo", "unrelated", "0.1.0", &["github.com/z/z"]),
            entry("repo", "othername", "5.0.0", &["github.com/x/y"]),
        ];

        let found = find_match(&catalog, "mychart", &strings(&["github.com/x/y"])).unwrap();
        assert_eq!(found.tier, MatchTier::Source);
        assert_eq!(found.entry.version, "5.0.0");
    }

    #[test]
    fn test_source_order_is_irrelevant() {
        let catalog = vec![entry("repo", "app", "1.0.0", &["s1", "s2", "s3"])];
        let found = find_match(&catalog, "other", &strings(&["s9", "s3"])).unwrap();
        assert_eq!(found.tier, MatchTier::Source);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(
            find_latest(&[], "nginx", &strings(&["github.com/a/nginx"])),
            LatestChart::unknown()
        );

        let catalog = vec![entry("repo", "redis", "17.0.0", &["github.com/r/redis"])];
        let latest = find_latest(&catalog, "nginx", &strings(&["github.com/a/nginx"]));
        assert!(latest.is_unknown());
        assert_eq!(latest.version, UNKNOWN);
    }

    #[test]
    fn test_empty_sources_never_intersect() {
        assert!(!sources_intersect(&[], &[]));
        assert!(!sources_intersect(&strings(&["a"]), &[]));
        assert!(!sources_intersect(&[], &strings(&["a"])));

        let catalog = vec![entry("repo", "app", "1.0.0", &[])];
        assert!(find_match(&catalog, "other", &[]).is_none());
    }

    #[test]
    fn test_sources_intersect() {
        assert!(sources_intersect(&strings(&["a", "b"]), &strings(&["c", "b"])));
        assert!(!sources_intersect(&strings(&["a", "b"]), &strings(&["c", "d"])));
    }

    #[test]
    fn test_index_into_catalog_keeps_first_version() {
        let yaml = r#"
apiVersion: v1
entries:
  nginx:
    - name: nginx
      version: "15.0.0"
      home: https://nginx.org
      sources:
        - https://github.com/bitnami/charts
    - name: nginx
      version: "14.0.0"
  empty: []
  redis:
    - name: redis
      version: "17.0.0"
"#;
        let catalog = ChartIndex::from_slice(yaml.as_bytes())
            .unwrap()
            .into_catalog("bitnami");

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].chart, "nginx");
        assert_eq!(catalog[0].version, "15.0.0");
        assert_eq!(catalog[0].repo, "bitnami");
        assert_eq!(catalog[0].home, "https://nginx.org");
        assert_eq!(catalog[0].sources, strings(&["https://github.com/bitnami/charts"]));
        assert_eq!(catalog[1].chart, "redis");
        assert!(catalog[1].sources.is_empty());
    }

    #[test]
    fn test_index_from_json() {
        let json = br#"{"apiVersion": "v1", "entries": {
            "rancher-monitoring": [
                {"name": "rancher-monitoring", "version": "103.1.0", "sources": null}
            ],
            "longhorn": [{"name": "longhorn", "version": "1.6.1", "home": "https://longhorn.io"}]
        }}"#;
        let catalog = ChartIndex::from_slice(json).unwrap().into_catalog("rancher-charts");

        let keys: Vec<&str> = catalog.iter().map(|e| e.chart.as_str()).collect();
        assert_eq!(keys, vec!["rancher-monitoring", "longhorn"]);
        assert_eq!(catalog[1].home, "https://longhorn.io");
    }

    #[test]
    fn test_index_parse_error() {
        let result = ChartIndex::from_slice(b"entries: [not, a, map]");
        assert!(matches!(result, Err(CoreError::IndexParse { .. })));
    }

    #[test]
    fn test_index_without_entries() {
        let index = ChartIndex::from_slice(b"apiVersion: v1").unwrap();
        assert!(index.into_catalog("repo").is_empty());
    }
}
