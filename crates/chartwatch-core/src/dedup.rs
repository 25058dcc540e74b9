//! Release deduplication
//!
//! Helm keeps one secret per revision, so listing secrets yields every past
//! revision of a release. Only the highest revision is reported.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::release::InstalledRelease;

/// Keep one release per namespace/name: the one with the highest revision.
///
/// On equal revisions the first one seen wins. Secret listing order is not
/// stable across API calls, so which of two equal-revision records survives
/// can change between runs. Output follows the order in which each
/// namespace/name was first seen.
pub fn dedup_by_revision<I>(releases: I) -> Vec<InstalledRelease>
where
    I: IntoIterator<Item = InstalledRelease>,
{
    let mut survivors: IndexMap<(String, String), InstalledRelease> = IndexMap::new();

    for release in releases {
        let key = (release.namespace.clone(), release.name.clone());
        match survivors.entry(key) {
            Entry::Occupied(mut current) => {
                if release.revision > current.get().revision {
                    current.insert(release);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(release);
            }
        }
    }

    survivors.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(namespace: &str, name: &str, revision: u32, version: &str) -> InstalledRelease {
        InstalledRelease {
            name: name.to_string(),
            namespace: namespace.to_string(),
            chart_name: name.to_string(),
            chart_repo: "unknown".to_string(),
            version: version.to_string(),
            status: "deployed".to_string(),
            revision,
            sources: vec![],
        }
    }

    #[test]
    fn test_highest_revision_survives() {
        let survivors = dedup_by_revision(vec![
            release("ns", "app", 3, "1.0.0"),
            release("ns", "app", 5, "1.2.0"),
        ]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].revision, 5);
        assert_eq!(survivors[0].version, "1.2.0");
    }

    #[test]
    fn test_order_of_revisions_does_not_matter() {
        let survivors = dedup_by_revision(vec![
            release("ns", "app", 5, "1.2.0"),
            release("ns", "app", 3, "1.0.0"),
            release("ns", "app", 4, "1.1.0"),
        ]);
        assert_eq!(survivors.len(), 1);
        assert_eq!(survivors[0].revision, 5);
    }

    #[test]
    fn test_equal_revision_keeps_first() {
        let survivors = dedup_by_revision(vec![
            release("ns", "app", 2, "first"),
            release("ns", "app", 2, "second"),
        ]);
        assert_eq!(survivors[0].version, "first");
    }

    #[test]
    fn test_namespace_is_part_of_identity() {
        let survivors = dedup_by_revision(vec![
            release("team-a", "app", 1, "1.0.0"),
            release("team-b", "app", 7, "2.0.0"),
            release("team-a", "db", 2, "9.0.0"),
        ]);
        assert_eq!(survivors.len(), 3);
        let keys: Vec<_> = survivors.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec![("team-a", "app"), ("team-b", "app"), ("team-a", "db")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(dedup_by_revision(Vec::new()).is_empty());
    }
}
