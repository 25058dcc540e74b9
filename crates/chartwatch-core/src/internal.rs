//! Charts managed by the platform itself
//!
//! These ship with the distribution (RKE2 add-ons, Rancher agents, Fleet) and
//! are upgraded together with it, so they are never checked against a catalog.

/// Platform charts that are not published in any public repository
static INTERNAL_CHARTS: phf::Set<&'static str> = phf::phf_set! {
    "rancher-webhook",
    "fleet-agent-local",
    "rancher-provisioning-capi",
    "system-upgrade-controller",
    "rke2-canal",
    "rke2-coredns",
    "rke2-ingress-nginx",
    "rke2-metrics-server",
    "rke2-runtimeclasses",
    "rke2-snapshot-controller",
    "rke2-snapshot-controller-crd",
};

/// Name prefixes reserved for platform charts
static INTERNAL_PREFIXES: &[&str] = &["rke2-", "rancher-", "fleet-", "cattle-"];

/// Check whether a chart's lifecycle is owned by the platform
pub fn is_internal_chart(chart_name: &str) -> bool {
    INTERNAL_CHARTS.contains(chart_name)
        || INTERNAL_PREFIXES
            .iter()
            .any(|prefix| chart_name.starts_with(prefix))
}
