//! Access to a single downstream cluster
//!
//! Helm stores every revision of a release in a Secret labelled
//! `owner=helm`, under the `release` data key. Rancher lists the chart
//! repositories a cluster can install from as `ClusterRepo` objects.

use k8s_openapi::api::core::v1::{Namespace, Secret};
use kube::api::{Api, ApiResource, DynamicObject, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::GroupVersionKind;
use kube::{Client, Config};

use chartwatch_core::EncodedRelease;

use crate::error::{RancherError, Result};

/// Label selector matching Helm release secrets
pub const HELM_OWNER_SELECTOR: &str = "owner=helm";

/// Secret data key holding the encoded release
pub const RELEASE_DATA_KEY: &str = "release";

/// Kubernetes client bound to one cluster
#[derive(Clone)]
pub struct ClusterConnection {
    client: Client,
    cluster: String,
}

impl ClusterConnection {
    /// Build a client from a kubeconfig document
    pub async fn from_kubeconfig(cluster: &str, kubeconfig: &str) -> Result<Self> {
        let invalid = |message: String| RancherError::Kubeconfig {
            cluster: cluster.to_string(),
            message,
        };

        let parsed = Kubeconfig::from_yaml(kubeconfig).map_err(|e| invalid(e.to_string()))?;
        let config = Config::from_custom_kubeconfig(parsed, &KubeConfigOptions::default())
            .await
            .map_err(|e| invalid(e.to_string()))?;
        let client = Client::try_from(config)?;

        Ok(Self::with_client(client, cluster))
    }

    /// Wrap an existing client
    pub fn with_client(client: Client, cluster: impl Into<String>) -> Self {
        Self {
            client,
            cluster: cluster.into(),
        }
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Names of every namespace in the cluster
    pub async fn namespaces(&self) -> Result<Vec<String>> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    /// Collect the encoded payload of every Helm release secret.
    ///
    /// Namespaces are listed one at a time; a namespace whose secrets cannot
    /// be listed is skipped, but failing to list namespaces fails the call.
    pub async fn release_payloads(&self) -> Result<Vec<EncodedRelease>> {
        let namespaces = self.namespaces().await?;
        let params = ListParams::default().labels(HELM_OWNER_SELECTOR);
        let mut payloads = Vec::new();

        for namespace in &namespaces {
            let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
            match api.list(&params).await {
                Ok(secrets) => payloads.extend(secrets.items.iter().filter_map(release_payload)),
                Err(e) => {
                    tracing::debug!(
                        cluster = %self.cluster,
                        namespace = %namespace,
                        "skipping namespace: {}",
                        e
                    );
                }
            }
        }

        tracing::debug!(
            cluster = %self.cluster,
            namespaces = namespaces.len(),
            "found {} release secrets",
            payloads.len()
        );
        Ok(payloads)
    }

    /// Names of the ClusterRepos registered in the cluster
    pub async fn cluster_repos(&self) -> Result<Vec<String>> {
        let gvk = GroupVersionKind::gvk("catalog.cattle.io", "v1", "ClusterRepo");
        let resource = ApiResource::from_gvk_with_plural(&gvk, "clusterrepos");
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
        let list = api.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|repo| repo.metadata.name)
            .collect())
    }
}

/// Extract the release payload from a Helm secret
pub fn release_payload(secret: &Secret) -> Option<EncodedRelease> {
    let data = secret.data.as_ref()?.get(RELEASE_DATA_KEY)?;
    let payload = String::from_utf8(data.0.clone()).ok()?;

    Some(EncodedRelease::new(
        secret.metadata.namespace.clone().unwrap_or_default(),
        secret.metadata.name.clone().unwrap_or_default(),
        payload,
    ))
}
