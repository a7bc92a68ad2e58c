//! NetworkPolicy management
//!
//! Applies and removes network policies during connectivity tests.

use anyhow::{Context, Result};
use k8s_openapi::api::networking::v1::NetworkPolicy;
use kube::api::{Api, DeleteParams, ListParams, PostParams};
use tracing::info;

use crate::k8s::resources::allow_missing;
use crate::k8s::K8sClient;

/// NetworkPolicy manager for test operations
pub struct NetworkPolicyManager {
    client: K8sClient,
}

impl NetworkPolicyManager {
    pub fn new(client: K8sClient) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<NetworkPolicy> {
        self.client.namespaced_api_in(namespace)
    }

    /// Create a network policy
    pub async fn create(&self, policy: &NetworkPolicy) -> Result<NetworkPolicy> {
        let namespace = policy
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());

        let created = self
            .api(namespace)
            .create(&PostParams::default(), policy)
            .await
            .context("Failed to create network policy")?;

        info!(
            "Created network policy {}/{}",
            namespace,
            created.metadata.name.as_deref().unwrap_or("<unnamed>")
        );
        Ok(created)
    }

    /// Get a network policy by name
    pub async fn get(&self, name: &str, namespace: &str) -> Result<NetworkPolicy> {
        self.api(namespace)
            .get(name)
            .await
            .with_context(|| format!("Failed to get network policy {namespace}/{name}"))
    }

    /// List network policies in a namespace
    pub async fn list(&self, namespace: &str) -> Result<Vec<NetworkPolicy>> {
        let list = self
            .api(namespace)
            .list(&ListParams::default())
            .await
            .context("Failed to list network policies")?;
        Ok(list.items)
    }

    /// Delete a network policy; deleting an absent policy is not an error
    pub async fn delete(&self, name: &str, namespace: &str) -> Result<()> {
        let api = self.api(namespace);
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .context("Failed to delete network policy")?;
        Ok(())
    }
}
