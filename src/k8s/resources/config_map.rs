//! ConfigMap management
//!
//! CRUD for test configuration data.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, DeleteParams, PostParams};

use crate::k8s::resources::allow_missing;
use crate::k8s::K8sClient;

/// ConfigMap manager for test operations
pub struct ConfigMapManager {
    client: K8sClient,
}

impl ConfigMapManager {
    pub fn new(client: K8sClient) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<ConfigMap> {
        self.client.namespaced_api_in(namespace)
    }

    /// Create a configmap
    pub async fn create(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let namespace = config_map
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());
        self.api(namespace)
            .create(&PostParams::default(), config_map)
            .await
            .context("Failed to create configmap")
    }

    /// Get a configmap by name
    pub async fn get(&self, name: &str, namespace: &str) -> Result<ConfigMap> {
        self.api(namespace)
            .get(name)
            .await
            .with_context(|| format!("Failed to get configmap {namespace}/{name}"))
    }

    /// Replace an existing configmap; the passed object must carry the
    /// resource version of the revision it was read from
    pub async fn update(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let name = config_map
            .metadata
            .name
            .as_deref()
            .context("ConfigMap has no name")?;
        let namespace = config_map
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());

        self.api(namespace)
            .replace(name, &PostParams::default(), config_map)
            .await
            .with_context(|| format!("Failed to update configmap {namespace}/{name}"))
    }

    /// Delete a configmap; deleting an absent configmap is not an error
    pub async fn delete(&self, name: &str, namespace: &str) -> Result<()> {
        let api = self.api(namespace);
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .context("Failed to delete configmap")?;
        Ok(())
    }
}
