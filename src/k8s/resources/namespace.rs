//! Namespace management
//!
//! Per-test namespace isolation: create, tear down, and recreate.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::{Api, DeleteParams, PostParams};
use kube::core::ObjectMeta;
use std::collections::BTreeMap;
use tracing::info;

use crate::config::WaitConfig;
use crate::k8s::resources::{allow_missing, is_gone};
use crate::k8s::K8sClient;
use crate::utils::poll_until;

/// Namespace manager for test operations
pub struct NamespaceManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl NamespaceManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self) -> Api<Namespace> {
        self.client.cluster_api()
    }

    /// Create a namespace with the given labels
    pub async fn create(&self, name: &str, labels: BTreeMap<String, String>) -> Result<Namespace> {
        let namespace = build_namespace(name, labels);

        let created = self
            .api()
            .create(&PostParams::default(), &namespace)
            .await
            .with_context(|| format!("Failed to create namespace {name}"))?;

        info!("Created namespace {name}");
        Ok(created)
    }

    /// Get a namespace by name
    pub async fn get(&self, name: &str) -> Result<Namespace> {
        self.api()
            .get(name)
            .await
            .with_context(|| format!("Failed to get namespace {name}"))
    }

    /// Check whether a namespace exists
    pub async fn exists(&self, name: &str) -> Result<bool> {
        self.client.namespace_exists(name).await
    }

    /// Delete a namespace and wait until the API server has finished
    /// tearing it down (namespaces linger in Terminating while their
    /// contents are reaped)
    pub async fn delete_and_wait(&self, name: &str) -> Result<()> {
        let api = self.api();
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .with_context(|| format!("Failed to delete namespace {name}"))?;

        poll_until(
            &format!("namespace {name} deletion"),
            self.wait.timeout(),
            self.wait.interval(),
            || {
                let api = api.clone();
                let name = name.to_string();
                async move { is_gone(&api, &name).await }
            },
        )
        .await?;

        info!("Deleted namespace {name}");
        Ok(())
    }

    /// Delete the namespace if present, then create it fresh
    pub async fn recreate(
        &self,
        name: &str,
        labels: BTreeMap<String, String>,
    ) -> Result<Namespace> {
        if self.exists(name).await? {
            self.delete_and_wait(name).await?;
        }
        self.create(name, labels).await
    }
}

fn build_namespace(name: &str, labels: BTreeMap<String, String>) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: if labels.is_empty() {
                None
            } else {
                Some(labels)
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_namespace() {
        let mut labels = BTreeMap::new();
        labels.insert("team".to_string(), "networking".to_string());

        let ns = build_namespace("test-ns", labels);
        assert_eq!(ns.metadata.name.as_deref(), Some("test-ns"));
        assert_eq!(
            ns.metadata.labels.unwrap().get("team").map(String::as_str),
            Some("networking")
        );
    }

    #[test]
    fn test_build_namespace_without_labels() {
        let ns = build_namespace("bare", BTreeMap::new());
        assert!(ns.metadata.labels.is_none());
    }
}
