//! Node management
//!
//! Lists and labels cluster nodes and waits for node readiness.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, ListParams, Patch, PatchParams};
use serde_json::json;
use tracing::info;

use crate::config::WaitConfig;
use crate::k8s::K8sClient;
use crate::utils::poll_until;

/// Node manager for test operations
pub struct NodeManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl NodeManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self) -> Api<Node> {
        self.client.cluster_api()
    }

    /// List nodes with optional label selector
    pub async fn list(&self, label_selector: Option<&str>) -> Result<Vec<Node>> {
        let params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };
        let list = self
            .api()
            .list(&params)
            .await
            .context("Failed to list nodes")?;
        Ok(list.items)
    }

    /// Get a node by name
    pub async fn get(&self, name: &str) -> Result<Node> {
        self.api()
            .get(name)
            .await
            .with_context(|| format!("Failed to get node {name}"))
    }

    /// Count nodes currently reporting Ready
    pub async fn ready_count(&self, label_selector: Option<&str>) -> Result<usize> {
        let nodes = self.list(label_selector).await?;
        Ok(nodes.iter().filter(|n| node_ready(n)).count())
    }

    /// Wait until at least `count` nodes matching the selector are Ready
    pub async fn wait_ready_count(&self, label_selector: Option<&str>, count: usize) -> Result<()> {
        let api = self.api();
        let params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };

        poll_until(
            &format!("{count} ready nodes"),
            self.wait.timeout(),
            self.wait.interval(),
            || {
                let api = api.clone();
                let params = params.clone();
                async move {
                    let nodes = api.list(&params).await.context("Failed to list nodes")?;
                    Ok(nodes.items.iter().filter(|n| node_ready(n)).count() >= count)
                }
            },
        )
        .await?;

        info!("{count} nodes are ready");
        Ok(())
    }

    /// Add or overwrite labels on a node
    pub async fn add_labels(&self, name: &str, labels: &[(&str, &str)]) -> Result<Node> {
        let labels: serde_json::Map<String, serde_json::Value> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();

        self.patch_labels(name, labels).await
    }

    /// Remove labels from a node
    pub async fn remove_labels(&self, name: &str, keys: &[&str]) -> Result<Node> {
        let labels: serde_json::Map<String, serde_json::Value> = keys
            .iter()
            .map(|k| (k.to_string(), serde_json::Value::Null))
            .collect();

        self.patch_labels(name, labels).await
    }

    async fn patch_labels(
        &self,
        name: &str,
        labels: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Node> {
        let patch = json!({ "metadata": { "labels": labels } });

        self.api()
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("Failed to patch labels on node {name}"))
    }
}

fn node_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
        .unwrap_or(false)
}
