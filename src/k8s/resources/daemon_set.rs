//! DaemonSet management
//!
//! Creates daemonsets and waits until every scheduled pod is ready.

use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::DaemonSet;
use kube::api::{Api, DeleteParams, PostParams};
use kube::runtime::wait::{await_condition, Condition};
use tracing::info;

use crate::config::WaitConfig;
use crate::k8s::resources::{allow_missing, is_gone};
use crate::k8s::K8sClient;
use crate::utils::poll_until;

/// DaemonSet manager for test operations
pub struct DaemonSetManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl DaemonSetManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self, namespace: &str) -> Api<DaemonSet> {
        self.client.namespaced_api_in(namespace)
    }

    /// Create a daemonset
    pub async fn create(&self, daemon_set: &DaemonSet) -> Result<DaemonSet> {
        let namespace = daemon_set
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());
        self.api(namespace)
            .create(&PostParams::default(), daemon_set)
            .await
            .context("Failed to create daemonset")
    }

    /// Get a daemonset by name
    pub async fn get(&self, name: &str, namespace: &str) -> Result<DaemonSet> {
        self.api(namespace)
            .get(name)
            .await
            .with_context(|| format!("Failed to get daemonset {namespace}/{name}"))
    }

    /// Replace an existing daemonset; the passed object must carry the
    /// resource version of the revision it was read from
    pub async fn update(&self, daemon_set: &DaemonSet) -> Result<DaemonSet> {
        let name = daemon_set
            .metadata
            .name
            .as_deref()
            .context("DaemonSet has no name")?;
        let namespace = daemon_set
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());

        self.api(namespace)
            .replace(name, &PostParams::default(), daemon_set)
            .await
            .with_context(|| format!("Failed to update daemonset {namespace}/{name}"))
    }

    /// Wait until every desired pod of the daemonset is ready
    pub async fn wait_ready(&self, name: &str, namespace: &str) -> Result<()> {
        let cond = await_condition(self.api(namespace), name, is_daemon_set_ready());

        tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for daemonset {namespace}/{name}"))?
            .with_context(|| format!("Error waiting for daemonset {namespace}/{name}"))?;

        info!("DaemonSet {namespace}/{name} is ready");
        Ok(())
    }

    /// Delete a daemonset and wait until it is gone
    pub async fn delete_and_wait(&self, name: &str, namespace: &str) -> Result<()> {
        let api = self.api(namespace);
        allow_missing(api.delete(name, &DeleteParams::foreground()).await)
            .context("Failed to delete daemonset")?;

        poll_until(
            &format!("daemonset {namespace}/{name} deletion"),
            self.wait.timeout(),
            self.wait.interval(),
            || {
                let api = api.clone();
                let name = name.to_string();
                async move { is_gone(&api, &name).await }
            },
        )
        .await?;

        Ok(())
    }
}

/// Every node that should run the daemonset has a ready pod
fn is_daemon_set_ready() -> impl Condition<DaemonSet> {
    |obj: Option<&DaemonSet>| {
        obj.and_then(|ds| ds.status.as_ref())
            .map(|status| {
                status.desired_number_scheduled > 0
                    && status.number_ready == status.desired_number_scheduled
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::DaemonSetStatus;

    fn daemon_set(desired: i32, ready: i32) -> DaemonSet {
        DaemonSet {
            status: Some(DaemonSetStatus {
                desired_number_scheduled: desired,
                number_ready: ready,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_when_counts_match() {
        assert!(is_daemon_set_ready().matches_object(Some(&daemon_set(4, 4))));
    }

    #[test]
    fn test_not_ready_while_rolling() {
        assert!(!is_daemon_set_ready().matches_object(Some(&daemon_set(4, 2))));
    }

    #[test]
    fn test_not_ready_with_zero_desired() {
        // No nodes scheduled yet means the controller has not acted
        assert!(!is_daemon_set_ready().matches_object(Some(&daemon_set(0, 0))));
        assert!(!is_daemon_set_ready().matches_object(Some(&DaemonSet::default())));
    }
}
