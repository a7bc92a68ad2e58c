//! Deployment management
//!
//! Creates deployments and waits until all replicas are available.

use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Api, DeleteParams, PostParams};
use kube::runtime::wait::{await_condition, Condition};
use tracing::info;

use crate::config::WaitConfig;
use crate::k8s::resources::{allow_missing, is_gone};
use crate::k8s::K8sClient;
use crate::utils::poll_until;
use crate::utils::timer::Timer;

/// Deployment manager for test operations
pub struct DeploymentManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl DeploymentManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self, namespace: &str) -> Api<Deployment> {
        self.client.namespaced_api_in(namespace)
    }

    /// Create a deployment
    pub async fn create(&self, deployment: &Deployment) -> Result<Deployment> {
        let namespace = deployment
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());
        self.api(namespace)
            .create(&PostParams::default(), deployment)
            .await
            .context("Failed to create deployment")
    }

    /// Create a deployment and wait until all replicas are available
    pub async fn create_and_wait_available(&self, deployment: &Deployment) -> Result<Deployment> {
        let created = self.create(deployment).await?;
        let name = created
            .metadata
            .name
            .clone()
            .context("Created deployment has no name")?;
        let namespace = created
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| self.client.namespace().to_string());

        self.wait_available(&name, &namespace).await?;
        self.api(&namespace)
            .get(&name)
            .await
            .context("Failed to fetch deployment after rollout")
    }

    /// Get a deployment by name
    pub async fn get(&self, name: &str, namespace: &str) -> Result<Deployment> {
        self.api(namespace)
            .get(name)
            .await
            .with_context(|| format!("Failed to get deployment {namespace}/{name}"))
    }

    /// Replace an existing deployment; the passed object must carry the
    /// resource version of the revision it was read from
    pub async fn update(&self, deployment: &Deployment) -> Result<Deployment> {
        let name = deployment
            .metadata
            .name
            .as_deref()
            .context("Deployment has no name")?;
        let namespace = deployment
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());

        self.api(namespace)
            .replace(name, &PostParams::default(), deployment)
            .await
            .with_context(|| format!("Failed to update deployment {namespace}/{name}"))
    }

    /// Wait until the deployment reports all desired replicas available
    pub async fn wait_available(&self, name: &str, namespace: &str) -> Result<()> {
        let timer = Timer::start(format!("deployment {namespace}/{name} rollout"));
        let cond = await_condition(self.api(namespace), name, is_deployment_available());

        tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for deployment {namespace}/{name} rollout"))?
            .with_context(|| format!("Error waiting for deployment {namespace}/{name}"))?;

        timer.stop();
        info!("Deployment {namespace}/{name} is available");
        Ok(())
    }

    /// Delete a deployment and wait until it is gone
    pub async fn delete_and_wait(&self, name: &str, namespace: &str) -> Result<()> {
        let api = self.api(namespace);
        allow_missing(api.delete(name, &DeleteParams::foreground()).await)
            .context("Failed to delete deployment")?;

        poll_until(
            &format!("deployment {namespace}/{name} deletion"),
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

/// All desired replicas are available at the current observed generation
fn is_deployment_available() -> impl Condition<Deployment> {
    |obj: Option<&Deployment>| {
        let Some(deployment) = obj else { return false };
        let desired = deployment.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
        let Some(status) = deployment.status.as_ref() else {
            return false;
        };

        let generation_seen = match (deployment.metadata.generation, status.observed_generation) {
            (Some(generation), Some(observed)) => observed >= generation,
            _ => true,
        };

        generation_seen && status.available_replicas.unwrap_or(0) >= desired
    }
}
