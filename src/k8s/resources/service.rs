//! Service management
//!
//! Creates services and resolves their cluster addresses for tests.

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, DeleteParams, ListParams, PostParams};

use crate::config::WaitConfig;
use crate::k8s::resources::{allow_missing, is_gone};
use crate::k8s::K8sClient;
use crate::utils::poll_until;

/// Service manager for test operations
pub struct ServiceManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl ServiceManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self, namespace: &str) -> Api<Service> {
        self.client.namespaced_api_in(namespace)
    }

    /// Create a service
    pub async fn create(&self, service: &Service) -> Result<Service> {
        let namespace = service
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());
        self.api(namespace)
            .create(&PostParams::default(), service)
            .await
            .context("Failed to create service")
    }

    /// Get a service by name
    pub async fn get(&self, name: &str, namespace: &str) -> Result<Service> {
        self.api(namespace)
            .get(name)
            .await
            .with_context(|| format!("Failed to get service {namespace}/{name}"))
    }

    /// List services with optional label selector
    pub async fn list(
        &self,
        namespace: &str,
        label_selector: Option<&str>,
    ) -> Result<Vec<Service>> {
        let params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };
        let list = self
            .api(namespace)
            .list(&params)
            .await
            .context("Failed to list services")?;
        Ok(list.items)
    }

    /// Resolve a service's cluster IP, if it has been assigned one
    pub async fn cluster_ip(&self, name: &str, namespace: &str) -> Result<Option<String>> {
        let service = self.get(name, namespace).await?;
        Ok(cluster_ip_of(&service))
    }

    /// Delete a service and wait until it is gone
    pub async fn delete_and_wait(&self, name: &str, namespace: &str) -> Result<()> {
        let api = self.api(namespace);
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .context("Failed to delete service")?;

        poll_until(
            &format!("service {namespace}/{name} deletion"),
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

fn cluster_ip_of(service: &Service) -> Option<String> {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.cluster_ip.clone())
        // Headless services report "None" as a literal string
        .filter(|ip| ip != "None")
}
