//! Custom resource management
//!
//! Dynamic-typed CRUD for arbitrary group/version/kind objects, plus CRD
//! installation for tests that bring their own types.

use anyhow::{Context, Result};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{Api, ApiResource, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::core::GroupVersionKind;
use kube::runtime::wait::{await_condition, conditions::is_crd_established};
use tracing::info;

use crate::config::WaitConfig;
use crate::k8s::resources::{allow_missing, is_gone};
use crate::k8s::K8sClient;
use crate::utils::poll_until;

/// Custom resource manager for test operations
pub struct CustomResourceManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl CustomResourceManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn dynamic_api(&self, gvk: &GroupVersionKind, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = ApiResource::from_gvk(gvk);
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.client().clone(), ns, &resource),
            None => Api::all_with(self.client.client().clone(), &resource),
        }
    }

    fn crd_api(&self) -> Api<CustomResourceDefinition> {
        self.client.cluster_api()
    }

    /// Create a custom object of the given kind
    pub async fn create(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        object: &DynamicObject,
    ) -> Result<DynamicObject> {
        self.dynamic_api(gvk, namespace)
            .create(&PostParams::default(), object)
            .await
            .with_context(|| format!("Failed to create {} object", gvk.kind))
    }

    /// Get a custom object by name
    pub async fn get(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<DynamicObject> {
        self.dynamic_api(gvk, namespace)
            .get(name)
            .await
            .with_context(|| format!("Failed to get {} {name}", gvk.kind))
    }

    /// List custom objects of the given kind
    pub async fn list(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        label_selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        let params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };

        let list = self
            .dynamic_api(gvk, namespace)
            .list(&params)
            .await
            .with_context(|| format!("Failed to list {} objects", gvk.kind))?;
        Ok(list.items)
    }

    /// Delete a custom object; deleting an absent object is not an error
    pub async fn delete(
        &self,
        gvk: &GroupVersionKind,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<()> {
        let api = self.dynamic_api(gvk, namespace);
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .with_context(|| format!("Failed to delete {} {name}", gvk.kind))?;
        Ok(())
    }

    /// Install a CRD and wait until the API server reports it Established
    pub async fn create_crd(&self, crd: &CustomResourceDefinition) -> Result<()> {
        let name = crd.metadata.name.clone().context("CRD has no name")?;

        self.crd_api()
            .create(&PostParams::default(), crd)
            .await
            .with_context(|| format!("Failed to create CRD {name}"))?;

        let cond = await_condition(self.crd_api(), &name, is_crd_established());
        tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for CRD {name} to be established"))?
            .with_context(|| format!("Error waiting for CRD {name}"))?;

        info!("CRD {name} established");
        Ok(())
    }

    /// Delete a CRD and wait until it is gone, along with its objects
    pub async fn delete_crd(&self, name: &str) -> Result<()> {
        let api = self.crd_api();
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .with_context(|| format!("Failed to delete CRD {name}"))?;

        poll_until(
            &format!("CRD {name} deletion"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ApiResource;
    use kube::CustomResource;
    use schemars::JsonSchema;
    use serde::{Deserialize, Serialize};

    /// A minimal CRD, the shape a CNI test would install for per-node
    /// network configuration
    #[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
    #[kube(
        group = "testkit.dev",
        version = "v1alpha1",
        kind = "NodeNetConfig",
        namespaced
    )]
    struct NodeNetConfigSpec {
        subnet: String,
        security_groups: Vec<String>,
    }

    #[test]
    fn test_gvk_resolves_to_plural_path() {
        let gvk = GroupVersionKind::gvk("testkit.dev", "v1alpha1", "NodeNetConfig");
        let resource = ApiResource::from_gvk(&gvk);

        assert_eq!(resource.api_version, "testkit.dev/v1alpha1");
        assert_eq!(resource.plural, "nodenetconfigs");
    }

    #[test]
    fn test_derived_crd_matches_gvk() {
        use kube::CustomResourceExt;

        let crd = NodeNetConfig::crd();
        assert_eq!(
            crd.metadata.name.as_deref(),
            Some("nodenetconfigs.testkit.dev")
        );
        assert_eq!(crd.spec.group, "testkit.dev");
    }
}
