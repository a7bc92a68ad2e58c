//! Kubernetes client wrapper
//!
//! Provides a high-level interface to the Kubernetes API.

#![allow(dead_code)]

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{
    api::{Api, ListParams},
    Client, Config,
};
use tracing::{info, warn};

/// Kubernetes client wrapper
#[derive(Clone)]
pub struct K8sClient {
    client: Client,
    namespace: String,
}

impl K8sClient {
    /// Create a new Kubernetes client from the ambient kubeconfig or
    /// in-cluster environment
    pub async fn try_default(namespace: impl Into<String>) -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client")?;

        Ok(Self {
            client,
            namespace: namespace.into(),
        })
    }

    /// Create client with custom config
    pub async fn with_config(config: Config, namespace: impl Into<String>) -> Result<Self> {
        let client =
            Client::try_from(config).context("Failed to create Kubernetes client from config")?;

        Ok(Self {
            client,
            namespace: namespace.into(),
        })
    }

    /// Get the underlying kube client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the default namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Check that the API server is reachable
    pub async fn cluster_reachable(&self) -> bool {
        match self.client.apiserver_version().await {
            Ok(version) => {
                info!("API server reachable ({}.{})", version.major, version.minor);
                true
            }
            Err(e) => {
                warn!("API server unreachable: {e}");
                false
            }
        }
    }

    /// Check that every named CRD is installed
    pub async fn crds_installed(&self, names: &[&str]) -> Result<bool> {
        let crds: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        let crd_list = crds
            .list(&ListParams::default())
            .await
            .context("Failed to list CRDs")?;

        let found = crd_list
            .items
            .iter()
            .filter(|crd| {
                crd.metadata
                    .name
                    .as_ref()
                    .map(|n| names.contains(&n.as_str()))
                    .unwrap_or(false)
            })
            .count();

        let installed = found == names.len();
        if !installed {
            warn!("CRDs not fully installed ({}/{})", found, names.len());
        }

        Ok(installed)
    }

    /// Check if a specific CRD exists by its full name, e.g.
    /// `eniconfigs.crd.k8s.amazonaws.com`
    pub async fn crd_exists(&self, name: &str) -> Result<bool> {
        let crds: Api<CustomResourceDefinition> = Api::all(self.client.clone());

        match crds.get(name).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
            Err(e) => Err(e).context("Failed to check CRD existence"),
        }
    }

    /// Check if namespace exists
    pub async fn namespace_exists(&self, name: &str) -> Result<bool> {
        let namespaces: Api<Namespace> = Api::all(self.client.clone());

        match namespaces.get(name).await {
            Ok(_) => Ok(true),
            Err(kube::Error::Api(e)) if e.code == 404 => Ok(false),
            Err(e) => Err(e).context("Failed to check namespace existence"),
        }
    }

    /// Create an API handle for a namespaced resource type in the default
    /// namespace
    pub fn namespaced_api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = kube::core::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    /// Create an API handle for a namespaced resource type in a specific
    /// namespace
    pub fn namespaced_api_in<K>(&self, namespace: &str) -> Api<K>
    where
        K: kube::Resource<Scope = kube::core::NamespaceResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Create an API handle for a cluster-scoped resource type
    pub fn cluster_api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = kube::core::ClusterResourceScope>,
        <K as kube::Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }
}
