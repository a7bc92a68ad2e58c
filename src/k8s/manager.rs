//! Resource manager aggregator
//!
//! Bundles one manager per resource kind behind a single handle so test
//! suites wire up cluster access in one place.

use crate::config::WaitConfig;
use crate::k8s::resources::{
    ApiServiceManager, ConfigMapManager, CustomResourceManager, DaemonSetManager,
    DeploymentManager, EventManager, JobManager, NamespaceManager, NetworkPolicyManager,
    NodeManager, PodManager, ServiceManager,
};
use crate::k8s::K8sClient;

/// Aggregates the per-resource-kind managers for one cluster.
///
/// Construction never touches the API server; a misconfigured client only
/// surfaces once a manager operation runs. The aggregator is immutable
/// after construction and each accessor returns the same instance for the
/// aggregator's lifetime, so a shared reference can safely be handed to
/// concurrent test tasks.
pub struct ResourceManagers {
    jobs: JobManager,
    deployments: DeploymentManager,
    custom_resources: CustomResourceManager,
    namespaces: NamespaceManager,
    services: ServiceManager,
    nodes: NodeManager,
    pods: PodManager,
    daemon_sets: DaemonSetManager,
    config_maps: ConfigMapManager,
    network_policies: NetworkPolicyManager,
    events: EventManager,
    api_services: ApiServiceManager,
}

impl ResourceManagers {
    /// Construct all managers from an already-built client handle
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self {
            jobs: JobManager::new(client.clone(), wait),
            deployments: DeploymentManager::new(client.clone(), wait),
            custom_resources: CustomResourceManager::new(client.clone(), wait),
            namespaces: NamespaceManager::new(client.clone(), wait),
            services: ServiceManager::new(client.clone(), wait),
            nodes: NodeManager::new(client.clone(), wait),
            pods: PodManager::new(client.clone(), wait),
            daemon_sets: DaemonSetManager::new(client.clone(), wait),
            config_maps: ConfigMapManager::new(client.clone()),
            network_policies: NetworkPolicyManager::new(client.clone()),
            events: EventManager::new(client.clone()),
            api_services: ApiServiceManager::new(client, wait),
        }
    }

    /// Construct with default wait settings
    pub fn with_defaults(client: K8sClient) -> Self {
        Self::new(client, WaitConfig::default())
    }

    pub fn jobs(&self) -> &JobManager {
        &self.jobs
    }

    pub fn deployments(&self) -> &DeploymentManager {
        &self.deployments
    }

    pub fn custom_resources(&self) -> &CustomResourceManager {
        &self.custom_resources
    }

    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    pub fn services(&self) -> &ServiceManager {
        &self.services
    }

    pub fn nodes(&self) -> &NodeManager {
        &self.nodes
    }

    pub fn pods(&self) -> &PodManager {
        &self.pods
    }

    pub fn daemon_sets(&self) -> &DaemonSetManager {
        &self.daemon_sets
    }

    pub fn config_maps(&self) -> &ConfigMapManager {
        &self.config_maps
    }

    pub fn network_policies(&self) -> &NetworkPolicyManager {
        &self.network_policies
    }

    pub fn events(&self) -> &EventManager {
        &self.events
    }

    pub fn api_services(&self) -> &ApiServiceManager {
        &self.api_services
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // A client pointed at an unreachable endpoint; construction performs
    // no I/O, so this is enough to exercise the aggregator.
    async fn offline_client() -> K8sClient {
        let config = kube::Config::new("http://127.0.0.1:8080".parse().unwrap());
        K8sClient::with_config(config, "testkit").await.unwrap()
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_managers_are_shareable_across_tasks() {
        assert_send_sync::<ResourceManagers>();
    }

    #[tokio::test]
    async fn test_construction_builds_all_managers() {
        let managers = ResourceManagers::with_defaults(offline_client().await);

        // Touch every accessor; construction must not have failed or
        // panicked for any of the twelve.
        let _ = managers.jobs();
        let _ = managers.deployments();
        let _ = managers.custom_resources();
        let _ = managers.namespaces();
        let _ = managers.services();
        let _ = managers.nodes();
        let _ = managers.pods();
        let _ = managers.daemon_sets();
        let _ = managers.config_maps();
        let _ = managers.network_policies();
        let _ = managers.events();
        let _ = managers.api_services();
    }

    #[tokio::test]
    async fn test_accessors_are_referentially_stable() {
        let managers = ResourceManagers::with_defaults(offline_client().await);

        assert!(std::ptr::eq(managers.pods(), managers.pods()));
        assert!(std::ptr::eq(managers.jobs(), managers.jobs()));
        assert!(std::ptr::eq(managers.events(), managers.events()));
        assert!(std::ptr::eq(managers.api_services(), managers.api_services()));
    }
}
