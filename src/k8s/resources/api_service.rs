//! APIService management
//!
//! Inspects aggregated API registrations (e.g. metrics servers) that
//! tests depend on.

use anyhow::{Context, Result};
use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::APIService;
use kube::api::{Api, DeleteParams, ListParams};
use kube::runtime::wait::{await_condition, Condition};
use tracing::info;

use crate::config::WaitConfig;
use crate::k8s::resources::allow_missing;
use crate::k8s::K8sClient;

/// APIService manager for test operations
pub struct ApiServiceManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl ApiServiceManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self) -> Api<APIService> {
        self.client.cluster_api()
    }

    /// Get an APIService by name, e.g. `v1beta1.metrics.k8s.io`
    pub async fn get(&self, name: &str) -> Result<APIService> {
        self.api()
            .get(name)
            .await
            .with_context(|| format!("Failed to get APIService {name}"))
    }

    /// List all registered APIServices
    pub async fn list(&self) -> Result<Vec<APIService>> {
        let list = self
            .api()
            .list(&ListParams::default())
            .await
            .context("Failed to list APIServices")?;
        Ok(list.items)
    }

    /// Wait until the named APIService reports Available
    pub async fn wait_available(&self, name: &str) -> Result<()> {
        let cond = await_condition(self.api(), name, is_api_service_available());

        tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for APIService {name}"))?
            .with_context(|| format!("Error waiting for APIService {name}"))?;

        info!("APIService {name} is available");
        Ok(())
    }

    /// Delete an APIService; deleting an absent one is not an error
    pub async fn delete(&self, name: &str) -> Result<()> {
        let api = self.api();
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .with_context(|| format!("Failed to delete APIService {name}"))?;
        Ok(())
    }
}

/// APIService carries the Available condition with status True
fn is_api_service_available() -> impl Condition<APIService> {
    |obj: Option<&APIService>| {
        obj.and_then(|svc| svc.status.as_ref())
            .and_then(|status| status.conditions.as_ref())
            .map(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.type_ == "Available" && c.status == "True")
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::{
        APIServiceCondition, APIServiceStatus,
    };

    fn api_service_with(status: &str) -> APIService {
        APIService {
            status: Some(APIServiceStatus {
                conditions: Some(vec![APIServiceCondition {
                    type_: "Available".to_string(),
                    status: status.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_available_condition() {
        assert!(is_api_service_available().matches_object(Some(&api_service_with("True"))));
        assert!(!is_api_service_available().matches_object(Some(&api_service_with("False"))));
        assert!(!is_api_service_available().matches_object(Some(&APIService::default())));
        assert!(!is_api_service_available().matches_object(None));
    }
}
