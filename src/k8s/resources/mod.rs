//! Per-resource-kind managers
//!
//! Each manager wraps the cluster client with CRUD and bounded waiting
//! for one Kubernetes resource kind.

mod api_service;
mod config_map;
mod custom_resource;
mod daemon_set;
mod deployment;
mod event;
mod job;
mod namespace;
mod network_policy;
mod node;
mod pod;
mod service;

pub use api_service::ApiServiceManager;
pub use config_map::ConfigMapManager;
pub use custom_resource::CustomResourceManager;
pub use daemon_set::DaemonSetManager;
pub use deployment::DeploymentManager;
pub use event::{recent, with_reason, EventManager};
pub use job::JobManager;
pub use namespace::NamespaceManager;
pub use network_policy::NetworkPolicyManager;
pub use node::NodeManager;
pub use pod::PodManager;
pub use service::ServiceManager;

use kube::api::Api;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Map a 404 from the API server to `None`; test teardown is idempotent
/// and deleting an already-gone object is a success.
pub(crate) fn allow_missing<T>(result: kube::Result<T>) -> kube::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(kube::Error::Api(e)) if e.code == 404 => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check whether the named object no longer exists
pub(crate) async fn is_gone<K>(api: &Api<K>, name: &str) -> anyhow::Result<bool>
where
    K: kube::Resource + Clone + DeserializeOwned + Debug,
{
    match api.get(name).await {
        Ok(_) => Ok(false),
        Err(kube::Error::Api(e)) if e.code == 404 => Ok(true),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::core::ErrorResponse;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(ErrorResponse {
            status: "Failure".to_string(),
            message: "not found".to_string(),
            reason: "NotFound".to_string(),
            code,
        })
    }

    #[test]
    fn test_allow_missing_passes_ok() {
        assert_eq!(allow_missing(Ok(42)).unwrap(), Some(42));
    }

    #[test]
    fn test_allow_missing_swallows_404() {
        let result: kube::Result<u32> = Err(api_error(404));
        assert_eq!(allow_missing(result).unwrap(), None);
    }

    #[test]
    fn test_allow_missing_keeps_other_errors() {
        let result: kube::Result<u32> = Err(api_error(403));
        assert!(allow_missing(result).is_err());
    }
}
