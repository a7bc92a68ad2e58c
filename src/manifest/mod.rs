//! Test object builders
//!
//! Fluent builders producing `k8s-openapi` objects with sensible test
//! defaults, plus YAML/JSON serialization helpers.

mod config_map;
mod network;
mod pod;
mod workload;

pub use config_map::ConfigMapBuilder;
pub use network::{NetworkPolicyBuilder, ServiceBuilder};
pub use pod::PodBuilder;
pub use workload::{DaemonSetBuilder, DeploymentBuilder, JobBuilder};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Label applied to every object the builders produce
pub const MANAGED_BY_LABEL: (&str, &str) = ("app.kubernetes.io/managed-by", "kube-testkit");

/// Serialize a manifest to YAML
pub fn to_yaml<T: Serialize>(manifest: &T) -> Result<String> {
    serde_yaml::to_string(manifest).context("Failed to serialize manifest to YAML")
}

/// Serialize a manifest to pretty JSON
pub fn to_json<T: Serialize>(manifest: &T) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("Failed to serialize manifest to JSON")
}

/// Load a manifest from a YAML file
pub fn from_yaml_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let content = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read manifest {}", path.as_ref().display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest {}", path.as_ref().display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Pod;

    #[test]
    fn test_to_yaml() {
        let pod = PodBuilder::new("probe", "default").build();
        let yaml = to_yaml(&pod).unwrap();

        assert!(yaml.contains("name: probe"));
        assert!(yaml.contains("namespace: default"));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pod.yaml");

        let pod = PodBuilder::new("probe", "default").build();
        std::fs::write(&path, to_yaml(&pod).unwrap()).unwrap();

        let loaded: Pod = from_yaml_file(&path).unwrap();
        assert_eq!(loaded.metadata.name.as_deref(), Some("probe"));
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let result: Result<Pod> = from_yaml_file("/definitely/not/here.yaml");
        assert!(result.is_err());
    }
}
