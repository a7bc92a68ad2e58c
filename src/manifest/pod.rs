//! Pod manifest builder
//!
//! Defaults to a sleep-forever busybox container so tests get a pod that
//! schedules quickly and stays up until torn down.

use k8s_openapi::api::core::v1::{Container, Pod, PodSpec, PodTemplateSpec};
use kube::core::ObjectMeta;
use std::collections::BTreeMap;

use super::MANAGED_BY_LABEL;

/// Builder for test pods
#[derive(Clone, Debug)]
pub struct PodBuilder {
    name: String,
    namespace: String,
    image: String,
    command: Vec<String>,
    args: Vec<String>,
    labels: BTreeMap<String, String>,
    node_selector: BTreeMap<String, String>,
    restart_policy: String,
    host_network: bool,
}

impl PodBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(MANAGED_BY_LABEL.0.to_string(), MANAGED_BY_LABEL.1.to_string());

        Self {
            name: name.into(),
            namespace: namespace.into(),
            image: "busybox:stable".to_string(),
            command: vec!["sleep".to_string(), "infinity".to_string()],
            args: Vec::new(),
            labels,
            node_selector: BTreeMap::new(),
            restart_policy: "Never".to_string(),
            host_network: false,
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn node_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.node_selector.insert(key.into(), value.into());
        self
    }

    pub fn restart_policy(mut self, policy: impl Into<String>) -> Self {
        self.restart_policy = policy.into();
        self
    }

    pub fn host_network(mut self) -> Self {
        self.host_network = true;
        self
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Build the pod object
    pub fn build(&self) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                labels: Some(self.labels.clone()),
                ..Default::default()
            },
            spec: Some(self.pod_spec()),
            ..Default::default()
        }
    }

    /// Build a pod template for embedding into workload objects
    pub fn template(&self) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(self.labels.clone()),
                ..Default::default()
            }),
            spec: Some(self.pod_spec()),
        }
    }

    fn pod_spec(&self) -> PodSpec {
        PodSpec {
            containers: vec![Container {
                name: "test".to_string(),
                image: Some(self.image.clone()),
                command: if self.command.is_empty() {
                    None
                } else {
                    Some(self.command.clone())
                },
                args: if self.args.is_empty() {
                    None
                } else {
                    Some(self.args.clone())
                },
                ..Default::default()
            }],
            restart_policy: Some(self.restart_policy.clone()),
            node_selector: if self.node_selector.is_empty() {
                None
            } else {
                Some(self.node_selector.clone())
            },
            host_network: if self.host_network { Some(true) } else { None },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pod_defaults() {
        let pod = PodBuilder::new("probe", "testkit").build();

        assert_eq!(pod.metadata.name.as_deref(), Some("probe"));
        assert_eq!(pod.metadata.namespace.as_deref(), Some("testkit"));

        let spec = pod.spec.unwrap();
        assert_eq!(spec.restart_policy.as_deref(), Some("Never"));
        assert_eq!(
            spec.containers[0].command.as_ref().unwrap(),
            &vec!["sleep".to_string(), "infinity".to_string()]
        );
    }

    #[test]
    fn test_pod_overrides() {
        let pod = PodBuilder::new("probe", "testkit")
            .image("alpine:3.19")
            .label("role", "client")
            .node_selector("kubernetes.io/os", "linux")
            .host_network()
            .build();

        let spec = pod.spec.unwrap();
        assert_eq!(spec.containers[0].image.as_deref(), Some("alpine:3.19"));
        assert_eq!(spec.host_network, Some(true));
        assert_eq!(
            spec.node_selector.unwrap().get("kubernetes.io/os"),
            Some(&"linux".to_string())
        );
        assert_eq!(
            pod.metadata.labels.unwrap().get("role"),
            Some(&"client".to_string())
        );
    }

    #[test]
    fn test_template_carries_labels() {
        let template = PodBuilder::new("probe", "testkit")
            .label("app", "server")
            .template();

        assert_eq!(
            template.metadata.unwrap().labels.unwrap().get("app"),
            Some(&"server".to_string())
        );
        assert!(template.spec.is_some());
    }
}
