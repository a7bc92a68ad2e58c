//! Service and NetworkPolicy manifest builders

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::api::networking::v1::{
    NetworkPolicy, NetworkPolicyIngressRule, NetworkPolicyPeer, NetworkPolicySpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::core::ObjectMeta;
use std::collections::BTreeMap;

/// Builder for test services
#[derive(Clone, Debug)]
pub struct ServiceBuilder {
    name: String,
    namespace: String,
    selector: BTreeMap<String, String>,
    port: i32,
    target_port: Option<i32>,
    type_: Option<String>,
}

impl ServiceBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            selector: BTreeMap::new(),
            port: 80,
            target_port: None,
            type_: None,
        }
    }

    pub fn selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.selector.insert(key.into(), value.into());
        self
    }

    pub fn port(mut self, port: i32) -> Self {
        self.port = port;
        self
    }

    pub fn target_port(mut self, port: i32) -> Self {
        self.target_port = Some(port);
        self
    }

    pub fn type_(mut self, type_: impl Into<String>) -> Self {
        self.type_ = Some(type_.into());
        self
    }

    pub fn build(&self) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                selector: if self.selector.is_empty() {
                    None
                } else {
                    Some(self.selector.clone())
                },
                ports: Some(vec![ServicePort {
                    port: self.port,
                    target_port: self.target_port.map(IntOrString::Int),
                    protocol: Some("TCP".to_string()),
                    ..Default::default()
                }]),
                type_: self.type_.clone(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Builder for test network policies
#[derive(Clone, Debug)]
pub struct NetworkPolicyBuilder {
    name: String,
    namespace: String,
    pod_selector: BTreeMap<String, String>,
    ingress_from: Vec<BTreeMap<String, String>>,
    deny_all_ingress: bool,
}

impl NetworkPolicyBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            pod_selector: BTreeMap::new(),
            ingress_from: Vec::new(),
            deny_all_ingress: false,
        }
    }

    /// Select the pods this policy applies to; an empty selector matches
    /// every pod in the namespace
    pub fn pod_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pod_selector.insert(key.into(), value.into());
        self
    }

    /// Deny all ingress to the selected pods
    pub fn deny_all_ingress(mut self) -> Self {
        self.deny_all_ingress = true;
        self
    }

    /// Allow ingress from pods matching the given labels
    pub fn allow_ingress_from(mut self, labels: BTreeMap<String, String>) -> Self {
        self.ingress_from.push(labels);
        self
    }

    pub fn build(&self) -> NetworkPolicy {
        let ingress = if self.deny_all_ingress {
            Some(Vec::new())
        } else if self.ingress_from.is_empty() {
            None
        } else {
            Some(vec![NetworkPolicyIngressRule {
                from: Some(
                    self.ingress_from
                        .iter()
                        .map(|labels| NetworkPolicyPeer {
                            pod_selector: Some(LabelSelector {
                                match_labels: Some(labels.clone()),
                                ..Default::default()
                            }),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }])
        };

        NetworkPolicy {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(NetworkPolicySpec {
                pod_selector: LabelSelector {
                    match_labels: if self.pod_selector.is_empty() {
                        None
                    } else {
                        Some(self.pod_selector.clone())
                    },
                    ..Default::default()
                },
                policy_types: Some(vec!["Ingress".to_string()]),
                ingress,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_builder() {
        let service = ServiceBuilder::new("backend", "testkit")
            .selector("app", "server")
            .port(8080)
            .target_port(80)
            .type_("NodePort")
            .build();

        let spec = service.spec.unwrap();
        assert_eq!(spec.type_.as_deref(), Some("NodePort"));

        let port = &spec.ports.unwrap()[0];
        assert_eq!(port.port, 8080);
        assert_eq!(port.target_port, Some(IntOrString::Int(80)));
    }

    #[test]
    fn test_deny_all_ingress_policy() {
        let policy = NetworkPolicyBuilder::new("deny-all", "testkit")
            .deny_all_ingress()
            .build();

        let spec = policy.spec.unwrap();
        // An empty ingress list denies everything; a missing one allows it
        assert_eq!(spec.ingress, Some(Vec::new()));
        assert!(spec.pod_selector.match_labels.is_none());
    }

    #[test]
    fn test_allow_from_policy() {
        let mut from = BTreeMap::new();
        from.insert("role".to_string(), "client".to_string());

        let policy = NetworkPolicyBuilder::new("allow-clients", "testkit")
            .pod_selector("app", "server")
            .allow_ingress_from(from)
            .build();

        let spec = policy.spec.unwrap();
        let rules = spec.ingress.unwrap();
        let peers = rules[0].from.as_ref().unwrap();
        assert_eq!(
            peers[0]
                .pod_selector
                .as_ref()
                .unwrap()
                .match_labels
                .as_ref()
                .unwrap()
                .get("role"),
            Some(&"client".to_string())
        );
    }
}
