//! Workload manifest builders
//!
//! Jobs, Deployments, and DaemonSets wrapping the pod builder for their
//! templates.

use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec};
use k8s_openapi::api::batch::v1::{Job, JobSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use kube::core::ObjectMeta;

use super::PodBuilder;

/// Builder for test jobs
#[derive(Clone, Debug)]
pub struct JobBuilder {
    name: String,
    namespace: String,
    pod: PodBuilder,
    backoff_limit: i32,
    completions: Option<i32>,
    parallelism: Option<i32>,
}

impl JobBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let pod = PodBuilder::new(format!("{name}-pod"), namespace.clone())
            .label("job-name", name.clone());

        Self {
            name,
            namespace,
            pod,
            backoff_limit: 0,
            completions: None,
            parallelism: None,
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.pod = self.pod.image(image);
        self
    }

    pub fn command(mut self, command: Vec<String>) -> Self {
        self.pod = self.pod.command(command);
        self
    }

    pub fn backoff_limit(mut self, limit: i32) -> Self {
        self.backoff_limit = limit;
        self
    }

    pub fn completions(mut self, completions: i32) -> Self {
        self.completions = Some(completions);
        self
    }

    pub fn parallelism(mut self, parallelism: i32) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    pub fn build(&self) -> Job {
        Job {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(JobSpec {
                template: self.pod.template(),
                backoff_limit: Some(self.backoff_limit),
                completions: self.completions,
                parallelism: self.parallelism,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Builder for test deployments
#[derive(Clone, Debug)]
pub struct DeploymentBuilder {
    name: String,
    namespace: String,
    pod: PodBuilder,
    replicas: i32,
}

impl DeploymentBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let pod = PodBuilder::new(format!("{name}-pod"), namespace.clone())
            .label("app", name.clone())
            .restart_policy("Always");

        Self {
            name,
            namespace,
            pod,
            replicas: 1,
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.pod = self.pod.image(image);
        self
    }

    pub fn command(mut self, command: Vec<String>) -> Self {
        self.pod = self.pod.command(command);
        self
    }

    pub fn replicas(mut self, replicas: i32) -> Self {
        self.replicas = replicas;
        self
    }

    pub fn pod_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pod = self.pod.label(key, value);
        self
    }

    pub fn node_selector(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pod = self.pod.node_selector(key, value);
        self
    }

    pub fn build(&self) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas: Some(self.replicas),
                selector: LabelSelector {
                    match_labels: Some(self.pod.labels().clone()),
                    ..Default::default()
                },
                template: self.pod.template(),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// Builder for test daemonsets
#[derive(Clone, Debug)]
pub struct DaemonSetBuilder {
    name: String,
    namespace: String,
    pod: PodBuilder,
}

impl DaemonSetBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        let name = name.into();
        let namespace = namespace.into();
        let pod = PodBuilder::new(format!("{name}-pod"), namespace.clone())
            .label("app", name.clone())
            .restart_policy("Always");

        Self {
            name,
            namespace,
            pod,
        }
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.pod = self.pod.image(image);
        self
    }

    pub fn command(mut self, command: Vec<String>) -> Self {
        self.pod = self.pod.command(command);
        self
    }

    pub fn host_network(mut self) -> Self {
        self.pod = self.pod.host_network();
        self
    }

    pub fn build(&self) -> DaemonSet {
        DaemonSet {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            spec: Some(DaemonSetSpec {
                selector: LabelSelector {
                    match_labels: Some(self.pod.labels().clone()),
                    ..Default::default()
                },
                template: self.pod.template(),
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
    fn test_job_defaults() {
        let job = JobBuilder::new("migrate", "testkit").build();
        let spec = job.spec.unwrap();

        // Fail fast in tests: no retries unless asked for
        assert_eq!(spec.backoff_limit, Some(0));
        assert_eq!(
            spec.template
                .metadata
                .unwrap()
                .labels
                .unwrap()
                .get("job-name"),
            Some(&"migrate".to_string())
        );
    }

    #[test]
    fn test_job_parallelism() {
        let job = JobBuilder::new("fanout", "testkit")
            .completions(4)
            .parallelism(2)
            .build();
        let spec = job.spec.unwrap();

        assert_eq!(spec.completions, Some(4));
        assert_eq!(spec.parallelism, Some(2));
    }

    #[test]
    fn test_deployment_selector_matches_template() {
        let deployment = DeploymentBuilder::new("server", "testkit")
            .replicas(3)
            .pod_label("tier", "backend")
            .build();
        let spec = deployment.spec.unwrap();

        assert_eq!(spec.replicas, Some(3));

        let selector = spec.selector.match_labels.unwrap();
        let template_labels = spec.template.metadata.unwrap().labels.unwrap();
        assert_eq!(selector, template_labels);
        assert_eq!(selector.get("app"), Some(&"server".to_string()));
    }

    #[test]
    fn test_daemon_set_host_network() {
        let ds = DaemonSetBuilder::new("agent", "kube-system")
            .host_network()
            .build();

        let pod_spec = ds.spec.unwrap().template.spec.unwrap();
        assert_eq!(pod_spec.host_network, Some(true));
        assert_eq!(pod_spec.restart_policy.as_deref(), Some("Always"));
    }
}
