//! Pod management for test execution
//!
//! Provides pod creation, readiness waiting, log capture, and in-pod
//! command execution.

use anyhow::{bail, Context, Result};
use futures::future;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams, LogParams, PostParams};
use kube::runtime::wait::{await_condition, conditions::is_pod_running, Condition};
use tracing::{debug, info};

use crate::config::WaitConfig;
use crate::k8s::resources::{allow_missing, is_gone};
use crate::k8s::K8sClient;
use crate::utils::poll_until;
use crate::utils::timer::Timer;

/// Pod manager for test operations
pub struct PodManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl PodManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self, namespace: &str) -> Api<Pod> {
        self.client.namespaced_api_in(namespace)
    }

    fn namespace_of<'a>(&'a self, pod: &'a Pod) -> &'a str {
        pod.metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace())
    }

    /// Create a pod
    pub async fn create(&self, pod: &Pod) -> Result<Pod> {
        let api = self.api(self.namespace_of(pod));
        api.create(&PostParams::default(), pod)
            .await
            .context("Failed to create pod")
    }

    /// Create a pod and wait until it is running
    pub async fn create_and_wait_running(&self, pod: &Pod) -> Result<Pod> {
        let created = self.create(pod).await?;
        let name = created
            .metadata
            .name
            .clone()
            .context("Created pod has no name")?;
        let namespace = self.namespace_of(pod).to_string();

        self.wait_running(&name, &namespace).await?;
        self.api(&namespace)
            .get(&name)
            .await
            .context("Failed to fetch pod after it became running")
    }

    /// Wait for pod to be running
    pub async fn wait_running(&self, name: &str, namespace: &str) -> Result<()> {
        let timer = Timer::start(format!("pod {namespace}/{name} running"));
        let cond = await_condition(self.api(namespace), name, is_pod_running());

        tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for pod {namespace}/{name} to run"))?
            .with_context(|| format!("Error waiting for pod {namespace}/{name}"))?;

        timer.stop();
        Ok(())
    }

    /// Wait for pod to report the Ready condition
    pub async fn wait_ready(&self, name: &str, namespace: &str) -> Result<()> {
        let cond = await_condition(self.api(namespace), name, is_pod_ready());

        tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for pod {namespace}/{name} to be ready"))?
            .with_context(|| format!("Error waiting for pod {namespace}/{name}"))?;

        Ok(())
    }

    /// Wait for pod to run to completion (phase Succeeded); a Failed phase
    /// is an error
    pub async fn wait_completed(&self, name: &str, namespace: &str) -> Result<()> {
        let cond = await_condition(self.api(namespace), name, is_pod_finished());

        let pod = tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for pod {namespace}/{name} to finish"))?
            .with_context(|| format!("Error waiting for pod {namespace}/{name}"))?;

        if pod.as_ref().map(pod_failed).unwrap_or(false) {
            bail!("Pod {namespace}/{name} failed");
        }
        Ok(())
    }

    /// Delete pod and wait until it is gone
    pub async fn delete_and_wait(&self, name: &str, namespace: &str) -> Result<()> {
        let api = self.api(namespace);
        allow_missing(api.delete(name, &DeleteParams::default()).await)
            .context("Failed to delete pod")?;

        poll_until(
            &format!("pod {namespace}/{name} deletion"),
            self.wait.timeout(),
            self.wait.interval(),
            || {
                let api = api.clone();
                let name = name.to_string();
                async move { is_gone(&api, &name).await }
            },
        )
        .await?;

        info!("Deleted pod {namespace}/{name}");
        Ok(())
    }

    /// List pods with optional label selector
    pub async fn list(&self, namespace: &str, label_selector: Option<&str>) -> Result<Vec<Pod>> {
        let api = self.api(namespace);
        let params = match label_selector {
            Some(selector) => ListParams::default().labels(selector),
            None => ListParams::default(),
        };
        let list = api.list(&params).await.context("Failed to list pods")?;
        Ok(list.items)
    }

    /// Count running pods matching a label selector
    pub async fn running_count(&self, namespace: &str, label_selector: &str) -> Result<usize> {
        let pods = self.list(namespace, Some(label_selector)).await?;
        Ok(pods.iter().filter(|p| pod_running(p)).count())
    }

    /// Count pods matching a label selector that have been assigned a
    /// node, whatever their phase
    pub async fn scheduled_count(&self, namespace: &str, label_selector: &str) -> Result<usize> {
        let pods = self.list(namespace, Some(label_selector)).await?;
        Ok(pods.iter().filter(|p| pod_scheduled(p)).count())
    }

    /// Fetch logs from a pod, optionally from a specific container
    pub async fn logs(
        &self,
        name: &str,
        namespace: &str,
        container: Option<&str>,
    ) -> Result<String> {
        let api = self.api(namespace);
        let params = LogParams {
            container: container.map(String::from),
            ..Default::default()
        };

        api.logs(name, &params)
            .await
            .with_context(|| format!("Failed to fetch logs for pod {namespace}/{name}"))
    }

    /// Fetch logs from every pod matching a label selector, keyed by pod
    /// name; used to capture diagnostics before teardown
    pub async fn logs_for_selector(
        &self,
        namespace: &str,
        label_selector: &str,
    ) -> Result<Vec<(String, String)>> {
        let pods = self.list(namespace, Some(label_selector)).await?;
        let names: Vec<String> = pods
            .into_iter()
            .filter_map(|p| p.metadata.name)
            .collect();

        let fetches = names.iter().map(|name| async move {
            let logs = self.logs(name, namespace, None).await?;
            Ok::<_, anyhow::Error>((name.clone(), logs))
        });

        future::try_join_all(fetches).await
    }

    /// Execute command in pod using kubectl
    pub async fn exec(&self, name: &str, namespace: &str, command: Vec<String>) -> Result<String> {
        // Use kubectl exec as a fallback since kube-rs exec requires ws feature
        let mut kubectl_args = vec![
            "exec".to_string(),
            "-n".to_string(),
            namespace.to_string(),
            name.to_string(),
            "--".to_string(),
        ];
        kubectl_args.extend(command);

        debug!("Executing: kubectl {:?}", kubectl_args);

        let output = tokio::process::Command::new("kubectl")
            .args(&kubectl_args)
            .output()
            .await
            .context("Failed to execute kubectl")?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("kubectl exec failed: {stderr}")
        }
    }
}

/// Pod reports the Ready condition with status True
fn is_pod_ready() -> impl Condition<Pod> {
    |obj: Option<&Pod>| {
        obj.and_then(|pod| pod.status.as_ref())
            .and_then(|status| status.conditions.as_ref())
            .map(|conditions| {
                conditions
                    .iter()
                    .any(|c| c.type_ == "Ready" && c.status == "True")
            })
            .unwrap_or(false)
    }
}

/// Pod has reached a terminal phase (Succeeded or Failed)
fn is_pod_finished() -> impl Condition<Pod> {
    |obj: Option<&Pod>| {
        obj.and_then(|pod| pod.status.as_ref())
            .and_then(|status| status.phase.as_deref())
            .map(|phase| phase == "Succeeded" || phase == "Failed")
            .unwrap_or(false)
    }
}

fn pod_running(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .map(|phase| phase == "Running")
        .unwrap_or(false)
}

fn pod_scheduled(pod: &Pod) -> bool {
    pod.spec
        .as_ref()
        .and_then(|s| s.node_name.as_deref())
        .map(|node| !node.is_empty())
        .unwrap_or(false)
}

fn pod_failed(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.phase.as_deref())
        .map(|phase| phase == "Failed")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{PodCondition, PodSpec, PodStatus};

    fn pod_with_phase(phase: &str) -> Pod {
        Pod {
            status: Some(PodStatus {
                phase: Some(phase.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn pod_with_ready(status: &str) -> Pod {
        Pod {
            status: Some(PodStatus {
                conditions: Some(vec![PodCondition {
                    type_: "Ready".to_string(),
                    status: status.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_condition() {
        assert!(is_pod_ready().matches_object(Some(&pod_with_ready("True"))));
        assert!(!is_pod_ready().matches_object(Some(&pod_with_ready("False"))));
        assert!(!is_pod_ready().matches_object(Some(&Pod::default())));
        assert!(!is_pod_ready().matches_object(None));
    }

    #[test]
    fn test_finished_condition() {
        assert!(is_pod_finished().matches_object(Some(&pod_with_phase("Succeeded"))));
        assert!(is_pod_finished().matches_object(Some(&pod_with_phase("Failed"))));
        assert!(!is_pod_finished().matches_object(Some(&pod_with_phase("Running"))));
    }

    #[test]
    fn test_phase_helpers() {
        assert!(pod_running(&pod_with_phase("Running")));
        assert!(!pod_running(&pod_with_phase("Pending")));
        assert!(pod_failed(&pod_with_phase("Failed")));
        assert!(!pod_failed(&Pod::default()));
    }

    #[test]
    fn test_pod_scheduled() {
        let mut pod = pod_with_phase("Pending");
        pod.spec = Some(PodSpec {
            node_name: Some("ip-10-0-1-17".to_string()),
            ..Default::default()
        });

        // Assigned a node counts as scheduled regardless of phase
        assert!(pod_scheduled(&pod));
        assert!(!pod_scheduled(&pod_with_phase("Running")));
        assert!(!pod_scheduled(&Pod::default()));
    }
}
