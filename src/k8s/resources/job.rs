//! Job management
//!
//! Creates batch Jobs and waits for them to run to completion.

use anyhow::{bail, Context, Result};
use k8s_openapi::api::batch::v1::Job;
use kube::api::{Api, DeleteParams, PostParams};
use kube::runtime::wait::{await_condition, Condition};
use tracing::info;

use crate::config::WaitConfig;
use crate::k8s::resources::{allow_missing, is_gone};
use crate::k8s::K8sClient;
use crate::utils::poll_until;

/// Job manager for test operations
pub struct JobManager {
    client: K8sClient,
    wait: WaitConfig,
}

impl JobManager {
    pub fn new(client: K8sClient, wait: WaitConfig) -> Self {
        Self { client, wait }
    }

    fn api(&self, namespace: &str) -> Api<Job> {
        self.client.namespaced_api_in(namespace)
    }

    /// Create a job
    pub async fn create(&self, job: &Job) -> Result<Job> {
        let namespace = job
            .metadata
            .namespace
            .as_deref()
            .unwrap_or_else(|| self.client.namespace());
        self.api(namespace)
            .create(&PostParams::default(), job)
            .await
            .context("Failed to create job")
    }

    /// Create a job and wait until it completes; a failed job is an error
    pub async fn create_and_wait(&self, job: &Job) -> Result<Job> {
        let created = self.create(job).await?;
        let name = created
            .metadata
            .name
            .clone()
            .context("Created job has no name")?;
        let namespace = created
            .metadata
            .namespace
            .clone()
            .unwrap_or_else(|| self.client.namespace().to_string());

        self.wait_completed(&name, &namespace).await?;
        self.api(&namespace)
            .get(&name)
            .await
            .context("Failed to fetch job after completion")
    }

    /// Get a job by name
    pub async fn get(&self, name: &str, namespace: &str) -> Result<Job> {
        self.api(namespace)
            .get(name)
            .await
            .with_context(|| format!("Failed to get job {namespace}/{name}"))
    }

    /// Wait for a job to finish; returns an error if it finished Failed
    pub async fn wait_completed(&self, name: &str, namespace: &str) -> Result<()> {
        let cond = await_condition(self.api(namespace), name, is_job_finished());

        let job = tokio::time::timeout(self.wait.timeout(), cond)
            .await
            .with_context(|| format!("Timeout waiting for job {namespace}/{name} to finish"))?
            .with_context(|| format!("Error waiting for job {namespace}/{name}"))?;

        if job.as_ref().map(job_failed).unwrap_or(false) {
            bail!("Job {namespace}/{name} failed");
        }

        info!("Job {namespace}/{name} completed");
        Ok(())
    }

    /// Delete a job (and its pods, via foreground propagation) and wait
    /// until it is gone
    pub async fn delete_and_wait(&self, name: &str, namespace: &str) -> Result<()> {
        let api = self.api(namespace);
        allow_missing(api.delete(name, &DeleteParams::foreground()).await)
            .context("Failed to delete job")?;

        poll_until(
            &format!("job {namespace}/{name} deletion"),
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

/// Job carries a Complete or Failed condition with status True
fn is_job_finished() -> impl Condition<Job> {
    |obj: Option<&Job>| {
        obj.and_then(|job| job.status.as_ref())
            .and_then(|status| status.conditions.as_ref())
            .map(|conditions| {
                conditions
                    .iter()
                    .any(|c| (c.type_ == "Complete" || c.type_ == "Failed") && c.status == "True")
            })
            .unwrap_or(false)
    }
}

fn job_failed(job: &Job) -> bool {
    job.status
        .as_ref()
        .and_then(|status| status.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Failed" && c.status == "True")
        })
        .unwrap_or(false)
}
