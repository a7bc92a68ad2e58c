//! kube-testkit - Kubernetes cluster test framework
//!
//! A library for driving end-to-end tests against a live Kubernetes cluster.
//! Test suites build a [`K8sClient`], hand it to [`ResourceManagers`], and use
//! the per-resource-kind managers to create, await, and tear down cluster
//! objects.
//!
//! ## Usage
//!
//! ```no_run
//! use kube_testkit::{K8sClient, ResourceManagers};
//! use kube_testkit::config::WaitConfig;
//! use kube_testkit::manifest::PodBuilder;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = K8sClient::try_default("testkit").await?;
//! let managers = ResourceManagers::new(client, WaitConfig::default());
//!
//! managers.namespaces().create("testkit", Default::default()).await?;
//!
//! let pod = PodBuilder::new("probe", "testkit").build();
//! managers.pods().create_and_wait_running(&pod).await?;
//!
//! managers.namespaces().delete_and_wait("testkit").await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod k8s;
pub mod manifest;
pub mod utils;

pub use config::{FrameworkConfig, WaitConfig};
pub use k8s::{K8sClient, ResourceManagers};
