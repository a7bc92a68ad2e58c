//! Kubernetes API client module
//!
//! Provides the cluster client wrapper and per-resource-kind managers
//! used to drive tests against a live cluster.

mod client;
mod manager;
pub mod resources;

pub use client::K8sClient;
pub use manager::ResourceManagers;
