//! Configuration module
//!
//! Framework defaults and wait/poll settings for cluster tests.

#![allow(dead_code)]

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Framework configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameworkConfig {
    /// Namespace used by default for test objects
    pub namespace: String,

    /// Label key applied to every object the framework creates
    pub test_label_key: String,

    /// Label value applied to every object the framework creates
    pub test_label_value: String,

    /// Wait and poll settings
    pub wait: WaitConfig,
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            namespace: "testkit".to_string(),
            test_label_key: "app.kubernetes.io/managed-by".to_string(),
            test_label_value: "kube-testkit".to_string(),
            wait: WaitConfig::default(),
        }
    }
}

impl FrameworkConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read config file")?;

        let config: Self = if path
            .as_ref()
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            serde_yaml::from_str(&content).context("Failed to parse YAML config")?
        } else {
            serde_json::from_str(&content).context("Failed to parse JSON config")?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = if path
            .as_ref()
            .extension()
            .map(|e| e == "yaml" || e == "yml")
            .unwrap_or(false)
        {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }
}

/// Wait and poll settings for eventual-consistency checks
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WaitConfig {
    /// Overall timeout for a single wait, in seconds
    pub timeout_secs: u64,

    /// Interval between polls, in seconds
    pub interval_secs: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 240,
            interval_secs: 5,
        }
    }
}

impl WaitConfig {
    pub fn new(timeout_secs: u64, interval_secs: u64) -> Self {
        Self {
            timeout_secs,
            interval_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FrameworkConfig::default();
        assert_eq!(config.namespace, "testkit");
        assert_eq!(config.wait.timeout_secs, 240);
    }

    #[test]
    fn test_wait_config_durations() {
        let wait = WaitConfig::new(30, 2);
        assert_eq!(wait.timeout(), Duration::from_secs(30));
        assert_eq!(wait.interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_config_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testkit.yaml");

        let mut config = FrameworkConfig::default();
        config.namespace = "custom-ns".to_string();
        config.save(&path).unwrap();

        let loaded = FrameworkConfig::load(&path).unwrap();
        assert_eq!(loaded.namespace, "custom-ns");
        assert_eq!(loaded.wait.interval_secs, config.wait.interval_secs);
    }

    #[test]
    fn test_config_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("testkit.json");

        FrameworkConfig::default().save(&path).unwrap();
        let loaded = FrameworkConfig::load(&path).unwrap();
        assert_eq!(loaded.test_label_value, "kube-testkit");
    }
}
