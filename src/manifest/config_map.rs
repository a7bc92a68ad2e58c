//! ConfigMap manifest builder

use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::ObjectMeta;
use std::collections::BTreeMap;

/// Builder for test configmaps
#[derive(Clone, Debug)]
pub struct ConfigMapBuilder {
    name: String,
    namespace: String,
    data: BTreeMap<String, String>,
}

impl ConfigMapBuilder {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn build(&self) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            data: if self.data.is_empty() {
                None
            } else {
                Some(self.data.clone())
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_map_builder() {
        let cm = ConfigMapBuilder::new("settings", "testkit")
            .data("LOG_LEVEL", "debug")
            .data("REGION", "us-west-2")
            .build();

        let data = cm.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data.get("LOG_LEVEL"), Some(&"debug".to_string()));
    }

    #[test]
    fn test_empty_config_map() {
        let cm = ConfigMapBuilder::new("empty", "testkit").build();
        assert!(cm.data.is_none());
    }
}
