//! Event inspection
//!
//! Queries core/v1 Events to diagnose scheduling and networking failures
//! observed during tests.

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use k8s_openapi::api::core::v1::Event;
use kube::api::{Api, ListParams};

use crate::k8s::K8sClient;

/// Event manager for test operations
pub struct EventManager {
    client: K8sClient,
}

impl EventManager {
    pub fn new(client: K8sClient) -> Self {
        Self { client }
    }

    fn api(&self, namespace: &str) -> Api<Event> {
        self.client.namespaced_api_in(namespace)
    }

    /// List all events in a namespace
    pub async fn list(&self, namespace: &str) -> Result<Vec<Event>> {
        let list = self
            .api(namespace)
            .list(&ListParams::default())
            .await
            .context("Failed to list events")?;
        Ok(list.items)
    }

    /// List events involving the named object
    pub async fn list_for_object(&self, namespace: &str, name: &str) -> Result<Vec<Event>> {
        let params = ListParams::default().fields(&format!(
            "involvedObject.name={name},involvedObject.namespace={namespace}"
        ));

        let list = self
            .api(namespace)
            .list(&params)
            .await
            .with_context(|| format!("Failed to list events for {namespace}/{name}"))?;
        Ok(list.items)
    }

    /// List warning events in a namespace
    pub async fn warnings(&self, namespace: &str) -> Result<Vec<Event>> {
        let params = ListParams::default().fields("type=Warning");
        let list = self
            .api(namespace)
            .list(&params)
            .await
            .context("Failed to list warning events")?;
        Ok(list.items)
    }
}

/// Keep only events with the given reason, e.g. `FailedScheduling`
pub fn with_reason(events: &[Event], reason: &str) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.reason.as_deref() == Some(reason))
        .cloned()
        .collect()
}

/// Keep only events last seen within `max_age_secs` of now
pub fn recent(events: &[Event], max_age_secs: i64) -> Vec<Event> {
    let cutoff = Utc::now() - ChronoDuration::seconds(max_age_secs);

    events
        .iter()
        .filter(|e| {
            e.last_timestamp
                .as_ref()
                .map(|t| t.0 >= cutoff)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

    fn event(reason: &str, age_secs: i64) -> Event {
        Event {
            reason: Some(reason.to_string()),
            last_timestamp: Some(Time(Utc::now() - ChronoDuration::seconds(age_secs))),
            ..Default::default()
        }
    }

    #[test]
    fn test_with_reason() {
        let events = vec![
            event("FailedScheduling", 10),
            event("Pulled", 10),
            event("FailedScheduling", 20),
        ];

        let failed = with_reason(&events, "FailedScheduling");
        assert_eq!(failed.len(), 2);
    }

    #[test]
    fn test_recent_filters_old_events() {
        let events = vec![event("Pulled", 10), event("Pulled", 600)];

        let fresh = recent(&events, 60);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn test_recent_skips_events_without_timestamp() {
        let events = vec![Event::default()];
        assert!(recent(&events, 60).is_empty());
    }
}
