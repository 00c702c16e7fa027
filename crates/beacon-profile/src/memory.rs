//! In-process monitoring profile

use async_trait::async_trait;
use beacon_core::{
    AttributeValue, MetricHandle, RegistrationDescriptor, RegistrationError, Result,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::profile::MonitoringProfile;

/// A bound resource and its declared attributes
struct Resource {
    handle: MetricHandle,
    attributes: BTreeMap<String, RegistrationDescriptor>,
}

/// One exposed attribute with its current value
#[derive(Debug, Clone, Serialize)]
pub struct ExposedAttribute {
    #[serde(flatten)]
    pub descriptor: RegistrationDescriptor,
    pub current: Option<AttributeValue>,
}

/// Profile that keeps bindings in memory and reads values on demand
///
/// `register` replaces any earlier binding for the resource while keeping
/// its declared attributes. `add` is keyed by `(resource, attribute)`, so
/// repeated declarations replace rather than accumulate.
pub struct InMemoryProfile {
    resources: RwLock<HashMap<String, Resource>>,
    register_calls: AtomicU64,
    add_calls: AtomicU64,
}

impl InMemoryProfile {
    pub fn new() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
            register_calls: AtomicU64::new(0),
            add_calls: AtomicU64::new(0),
        }
    }

    /// Names of all bound resources, sorted
    pub async fn resources(&self) -> Vec<String> {
        let resources = self.resources.read().await;
        let mut names: Vec<String> = resources.keys().cloned().collect();
        names.sort();
        names
    }

    /// Declared attributes of a resource, sorted by attribute name
    pub async fn attributes(&self, resource_name: &str) -> Vec<RegistrationDescriptor> {
        let resources = self.resources.read().await;
        resources
            .get(resource_name)
            .map(|r| r.attributes.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Total number of exposed attributes across all resources
    pub async fn attribute_count(&self) -> usize {
        let resources = self.resources.read().await;
        resources.values().map(|r| r.attributes.len()).sum()
    }

    /// Handle currently bound to a resource
    pub async fn handle(&self, resource_name: &str) -> Option<MetricHandle> {
        let resources = self.resources.read().await;
        resources.get(resource_name).map(|r| r.handle.clone())
    }

    /// Read the live value of an exposed attribute
    pub async fn poll(&self, resource_name: &str, attribute: &str) -> Option<AttributeValue> {
        let resources = self.resources.read().await;
        let resource = resources.get(resource_name)?;
        if !resource.attributes.contains_key(attribute) {
            return None;
        }
        resource.handle.read(attribute)
    }

    /// Every exposed attribute with its current value, as pretty JSON
    pub async fn snapshot_json(&self) -> Result<String> {
        let resources = self.resources.read().await;
        let mut exposed: BTreeMap<&str, Vec<ExposedAttribute>> = BTreeMap::new();

        for (name, resource) in resources.iter() {
            let attributes = resource
                .attributes
                .values()
                .map(|descriptor| ExposedAttribute {
                    descriptor: descriptor.clone(),
                    current: resource.handle.read(&descriptor.attribute_name),
                })
                .collect();
            exposed.insert(name.as_str(), attributes);
        }

        Ok(serde_json::to_string_pretty(&exposed)?)
    }

    /// Number of `register` calls received, accepted or not
    pub fn register_calls(&self) -> u64 {
        self.register_calls.load(Ordering::Relaxed)
    }

    /// Number of `add` calls received, accepted or not
    pub fn add_calls(&self) -> u64 {
        self.add_calls.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryProfile {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MonitoringProfile for InMemoryProfile {
    async fn register(
        &self,
        resource_name: &str,
        handle: MetricHandle,
    ) -> std::result::Result<(), RegistrationError> {
        self.register_calls.fetch_add(1, Ordering::Relaxed);

        let mut resources = self.resources.write().await;
        match resources.get_mut(resource_name) {
            Some(resource) => {
                if !resource.handle.same_metric(&handle) {
                    debug!("Rebinding {} to a new {:?} metric", resource_name, handle.kind());
                    // Attributes of a replaced metric may not apply to the new kind
                    resource
                        .attributes
                        .retain(|attribute, _| handle.read(attribute).is_some());
                    resource.handle = handle;
                }
            }
            None => {
                debug!("Binding {} ({:?})", resource_name, handle.kind());
                resources.insert(
                    resource_name.to_string(),
                    Resource {
                        handle,
                        attributes: BTreeMap::new(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn add(
        &self,
        descriptor: RegistrationDescriptor,
    ) -> std::result::Result<(), RegistrationError> {
        self.add_calls.fetch_add(1, Ordering::Relaxed);

        let mut resources = self.resources.write().await;
        let resource = resources
            .get_mut(&descriptor.resource_name)
            .ok_or_else(|| RegistrationError::UnknownResource(descriptor.resource_name.clone()))?;

        if resource.handle.read(&descriptor.attribute_name).is_none() {
            return Err(RegistrationError::Rejected {
                resource_name: descriptor.resource_name.clone(),
                attribute: descriptor.attribute_name.clone(),
                reason: format!("not readable from a {:?} metric", resource.handle.kind()),
            });
        }

        resource
            .attributes
            .insert(descriptor.attribute_name.clone(), descriptor);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{GaugeValue, SimpleCounter, ValueType};
    use std::sync::Arc;

    fn counter_descriptor(resource: &str) -> RegistrationDescriptor {
        RegistrationDescriptor::counter(resource, "http.requests-total", "count")
    }

    #[tokio::test]
    async fn test_register_then_add_and_poll() {
        let profile = InMemoryProfile::new();
        let counter = Arc::new(SimpleCounter::new());
        counter.inc_by(42);

        profile
            .register("http:type=requests", MetricHandle::Counter(counter.clone()))
            .await
            .unwrap();
        profile
            .add(counter_descriptor("http:type=requests"))
            .await
            .unwrap();

        assert_eq!(
            profile.poll("http:type=requests", "count").await,
            Some(AttributeValue::Integer(42))
        );

        counter.inc();
        assert_eq!(
            profile.poll("http:type=requests", "count").await,
            Some(AttributeValue::Integer(43))
        );
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let profile = InMemoryProfile::new();
        let handle = MetricHandle::counter(SimpleCounter::new());

        for _ in 0..3 {
            profile.register("r", handle.clone()).await.unwrap();
            profile.add(counter_descriptor("r")).await.unwrap();
        }

        assert_eq!(profile.attribute_count().await, 1);
        assert_eq!(profile.resources().await, vec!["r".to_string()]);
        assert_eq!(profile.register_calls(), 3);
        assert_eq!(profile.add_calls(), 3);
    }

    #[tokio::test]
    async fn test_add_requires_registered_resource() {
        let profile = InMemoryProfile::new();
        let err = profile.add(counter_descriptor("missing")).await.unwrap_err();
        assert_eq!(err, RegistrationError::UnknownResource("missing".to_string()));
    }

    #[tokio::test]
    async fn test_add_rejects_foreign_attribute() {
        let profile = InMemoryProfile::new();
        profile
            .register("g", MetricHandle::gauge(|| GaugeValue::Int(1)))
            .await
            .unwrap();

        let err = profile.add(counter_descriptor("g")).await.unwrap_err();
        assert!(matches!(err, RegistrationError::Rejected { .. }));
        assert!(profile.attributes("g").await.is_empty());
    }

    #[tokio::test]
    async fn test_rebinding_drops_inapplicable_attributes() {
        let profile = InMemoryProfile::new();
        profile
            .register("r", MetricHandle::counter(SimpleCounter::new()))
            .await
            .unwrap();
        profile.add(counter_descriptor("r")).await.unwrap();

        profile
            .register("r", MetricHandle::gauge(|| GaugeValue::Bool(true)))
            .await
            .unwrap();
        assert!(profile.attributes("r").await.is_empty());

        profile
            .add(RegistrationDescriptor::value("r", "e", "value", ValueType::Dynamic))
            .await
            .unwrap();
        assert_eq!(
            profile.poll("r", "value").await,
            Some(AttributeValue::Gauge(GaugeValue::Bool(true)))
        );
    }

    #[tokio::test]
    async fn test_snapshot_json() {
        let profile = InMemoryProfile::new();
        profile
            .register("r", MetricHandle::counter(SimpleCounter::new()))
            .await
            .unwrap();
        profile.add(counter_descriptor("r")).await.unwrap();

        let json = profile.snapshot_json().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["r"][0]["attribute_name"], "count");
        assert_eq!(parsed["r"][0]["current"], 0);
    }
}
