//! Monitoring profile abstraction

use async_trait::async_trait;
use beacon_core::{MetricHandle, RegistrationDescriptor, RegistrationError};

/// External profile that exposes metric attributes for polling
///
/// Both operations must be idempotent: repeating a call for the same
/// resource or attribute replaces the earlier binding and never duplicates
/// an exposed attribute.
#[async_trait]
pub trait MonitoringProfile: Send + Sync {
    /// Bind `resource_name` to the live metric so its values can be read
    async fn register(
        &self,
        resource_name: &str,
        handle: MetricHandle,
    ) -> Result<(), RegistrationError>;

    /// Declare one attribute of an already bound resource
    async fn add(&self, descriptor: RegistrationDescriptor) -> Result<(), RegistrationError>;
}

/// Out-of-band exporter for metrics the classifier does not recognize
#[async_trait]
pub trait SecondaryExporter: Send + Sync {
    async fn export(
        &self,
        resource_name: &str,
        handle: MetricHandle,
    ) -> Result<(), RegistrationError>;
}
