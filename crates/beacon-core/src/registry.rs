//! Read side of a metrics registry

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

use crate::metric::MetricHandle;
use crate::name::MetricName;

/// Registry the reporter enumerates on every pass
///
/// Implementations return the live contents at call time. Order carries no
/// meaning. A `None` handle marks an entry whose metric is already gone.
pub trait MetricsRegistry: Send + Sync {
    fn all_metrics(&self) -> Vec<(MetricName, Option<MetricHandle>)>;
}

/// Thread-safe registry keyed by [`MetricName`]
#[derive(Default)]
pub struct InMemoryRegistry {
    metrics: RwLock<HashMap<MetricName, MetricHandle>>,
}

static DEFAULT_REGISTRY: OnceLock<Arc<InMemoryRegistry>> = OnceLock::new();

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry used when no registry is chosen explicitly
    pub fn default_registry() -> Arc<InMemoryRegistry> {
        DEFAULT_REGISTRY
            .get_or_init(|| Arc::new(InMemoryRegistry::new()))
            .clone()
    }

    /// Add or replace the metric under `name`, returning the previous one
    pub fn register(&self, name: MetricName, handle: MetricHandle) -> Option<MetricHandle> {
        debug!("Registering {:?} metric {}", handle.kind(), name);
        self.metrics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, handle)
    }

    pub fn remove(&self, name: &MetricName) -> Option<MetricHandle> {
        self.metrics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
    }

    pub fn get(&self, name: &MetricName) -> Option<MetricHandle> {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricsRegistry for InMemoryRegistry {
    fn all_metrics(&self) -> Vec<(MetricName, Option<MetricHandle>)> {
        self.metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, handle)| (name.clone(), Some(handle.clone())))
            .collect()
    }
}
