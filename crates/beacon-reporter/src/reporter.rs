//! The reporting pass
//!
//! One pass enumerates the registry, classifies every live entry and
//! registers it with the monitoring profile. Each metric is handled in
//! isolation: an error or panic while surfacing one metric is recorded in the
//! pass summary and the pass moves on to the next.

use beacon_core::{
    BeaconError, ClassificationError, InMemoryRegistry, MetricHandle, MetricName,
    MetricsRegistry, RegistrationError, ReporterConfig, Result,
};
use beacon_profile::{MonitoringProfile, SecondaryExporter};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::classifier::classify;
use crate::schedule::ReporterHandle;
use crate::summary::{PassSummary, ReporterStats, ReporterTotals};

/// Failure key used when the registry itself could not be enumerated
pub const REGISTRY_FAILURE: &str = "<registry>";

/// What happened to a single registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetricOutcome {
    Registered { attributes: usize },
    Exported,
}

/// Bridges a metrics registry to a monitoring profile
///
/// Cloning is cheap and every clone shares the same statistics and start
/// guard; the scheduled task runs on a clone.
#[derive(Clone)]
pub struct MetricsReporter {
    registry: Arc<dyn MetricsRegistry>,
    profile: Arc<dyn MonitoringProfile>,
    exporter: Option<Arc<dyn SecondaryExporter>>,
    config: ReporterConfig,
    stats: Arc<ReporterStats>,
    pub(crate) started: Arc<AtomicBool>,
}

impl fmt::Debug for MetricsReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsReporter")
            .field("config", &self.config)
            .field("has_exporter", &self.exporter.is_some())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}

impl MetricsReporter {
    /// Create a reporter with the default configuration
    pub fn new(registry: Arc<dyn MetricsRegistry>, profile: Arc<dyn MonitoringProfile>) -> Self {
        Self {
            registry,
            profile,
            exporter: None,
            config: ReporterConfig::default(),
            stats: Arc::new(ReporterStats::default()),
            started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Route unrecognized metrics to `exporter` instead of skipping them
    pub fn with_exporter(mut self, exporter: Arc<dyn SecondaryExporter>) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn with_config(mut self, config: ReporterConfig) -> Self {
        self.config = config;
        self
    }

    /// Report the process default registry to `profile` every minute
    pub fn enable(profile: Arc<dyn MonitoringProfile>) -> Result<ReporterHandle> {
        Self::enable_with(InMemoryRegistry::default_registry(), profile)
    }

    /// Report `registry` to `profile` every minute
    pub fn enable_with(
        registry: Arc<dyn MetricsRegistry>,
        profile: Arc<dyn MonitoringProfile>,
    ) -> Result<ReporterHandle> {
        let reporter = Self::new(registry, profile);
        let config = reporter.config.clone();
        reporter.start(config.period, config.unit)
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Totals across every pass run so far
    pub fn stats(&self) -> ReporterTotals {
        self.stats.snapshot()
    }

    /// Run one full enumerate-classify-register pass
    ///
    /// Never fails as a whole; per-metric problems land in the summary.
    #[instrument(skip(self))]
    pub async fn run_pass(&self) -> PassSummary {
        let mut summary = PassSummary::begin();

        let listed = panic::catch_unwind(AssertUnwindSafe(|| self.registry.all_metrics()));
        let mut entries = match listed {
            Ok(entries) => entries,
            Err(_) => {
                warn!("Registry enumeration panicked, skipping pass");
                summary.record_failure(REGISTRY_FAILURE.to_string(), "panicked".to_string());
                let summary = summary.finish();
                self.stats.record(&summary);
                return summary;
            }
        };
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        summary.metrics_seen = entries.len();

        for (name, handle) in entries {
            let Some(handle) = handle else {
                debug!("Skipping released metric {}", name);
                summary.skipped += 1;
                continue;
            };

            let outcome = AssertUnwindSafe(self.report_metric(&name, handle))
                .catch_unwind()
                .await;

            match outcome {
                Ok(Ok(MetricOutcome::Registered { attributes })) => {
                    summary.registered += 1;
                    summary.attributes_added += attributes;
                }
                Ok(Ok(MetricOutcome::Exported)) => {
                    summary.exported += 1;
                }
                Ok(Err(BeaconError::Classification(e))) => {
                    debug!("Skipping {}: {}", name, e);
                    summary.skipped += 1;
                }
                Ok(Err(e)) => {
                    warn!("Failed to report metric {}: {}", name, e);
                    summary.record_failure(name.resource_name(), e.to_string());
                }
                Err(_) => {
                    warn!("Reporting metric {} panicked", name);
                    summary.record_failure(name.resource_name(), "panicked".to_string());
                }
            }
        }

        let summary = summary.finish();
        self.stats.record(&summary);

        if summary.is_clean() {
            debug!(
                "Pass complete: {} registered, {} attributes, {} exported, {} skipped in {}ms",
                summary.registered,
                summary.attributes_added,
                summary.exported,
                summary.skipped,
                summary.duration_ms
            );
        } else {
            info!(
                "Pass complete with {} failures: {} registered, {} exported, {} skipped",
                summary.failed, summary.registered, summary.exported, summary.skipped
            );
        }

        summary
    }

    async fn report_metric(
        &self,
        name: &MetricName,
        handle: MetricHandle,
    ) -> Result<MetricOutcome> {
        let classification = match (classify(name, &handle), &self.exporter) {
            (Ok(classification), _) => classification,
            (Err(ClassificationError::Unrecognized { resource_name, .. }), Some(exporter))
                if self.config.export_unrecognized =>
            {
                debug!("Exporting unrecognized metric {}", resource_name);
                self.bounded(
                    "export",
                    &resource_name,
                    exporter.export(&resource_name, handle),
                )
                .await?;
                return Ok(MetricOutcome::Exported);
            }
            (Err(e), _) => return Err(e.into()),
        };

        let resource_name = classification.resource_name;
        self.bounded(
            "register",
            &resource_name,
            self.profile.register(&resource_name, handle),
        )
        .await?;

        let attributes = classification.descriptors.len();
        for descriptor in classification.descriptors {
            self.bounded("add", &resource_name, self.profile.add(descriptor))
                .await?;
        }

        Ok(MetricOutcome::Registered { attributes })
    }

    /// Run a profile call under the registration timeout
    async fn bounded<F>(
        &self,
        operation: &'static str,
        resource_name: &str,
        call: F,
    ) -> std::result::Result<(), RegistrationError>
    where
        F: Future<Output = std::result::Result<(), RegistrationError>>,
    {
        match tokio::time::timeout(self.config.registration_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(RegistrationError::TimedOut {
                operation,
                resource_name: resource_name.to_string(),
                timeout_ms: self.config.registration_timeout_ms,
            }),
        }
    }
}
