//! Pass summaries and cumulative reporter statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A metric that could not be surfaced during a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFailure {
    pub resource_name: String,
    pub error: String,
}

/// Outcome of one reporting pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassSummary {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Registry entries enumerated
    pub metrics_seen: usize,
    /// Metrics bound and fully declared
    pub registered: usize,
    /// Attribute declarations accepted by the profile
    pub attributes_added: usize,
    /// Unrecognized metrics handed to the secondary exporter
    pub exported: usize,
    /// Released entries and unrecognized metrics with nowhere to go
    pub skipped: usize,
    /// Metrics dropped because registration or export failed
    pub failed: usize,
    pub failures: Vec<MetricFailure>,
}

impl PassSummary {
    pub(crate) fn begin() -> Self {
        Self {
            started_at: Utc::now(),
            duration_ms: 0,
            metrics_seen: 0,
            registered: 0,
            attributes_added: 0,
            exported: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.duration_ms = (Utc::now() - self.started_at).num_milliseconds().max(0) as u64;
        self
    }

    pub(crate) fn record_failure(&mut self, resource_name: String, error: String) {
        self.failed += 1;
        self.failures.push(MetricFailure {
            resource_name,
            error,
        });
    }

    /// True when nothing failed
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Running totals across passes
///
/// `discarded` is the bridge's own health signal: every metric that was
/// enumerated but could not be surfaced.
#[derive(Debug, Default)]
pub struct ReporterStats {
    passes: AtomicU64,
    registered: AtomicU64,
    attributes_added: AtomicU64,
    exported: AtomicU64,
    skipped: AtomicU64,
    discarded: AtomicU64,
    last_pass_ms: AtomicU64,
}

impl ReporterStats {
    pub fn record(&self, summary: &PassSummary) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.registered
            .fetch_add(summary.registered as u64, Ordering::Relaxed);
        self.attributes_added
            .fetch_add(summary.attributes_added as u64, Ordering::Relaxed);
        self.exported
            .fetch_add(summary.exported as u64, Ordering::Relaxed);
        self.skipped
            .fetch_add(summary.skipped as u64, Ordering::Relaxed);
        self.discarded
            .fetch_add(summary.failed as u64, Ordering::Relaxed);
        self.last_pass_ms
            .store(summary.duration_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReporterTotals {
        ReporterTotals {
            passes: self.passes.load(Ordering::Relaxed),
            registered: self.registered.load(Ordering::Relaxed),
            attributes_added: self.attributes_added.load(Ordering::Relaxed),
            exported: self.exported.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            last_pass_ms: self.last_pass_ms.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ReporterStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReporterTotals {
    pub passes: u64,
    pub registered: u64,
    pub attributes_added: u64,
    pub exported: u64,
    pub skipped: u64,
    pub discarded: u64,
    pub last_pass_ms: u64,
}
