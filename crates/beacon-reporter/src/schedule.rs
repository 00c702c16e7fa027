//! Periodic scheduling of reporting passes
//!
//! The first pass runs immediately, then one pass per period on a single
//! tokio task. Passes never overlap: a late tick is delayed rather than
//! bursted, and stopping waits for an in-flight pass to finish.

use beacon_core::{BeaconError, Result, TimeUnit};
use std::fmt;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::reporter::MetricsReporter;
use crate::summary::{PassSummary, ReporterTotals};

/// Why the schedule loop woke up
enum Wake {
    Tick,
    Stop,
    Detached,
}

impl MetricsReporter {
    /// Start reporting every `period` `unit`s
    ///
    /// Call once per reporter: a second call fails with
    /// [`BeaconError::AlreadyStarted`]. Fails with
    /// [`BeaconError::Scheduling`] if the period is zero or there is no tokio
    /// runtime to run on.
    pub fn start(&self, period: u64, unit: TimeUnit) -> Result<ReporterHandle> {
        let period = unit.duration(period);
        if period.is_zero() {
            return Err(BeaconError::Scheduling(
                "reporting period must be greater than zero".to_string(),
            ));
        }
        if self.config().registration_timeout_ms == 0 {
            return Err(BeaconError::Scheduling(
                "registration timeout must be greater than zero".to_string(),
            ));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| BeaconError::Scheduling(format!("no tokio runtime available: {}", e)))?;

        if self.started.swap(true, Ordering::SeqCst) {
            return Err(BeaconError::AlreadyStarted);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (summary_tx, summary_rx) = watch::channel(None);

        info!("Starting metrics reporter every {:?}", period);
        let task = runtime.spawn(run_schedule(
            self.clone(),
            period,
            shutdown_rx,
            summary_tx,
        ));

        Ok(ReporterHandle {
            reporter: self.clone(),
            shutdown_tx,
            summaries: summary_rx,
            task,
        })
    }

    /// Start with the period and unit from this reporter's configuration
    pub fn start_configured(&self) -> Result<ReporterHandle> {
        let config = self.config().clone();
        self.start(config.period, config.unit)
    }
}

async fn run_schedule(
    reporter: MetricsReporter,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    summary_tx: watch::Sender<Option<PassSummary>>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut attached = true;

    loop {
        // Stop wins over a tick that became ready during a long pass
        let wake = tokio::select! {
            biased;
            changed = shutdown_rx.changed(), if attached => match changed {
                Ok(()) if *shutdown_rx.borrow() => Wake::Stop,
                Ok(()) => continue,
                Err(_) => Wake::Detached,
            },
            _ = ticker.tick() => Wake::Tick,
        };

        match wake {
            Wake::Tick => {
                let summary = reporter.run_pass().await;
                summary_tx.send_replace(Some(summary));
            }
            Wake::Stop => break,
            Wake::Detached => {
                // Handle dropped without stop(); keep reporting
                debug!("Reporter handle dropped, continuing in background");
                attached = false;
            }
        }
    }

    info!("Metrics reporter stopped");
}

/// Control handle for a started reporter
///
/// Dropping the handle leaves the reporter running until the runtime shuts
/// down. Use [`ReporterHandle::stop`] to end it.
pub struct ReporterHandle {
    reporter: MetricsReporter,
    shutdown_tx: watch::Sender<bool>,
    summaries: watch::Receiver<Option<PassSummary>>,
    task: JoinHandle<()>,
}

impl fmt::Debug for ReporterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterHandle")
            .field("reporter", &self.reporter)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl ReporterHandle {
    pub fn reporter(&self) -> &MetricsReporter {
        &self.reporter
    }

    /// Totals across every pass run so far
    pub fn stats(&self) -> ReporterTotals {
        self.reporter.stats()
    }

    /// Summary of the most recent completed pass
    pub fn latest_summary(&self) -> Option<PassSummary> {
        self.summaries.borrow().clone()
    }

    /// Receiver notified after every completed pass
    pub fn subscribe(&self) -> watch::Receiver<Option<PassSummary>> {
        self.summaries.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop scheduling passes and wait for the loop to exit
    ///
    /// A pass already in progress runs to completion first.
    pub async fn stop(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);
        self.task
            .await
            .map_err(|e| BeaconError::Scheduling(format!("reporter task failed: {}", e)))
    }
}
