//! # beacon-reporter
//!
//! Periodically surfaces the contents of a metrics registry to a monitoring
//! profile.
//!
//! Each pass enumerates the registry, classifies every metric by kind,
//! derives its resource and event names and registers its attributes with
//! the profile. Registration is idempotent, so repeating a pass never
//! duplicates an exposed attribute. A metric that fails is counted and
//! skipped; it never aborts the pass.
//!
//! ```no_run
//! use beacon_core::{InMemoryRegistry, MetricHandle, MetricName, SimpleCounter};
//! use beacon_profile::InMemoryProfile;
//! use beacon_reporter::MetricsReporter;
//! use std::sync::Arc;
//!
//! # async fn example() -> beacon_core::Result<()> {
//! let registry = Arc::new(InMemoryRegistry::new());
//! registry.register(
//!     MetricName::new("http", "requests", "total").with_scope("api"),
//!     MetricHandle::counter(SimpleCounter::new()),
//! );
//!
//! let handle = MetricsReporter::enable_with(registry, Arc::new(InMemoryProfile::new()))?;
//! // ... later
//! handle.stop().await?;
//! # Ok(())
//! # }
//! ```

mod classifier;
mod reporter;
mod schedule;
mod summary;

pub use classifier::{classify, Classification};
pub use reporter::{MetricsReporter, REGISTRY_FAILURE};
pub use schedule::ReporterHandle;
pub use summary::{MetricFailure, PassSummary, ReporterStats, ReporterTotals};
