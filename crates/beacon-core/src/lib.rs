//! # beacon-core
//!
//! Core types for the Beacon monitoring bridge.
//!
//! Beacon surfaces the metrics held in an in-process registry to an external
//! monitoring profile. This crate holds the vocabulary both sides agree on:
//!
//! - [`MetricName`] and the resource/event names derived from it
//! - [`MetricHandle`], a closed enum over the five metric kinds
//! - [`RegistrationDescriptor`], one exposed attribute of one metric
//! - [`MetricsRegistry`], the read side of a registry
//! - [`ReporterConfig`], the reporting schedule

mod config;
mod descriptor;
mod error;
mod metric;
mod name;
mod registry;

pub use config::{ReporterConfig, TimeUnit};
pub use descriptor::{
    attributes, MonitoringKind, RegistrationDescriptor, ValueType, DEFAULT_EVENT_PATTERN,
};
pub use error::{BeaconError, ClassificationError, RegistrationError, Result};
pub use metric::{
    AttributeValue, Counter, Gauge, GaugeValue, MetricHandle, MetricKind, Metered, Sampling,
    SimpleCounter, Timer,
};
pub use name::MetricName;
pub use registry::{InMemoryRegistry, MetricsRegistry};
