//! Attribute registration descriptors

use serde::{Deserialize, Serialize};

/// Event pattern attached to every registered attribute
pub const DEFAULT_EVENT_PATTERN: &str = ".*";

/// Exposed attribute names, lower camel case throughout
pub mod attributes {
    pub const VALUE: &str = "value";
    pub const COUNT: &str = "count";

    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const MEAN: &str = "mean";
    pub const STD_DEV: &str = "stdDev";
    pub const P50: &str = "50thPercentile";
    pub const P75: &str = "75thPercentile";
    pub const P95: &str = "95thPercentile";
    pub const P98: &str = "98thPercentile";
    pub const P99: &str = "99thPercentile";
    pub const P999: &str = "999thPercentile";

    pub const MEAN_RATE: &str = "meanRate";
    pub const ONE_MINUTE_RATE: &str = "oneMinuteRate";
    pub const FIVE_MINUTE_RATE: &str = "fiveMinuteRate";
    pub const FIFTEEN_MINUTE_RATE: &str = "fifteenMinuteRate";

    /// Percentile attributes and the quantile each one reads
    pub const PERCENTILES: &[(&str, f64)] = &[
        (P50, 0.5),
        (P75, 0.75),
        (P95, 0.95),
        (P98, 0.98),
        (P99, 0.99),
        (P999, 0.999),
    ];

    /// Distribution fields after `count`, in registration order
    pub const DISTRIBUTION: &[&str] = &[MIN, MAX, MEAN, STD_DEV, P50, P75, P95, P98, P99, P999];

    /// Rate fields after `count`, in registration order
    pub const RATES: &[&str] = &[MEAN_RATE, ONE_MINUTE_RATE, FIVE_MINUTE_RATE, FIFTEEN_MINUTE_RATE];
}

/// How the monitoring side should interpret an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitoringKind {
    /// Point-in-time value
    Value,
    /// Monotonically increasing count
    Counter,
    /// Rate derived from a counter
    Rate,
}

impl MonitoringKind {
    /// Kinds for count-like attributes
    pub const COUNTER_KINDS: &'static [MonitoringKind] =
        &[MonitoringKind::Counter, MonitoringKind::Rate];

    /// Kinds for every other attribute
    pub const VALUE_KINDS: &'static [MonitoringKind] = &[MonitoringKind::Value];
}

/// Data type of an exposed attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Integer,
    Float,
    /// Gauge values, typed at read time
    Dynamic,
}

/// One attribute of one metric, as declared to the monitoring profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationDescriptor {
    pub resource_name: String,
    pub attribute_name: String,
    pub label: String,
    pub event_pattern: String,
    pub event_name: String,
    pub monitoring_kinds: Vec<MonitoringKind>,
    pub value_type: ValueType,
}

impl RegistrationDescriptor {
    /// Descriptor for a point-in-time attribute
    pub fn value(
        resource_name: &str,
        event_name: &str,
        attribute: &str,
        value_type: ValueType,
    ) -> Self {
        Self::with_kinds(
            resource_name,
            event_name,
            attribute,
            MonitoringKind::VALUE_KINDS,
            value_type,
        )
    }

    /// Descriptor for a count-like attribute
    pub fn counter(resource_name: &str, event_name: &str, attribute: &str) -> Self {
        Self::with_kinds(
            resource_name,
            event_name,
            attribute,
            MonitoringKind::COUNTER_KINDS,
            ValueType::Integer,
        )
    }

    fn with_kinds(
        resource_name: &str,
        event_name: &str,
        attribute: &str,
        kinds: &[MonitoringKind],
        value_type: ValueType,
    ) -> Self {
        Self {
            resource_name: resource_name.to_string(),
            attribute_name: attribute.to_string(),
            label: attribute.to_string(),
            event_pattern: DEFAULT_EVENT_PATTERN.to_string(),
            event_name: event_name.to_string(),
            monitoring_kinds: kinds.to_vec(),
            value_type,
        }
    }

    pub fn is_counter(&self) -> bool {
        self.monitoring_kinds.contains(&MonitoringKind::Counter)
    }
}
