//! Metric capabilities and the handle enum the bridge dispatches on
//!
//! Values are computed by whoever implements these traits. The bridge only
//! reads them, and only through [`MetricHandle::read`].

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::descriptor::attributes;

/// Current value of a gauge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GaugeValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// A value read from one exposed attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Gauge(GaugeValue),
}

/// Single point-in-time value of arbitrary type
pub trait Gauge: Send + Sync {
    fn value(&self) -> GaugeValue;
}

/// Adjustable integer count
pub trait Counter: Send + Sync {
    fn count(&self) -> i64;
}

/// Distribution of sampled values
pub trait Sampling: Send + Sync {
    fn count(&self) -> i64;
    fn min(&self) -> f64;
    fn max(&self) -> f64;
    fn mean(&self) -> f64;
    fn std_dev(&self) -> f64;
    /// Value at `quantile`, in `[0.0, 1.0]`
    fn percentile(&self, quantile: f64) -> f64;
}

/// Event count with exponentially-weighted rates
pub trait Metered: Send + Sync {
    fn count(&self) -> i64;
    fn mean_rate(&self) -> f64;
    fn one_minute_rate(&self) -> f64;
    fn five_minute_rate(&self) -> f64;
    fn fifteen_minute_rate(&self) -> f64;
}

/// Duration distribution plus call rate
///
/// Implementors must report the same count from [`Sampling::count`] and
/// [`Metered::count`].
pub trait Timer: Sampling + Metered {}

impl<T: Sampling + Metered> Timer for T {}

/// Kind tag of a [`MetricHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gauge,
    Counter,
    Histogram,
    Meter,
    Timer,
    Unrecognized,
}

/// Shared reference to a metric owned by the registry
///
/// Cloning a handle clones the reference, never the metric.
#[derive(Clone)]
pub enum MetricHandle {
    Gauge(Arc<dyn Gauge>),
    Counter(Arc<dyn Counter>),
    Histogram(Arc<dyn Sampling>),
    Meter(Arc<dyn Metered>),
    Timer(Arc<dyn Timer>),
    /// Anything else the registry holds; only a secondary exporter can use it
    Unrecognized {
        type_name: &'static str,
        metric: Arc<dyn Any + Send + Sync>,
    },
}

impl MetricHandle {
    pub fn gauge(gauge: impl Gauge + 'static) -> Self {
        Self::Gauge(Arc::new(gauge))
    }

    pub fn counter(counter: impl Counter + 'static) -> Self {
        Self::Counter(Arc::new(counter))
    }

    pub fn histogram(histogram: impl Sampling + 'static) -> Self {
        Self::Histogram(Arc::new(histogram))
    }

    pub fn meter(meter: impl Metered + 'static) -> Self {
        Self::Meter(Arc::new(meter))
    }

    pub fn timer(timer: impl Timer + 'static) -> Self {
        Self::Timer(Arc::new(timer))
    }

    /// Wrap a metric of a type the bridge does not know
    pub fn unrecognized<T: Any + Send + Sync>(metric: Arc<T>) -> Self {
        Self::Unrecognized {
            type_name: std::any::type_name::<T>(),
            metric,
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Self::Gauge(_) => MetricKind::Gauge,
            Self::Counter(_) => MetricKind::Counter,
            Self::Histogram(_) => MetricKind::Histogram,
            Self::Meter(_) => MetricKind::Meter,
            Self::Timer(_) => MetricKind::Timer,
            Self::Unrecognized { .. } => MetricKind::Unrecognized,
        }
    }

    /// Whether two handles point at the same metric
    pub fn same_metric(&self, other: &MetricHandle) -> bool {
        match (self, other) {
            (Self::Gauge(a), Self::Gauge(b)) => Arc::ptr_eq(a, b),
            (Self::Counter(a), Self::Counter(b)) => Arc::ptr_eq(a, b),
            (Self::Histogram(a), Self::Histogram(b)) => Arc::ptr_eq(a, b),
            (Self::Meter(a), Self::Meter(b)) => Arc::ptr_eq(a, b),
            (Self::Timer(a), Self::Timer(b)) => Arc::ptr_eq(a, b),
            (Self::Unrecognized { metric: a, .. }, Self::Unrecognized { metric: b, .. }) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    /// Read the live value of `attribute`
    ///
    /// Returns `None` when the attribute does not belong to this kind.
    pub fn read(&self, attribute: &str) -> Option<AttributeValue> {
        match self {
            Self::Gauge(gauge) => match attribute {
                attributes::VALUE => Some(AttributeValue::Gauge(gauge.value())),
                _ => None,
            },
            Self::Counter(counter) => match attribute {
                attributes::COUNT => Some(AttributeValue::Integer(counter.count())),
                _ => None,
            },
            Self::Histogram(histogram) => match attribute {
                attributes::COUNT => Some(AttributeValue::Integer(histogram.count())),
                _ => read_distribution(histogram.as_ref(), attribute),
            },
            Self::Meter(meter) => match attribute {
                attributes::COUNT => Some(AttributeValue::Integer(meter.count())),
                _ => read_rate(meter.as_ref(), attribute),
            },
            Self::Timer(timer) => match attribute {
                attributes::COUNT => Some(AttributeValue::Integer(Metered::count(timer.as_ref()))),
                _ => read_distribution(timer.as_ref(), attribute)
                    .or_else(|| read_rate(timer.as_ref(), attribute)),
            },
            Self::Unrecognized { .. } => None,
        }
    }
}

fn read_distribution<S: Sampling + ?Sized>(
    sampling: &S,
    attribute: &str,
) -> Option<AttributeValue> {
    let value = match attribute {
        attributes::MIN => sampling.min(),
        attributes::MAX => sampling.max(),
        attributes::MEAN => sampling.mean(),
        attributes::STD_DEV => sampling.std_dev(),
        _ => {
            let quantile = attributes::PERCENTILES
                .iter()
                .find(|(name, _)| *name == attribute)
                .map(|(_, quantile)| *quantile)?;
            sampling.percentile(quantile)
        }
    };
    Some(AttributeValue::Float(value))
}

fn read_rate<M: Metered + ?Sized>(metered: &M, attribute: &str) -> Option<AttributeValue> {
    let value = match attribute {
        attributes::MEAN_RATE => metered.mean_rate(),
        attributes::ONE_MINUTE_RATE => metered.one_minute_rate(),
        attributes::FIVE_MINUTE_RATE => metered.five_minute_rate(),
        attributes::FIFTEEN_MINUTE_RATE => metered.fifteen_minute_rate(),
        _ => return None,
    };
    Some(AttributeValue::Float(value))
}

impl fmt::Debug for MetricHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized { type_name, .. } => {
                f.debug_struct("Unrecognized").field("type_name", type_name).finish()
            }
            other => f.debug_tuple("MetricHandle").field(&other.kind()).finish(),
        }
    }
}

/// Atomic counter for callers that have no counter of their own
#[derive(Debug, Default)]
pub struct SimpleCounter {
    count: AtomicI64,
}

impl SimpleCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, n: i64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }

    pub fn dec(&self) {
        self.count.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn clear(&self) {
        self.count.store(0, Ordering::Relaxed);
    }
}

impl Counter for SimpleCounter {
    fn count(&self) -> i64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl<F> Gauge for F
where
    F: Fn() -> GaugeValue + Send + Sync,
{
    fn value(&self) -> GaugeValue {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTimer;

    impl Sampling for FixedTimer {
        fn count(&self) -> i64 {
            7
        }
        fn min(&self) -> f64 {
            1.0
        }
        fn max(&self) -> f64 {
            9.0
        }
        fn mean(&self) -> f64 {
            4.0
        }
        fn std_dev(&self) -> f64 {
            2.0
        }
        fn percentile(&self, quantile: f64) -> f64 {
            quantile * 10.0
        }
    }

    impl Metered for FixedTimer {
        fn count(&self) -> i64 {
            7
        }
        fn mean_rate(&self) -> f64 {
            0.5
        }
        fn one_minute_rate(&self) -> f64 {
            1.0
        }
        fn five_minute_rate(&self) -> f64 {
            5.0
        }
        fn fifteen_minute_rate(&self) -> f64 {
            15.0
        }
    }

    #[test]
    fn test_simple_counter() {
        let counter = SimpleCounter::new();
        counter.inc();
        counter.inc_by(41);
        counter.dec();
        assert_eq!(counter.count(), 41);
        counter.clear();
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn test_read_counter_and_gauge() {
        let counter = SimpleCounter::new();
        counter.inc_by(42);
        let handle = MetricHandle::counter(counter);
        assert_eq!(handle.read("count"), Some(AttributeValue::Integer(42)));
        assert_eq!(handle.read("value"), None);

        let gauge = MetricHandle::gauge(|| GaugeValue::Text("up".to_string()));
        assert_eq!(
            gauge.read("value"),
            Some(AttributeValue::Gauge(GaugeValue::Text("up".to_string())))
        );
    }

    #[test]
    fn test_read_timer_covers_distribution_and_rates() {
        let handle = MetricHandle::timer(FixedTimer);
        assert_eq!(handle.kind(), MetricKind::Timer);
        assert_eq!(handle.read("count"), Some(AttributeValue::Integer(7)));
        assert_eq!(handle.read("stdDev"), Some(AttributeValue::Float(2.0)));
        assert_eq!(handle.read("95thPercentile"), Some(AttributeValue::Float(9.5)));
        assert_eq!(handle.read("fiveMinuteRate"), Some(AttributeValue::Float(5.0)));
        assert_eq!(handle.read("value"), None);
    }

    #[test]
    fn test_same_metric() {
        let handle = MetricHandle::counter(SimpleCounter::new());
        let clone = handle.clone();
        let other = MetricHandle::counter(SimpleCounter::new());
        assert!(handle.same_metric(&clone));
        assert!(!handle.same_metric(&other));
    }

    #[test]
    fn test_unrecognized_keeps_type_name() {
        let handle = MetricHandle::unrecognized(Arc::new(String::from("opaque")));
        assert_eq!(handle.kind(), MetricKind::Unrecognized);
        assert!(format!("{:?}", handle).contains("String"));
        assert_eq!(handle.read("count"), None);
    }
}
