//! Metric classification and name resolution
//!
//! Pure mapping from a registry entry to the resource name and the full set
//! of attribute descriptors the profile should expose for it.

use beacon_core::{
    attributes, ClassificationError, MetricHandle, MetricKind, MetricName,
    RegistrationDescriptor, ValueType,
};

/// Everything the reporter registers for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub kind: MetricKind,
    pub resource_name: String,
    pub event_name: String,
    pub descriptors: Vec<RegistrationDescriptor>,
}

/// Classify a metric and enumerate its attributes
///
/// | kind      | attributes                                  |
/// |-----------|---------------------------------------------|
/// | gauge     | `value`                                     |
/// | counter   | `count`                                     |
/// | histogram | `count` + distribution fields               |
/// | meter     | `count` + rate fields                       |
/// | timer     | `count` + distribution fields + rate fields |
///
/// `count` always carries the counter+rate kinds, everything else is a value.
pub fn classify(
    name: &MetricName,
    handle: &MetricHandle,
) -> Result<Classification, ClassificationError> {
    let resource_name = name.resource_name();
    let event_name = name.event_name();

    let descriptors = match handle {
        MetricHandle::Gauge(_) => vec![RegistrationDescriptor::value(
            &resource_name,
            &event_name,
            attributes::VALUE,
            ValueType::Dynamic,
        )],
        MetricHandle::Counter(_) => vec![count(&resource_name, &event_name)],
        MetricHandle::Histogram(_) => {
            let mut descriptors = vec![count(&resource_name, &event_name)];
            descriptors.extend(floats(&resource_name, &event_name, attributes::DISTRIBUTION));
            descriptors
        }
        MetricHandle::Meter(_) => {
            let mut descriptors = vec![count(&resource_name, &event_name)];
            descriptors.extend(floats(&resource_name, &event_name, attributes::RATES));
            descriptors
        }
        MetricHandle::Timer(_) => {
            let mut descriptors = vec![count(&resource_name, &event_name)];
            descriptors.extend(floats(&resource_name, &event_name, attributes::DISTRIBUTION));
            descriptors.extend(floats(&resource_name, &event_name, attributes::RATES));
            descriptors
        }
        MetricHandle::Unrecognized { type_name, .. } => {
            return Err(ClassificationError::Unrecognized {
                resource_name,
                type_name: type_name.to_string(),
            });
        }
    };

    Ok(Classification {
        kind: handle.kind(),
        resource_name,
        event_name,
        descriptors,
    })
}

fn count(resource_name: &str, event_name: &str) -> RegistrationDescriptor {
    RegistrationDescriptor::counter(resource_name, event_name, attributes::COUNT)
}

fn floats<'a>(
    resource_name: &'a str,
    event_name: &'a str,
    names: &'static [&'static str],
) -> impl Iterator<Item = RegistrationDescriptor> + 'a {
    names.iter().map(move |attribute| {
        RegistrationDescriptor::value(resource_name, event_name, attribute, ValueType::Float)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::{GaugeValue, Metered, MonitoringKind, Sampling, SimpleCounter};
    use std::collections::HashSet;
    use std::sync::Arc;

    struct Flat;

    impl Sampling for Flat {
        fn count(&self) -> i64 {
            0
        }
        fn min(&self) -> f64 {
            0.0
        }
        fn max(&self) -> f64 {
            0.0
        }
        fn mean(&self) -> f64 {
            0.0
        }
        fn std_dev(&self) -> f64 {
            0.0
        }
        fn percentile(&self, _quantile: f64) -> f64 {
            0.0
        }
    }

    impl Metered for Flat {
        fn count(&self) -> i64 {
            0
        }
        fn mean_rate(&self) -> f64 {
            0.0
        }
        fn one_minute_rate(&self) -> f64 {
            0.0
        }
        fn five_minute_rate(&self) -> f64 {
            0.0
        }
        fn fifteen_minute_rate(&self) -> f64 {
            0.0
        }
    }

    fn attribute_names(c: &Classification) -> Vec<&str> {
        c.descriptors.iter().map(|d| d.attribute_name.as_str()).collect()
    }

    fn name() -> MetricName {
        MetricName::new("http", "requests", "total").with_scope("api")
    }

    #[test]
    fn test_counter_yields_single_count() {
        let c = classify(&name(), &MetricHandle::counter(SimpleCounter::new())).unwrap();

        assert_eq!(c.kind, MetricKind::Counter);
        assert_eq!(c.resource_name, "http:type=requests,scope=api,name=total");
        assert_eq!(c.event_name, "http.requests-api-total");
        assert_eq!(c.descriptors.len(), 1);

        let d = &c.descriptors[0];
        assert_eq!(d.attribute_name, "count");
        assert_eq!(d.label, "count");
        assert_eq!(d.event_name, "http.requests-api-total");
        assert_eq!(d.monitoring_kinds, MonitoringKind::COUNTER_KINDS);
        assert_eq!(d.value_type, ValueType::Integer);
    }

    #[test]
    fn test_gauge_yields_single_value() {
        let c = classify(&name(), &MetricHandle::gauge(|| GaugeValue::Float(0.5))).unwrap();
        assert_eq!(attribute_names(&c), vec!["value"]);
        assert_eq!(c.descriptors[0].monitoring_kinds, MonitoringKind::VALUE_KINDS);
        assert_eq!(c.descriptors[0].value_type, ValueType::Dynamic);
    }

    #[test]
    fn test_histogram_attributes() {
        let c = classify(&name(), &MetricHandle::histogram(Flat)).unwrap();
        assert_eq!(
            attribute_names(&c),
            vec![
                "count",
                "min",
                "max",
                "mean",
                "stdDev",
                "50thPercentile",
                "75thPercentile",
                "95thPercentile",
                "98thPercentile",
                "99thPercentile",
                "999thPercentile",
            ]
        );
        assert!(c.descriptors[0].is_counter());
        assert!(c.descriptors[1..].iter().all(|d| !d.is_counter()));
    }

    #[test]
    fn test_meter_attributes() {
        let c = classify(&name(), &MetricHandle::meter(Flat)).unwrap();
        assert_eq!(
            attribute_names(&c),
            vec![
                "count",
                "meanRate",
                "oneMinuteRate",
                "fiveMinuteRate",
                "fifteenMinuteRate"
            ]
        );
    }

    #[test]
    fn test_timer_is_union_of_meter_and_histogram() {
        let timer = classify(&name(), &MetricHandle::timer(Flat)).unwrap();
        let meter = classify(&name(), &MetricHandle::meter(Flat)).unwrap();
        let histogram = classify(&name(), &MetricHandle::histogram(Flat)).unwrap();

        assert_eq!(timer.descriptors.len(), 15);
        assert_eq!(
            timer.descriptors.iter().filter(|d| d.attribute_name == "count").count(),
            1
        );

        let union: HashSet<&str> = attribute_names(&meter)
            .into_iter()
            .chain(attribute_names(&histogram))
            .collect();
        let timer_set: HashSet<&str> = attribute_names(&timer).into_iter().collect();
        assert_eq!(timer_set, union);
    }

    #[test]
    fn test_unrecognized_is_an_error() {
        let handle = MetricHandle::unrecognized(Arc::new(42u8));
        let err = classify(&name(), &handle).unwrap_err();
        assert_eq!(
            err,
            ClassificationError::Unrecognized {
                resource_name: "http:type=requests,scope=api,name=total".to_string(),
                type_name: "u8".to_string(),
            }
        );
    }

    #[test]
    fn test_classification_is_deterministic() {
        let handle = MetricHandle::timer(Flat);
        let a = classify(&name(), &handle).unwrap();
        let b = classify(&name(), &handle).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_attribute_casing_is_uniform() {
        let c = classify(&name(), &MetricHandle::timer(Flat)).unwrap();
        for d in &c.descriptors {
            let first = d.attribute_name.chars().next().unwrap();
            assert!(!first.is_ascii_uppercase(), "{} is capitalized", d.attribute_name);
        }
    }
}
