//! Structured metric names and the external names derived from them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that force a resource-name value to be quoted
const QUOTE_TRIGGERS: &[char] = &[',', '=', ':', '"', '*', '?', '\n', '\\'];

/// Structured identifier of a metric in the registry
///
/// `group` and `metric_type` are always present. `scope` may be absent and
/// `name` may be empty; both are left out of derived names in that case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricName {
    pub group: String,
    pub metric_type: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Caller-chosen resource name, used verbatim instead of the derived one
    #[serde(default)]
    resource_override: Option<String>,
}

impl MetricName {
    pub fn new(
        group: impl Into<String>,
        metric_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            metric_type: metric_type.into(),
            scope: None,
            name: name.into(),
            resource_override: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Pin the resource name instead of deriving it from the name parts
    pub fn with_resource_name(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_override = Some(resource_name.into());
        self
    }

    /// Canonical identifier of the resource that owns this metric's attributes
    ///
    /// Formatted as `group:type=T[,scope=S][,name=N]`. Values containing
    /// separators are quoted so distinct names never collide.
    pub fn resource_name(&self) -> String {
        if let Some(resource) = &self.resource_override {
            return resource.clone();
        }

        let mut resource = quote_if_needed(&self.group);
        resource.push_str(":type=");
        resource.push_str(&quote_if_needed(&self.metric_type));
        if let Some(scope) = &self.scope {
            resource.push_str(",scope=");
            resource.push_str(&quote_if_needed(scope));
        }
        if !self.name.is_empty() {
            resource.push_str(",name=");
            resource.push_str(&quote_if_needed(&self.name));
        }
        resource
    }

    /// Human-facing event name: `group.type[-scope][-name]`
    pub fn event_name(&self) -> String {
        let mut event = format!("{}.{}", self.group, self.metric_type);
        if let Some(scope) = &self.scope {
            event.push('-');
            event.push_str(scope);
        }
        if !self.name.is_empty() {
            event.push('-');
            event.push_str(&self.name);
        }
        event
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.event_name())
    }
}

fn quote_if_needed(value: &str) -> String {
    if !value.contains(QUOTE_TRIGGERS) {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '*' => quoted.push_str("\\*"),
            '?' => quoted.push_str("\\?"),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_with_all_parts() {
        let name = MetricName::new("http", "requests", "total").with_scope("api");
        assert_eq!(name.event_name(), "http.requests-api-total");
    }

    #[test]
    fn test_event_name_omits_missing_parts() {
        assert_eq!(MetricName::new("jvm", "memory", "").event_name(), "jvm.memory");
        assert_eq!(
            MetricName::new("jvm", "memory", "").with_scope("heap").event_name(),
            "jvm.memory-heap"
        );
        assert_eq!(MetricName::new("jvm", "memory", "used").event_name(), "jvm.memory-used");
    }

    #[test]
    fn test_resource_name_format() {
        let name = MetricName::new("http", "requests", "total").with_scope("api");
        assert_eq!(name.resource_name(), "http:type=requests,scope=api,name=total");

        let bare = MetricName::new("http", "requests", "");
        assert_eq!(bare.resource_name(), "http:type=requests");
    }

    #[test]
    fn test_resource_name_quotes_separators() {
        let name = MetricName::new("db", "pool", "a,b=c");
        assert_eq!(name.resource_name(), "db:type=pool,name=\"a,b=c\"");

        let tricky = MetricName::new("db", "pool", "say \"hi\"*");
        assert_eq!(tricky.resource_name(), "db:type=pool,name=\"say \\\"hi\\\"\\*\"");
    }

    #[test]
    fn test_scope_and_name_do_not_collide() {
        let scoped = MetricName::new("g", "t", "").with_scope("x");
        let named = MetricName::new("g", "t", "x");
        assert_ne!(scoped.resource_name(), named.resource_name());
    }

    #[test]
    fn test_names_are_deterministic() {
        let a = MetricName::new("cache", "hits", "l1").with_scope("users");
        let b = MetricName::new("cache", "hits", "l1").with_scope("users");
        assert_eq!(a, b);
        assert_eq!(a.resource_name(), b.resource_name());
        assert_eq!(a.event_name(), b.event_name());
    }

    #[test]
    fn test_resource_override() {
        let name = MetricName::new("http", "requests", "total").with_resource_name("custom:id=1");
        assert_eq!(name.resource_name(), "custom:id=1");
        assert_eq!(name.event_name(), "http.requests-total");
    }
}
