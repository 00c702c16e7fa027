//! Reporter configuration
//!
//! Loaded from a TOML file; every field has a default so an absent file or
//! an empty table yields the stock one-minute schedule.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::{BeaconError, Result};

/// Unit of the reporting period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// `amount` of this unit as a [`Duration`], saturating on overflow
    pub fn duration(self, amount: u64) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(amount),
            TimeUnit::Microseconds => Duration::from_micros(amount),
            TimeUnit::Milliseconds => Duration::from_millis(amount),
            TimeUnit::Seconds => Duration::from_secs(amount),
            TimeUnit::Minutes => Duration::from_secs(amount.saturating_mul(60)),
            TimeUnit::Hours => Duration::from_secs(amount.saturating_mul(3600)),
            TimeUnit::Days => Duration::from_secs(amount.saturating_mul(86_400)),
        }
    }
}

/// Reporting schedule and registration behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Period between passes, in `unit`
    #[serde(default = "default_period")]
    pub period: u64,

    #[serde(default = "default_unit")]
    pub unit: TimeUnit,

    /// Upper bound on each profile `register`/`add` call
    #[serde(default = "default_registration_timeout_ms")]
    pub registration_timeout_ms: u64,

    /// Hand unrecognized metrics to the secondary exporter, if one is set
    #[serde(default = "default_export_unrecognized")]
    pub export_unrecognized: bool,
}

// Default value providers
fn default_period() -> u64 {
    1
}

fn default_unit() -> TimeUnit {
    TimeUnit::Minutes
}

fn default_registration_timeout_ms() -> u64 {
    5_000
}

fn default_export_unrecognized() -> bool {
    true
}

impl ReporterConfig {
    /// Config with the given period and defaults elsewhere
    pub fn every(period: u64, unit: TimeUnit) -> Self {
        Self {
            period,
            unit,
            ..Self::default()
        }
    }

    /// Load configuration from `path`, or use defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            BeaconError::InvalidConfig(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| BeaconError::InvalidConfig(format!("Failed to serialize config: {}", e)))
    }

    /// Reject settings the scheduler cannot arm
    pub fn validate(&self) -> Result<()> {
        if self.period().is_zero() {
            return Err(BeaconError::InvalidConfig(
                "reporting period must be greater than zero".to_string(),
            ));
        }
        if self.registration_timeout_ms == 0 {
            return Err(BeaconError::InvalidConfig(
                "registration timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        self.unit.duration(self.period)
    }

    pub fn registration_timeout(&self) -> Duration {
        Duration::from_millis(self.registration_timeout_ms)
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            period: default_period(),
            unit: default_unit(),
            registration_timeout_ms: default_registration_timeout_ms(),
            export_unrecognized: default_export_unrecognized(),
        }
    }
}
