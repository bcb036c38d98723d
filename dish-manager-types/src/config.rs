//! Configuration for the dish manager core.
//!
//! Grounded on the `tasker-shared::config` module style: a plain
//! `Deserialize`-able struct with a `Default` matching the literal values
//! spec.md calls out, plus a `from_toml_str` helper. This is not a
//! bootstrap loader — reading a config file off disk is the external
//! service front-end's job (spec.md §1 Non-goals); this type only describes
//! the shape of that configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the device proxy manager (C1).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeviceProxyConfig {
    /// Initial back-off sleep, in seconds, before the first retry.
    pub initial_backoff_secs: f64,
    /// Back-off multiplier applied after each failed attempt.
    pub backoff_factor: f64,
    /// Maximum number of retry attempts before giving up.
    pub max_retries: u32,
    /// Per-command timeout.
    pub command_timeout: Duration,
}

impl Default for DeviceProxyConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: 1.0,
            backoff_factor: 1.5,
            max_retries: 5,
            command_timeout: Duration::from_secs(5),
        }
    }
}

/// Tunables for the LRC tracker (C4).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LrcTrackerConfig {
    /// Maximum retained LRC records before FIFO eviction.
    pub history_bound: usize,
}

impl Default for LrcTrackerConfig {
    fn default() -> Self {
        Self { history_bound: 64 }
    }
}

/// Tunables for validating writes to `programTrackTable` and
/// `dscPowerLimitkW` (spec §6, §8).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ValidationConfig {
    /// Minimum seconds into the future a track-table timestamp must be.
    pub track_table_lead_time_secs: f64,
    /// Inclusive allowed range for `dscPowerLimitkW`.
    pub dsc_power_limit_range_kw: (f64, f64),
    /// The antenna id `ApplyPointingModel` payloads must match (spec §6,
    /// §7 "Dish id ... Antenna's value ... are not equal").
    pub antenna_id: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            track_table_lead_time_secs: 5.0,
            dsc_power_limit_range_kw: (1.0, 20.0),
            antenna_id: "SKA001".to_string(),
        }
    }
}

/// Tunables for the TMC supervisor-heartbeat watchdog (C6).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct WatchdogConfig {
    /// Default timeout used when none has been armed yet.
    pub default_timeout_secs: f64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            default_timeout_secs: 10.0,
        }
    }
}

/// Top-level configuration for the dish manager core.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DishManagerConfig {
    #[serde(default)]
    pub device_proxy: DeviceProxyConfig,
    #[serde(default)]
    pub lrc_tracker: LrcTrackerConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
}

impl DishManagerConfig {
    /// Parse configuration from a TOML document, falling back to defaults
    /// for any field the document omits.
    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}
