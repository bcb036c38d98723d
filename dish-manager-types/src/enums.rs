//! Enumerations shared by the rolled-up dish state and the per-child
//! component states (spec §3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The dish's externally visible operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DishMode {
    Startup,
    Shutdown,
    StandbyLp,
    StandbyFp,
    Maintenance,
    Stow,
    Config,
    Operate,
    Unknown,
}

impl Default for DishMode {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for DishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Startup => "STARTUP",
            Self::Shutdown => "SHUTDOWN",
            Self::StandbyLp => "STANDBY_LP",
            Self::StandbyFp => "STANDBY_FP",
            Self::Maintenance => "MAINTENANCE",
            Self::Stow => "STOW",
            Self::Config => "CONFIG",
            Self::Operate => "OPERATE",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Dish Structure operating mode, as reported by the DS controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DsOperatingMode {
    Unknown,
    Startup,
    StandbyLp,
    StandbyFp,
    Point,
    Stow,
    Estop,
}

impl Default for DsOperatingMode {
    fn default() -> Self {
        Self::Unknown
    }
}

/// DS reported power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DsPowerState {
    Off,
    Ups,
    FullPower,
    LowPower,
    Unknown,
}

impl Default for DsPowerState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// SPF operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpfOperatingMode {
    Unknown,
    Startup,
    StandbyLp,
    Maintenance,
    Operate,
}

impl Default for SpfOperatingMode {
    fn default() -> Self {
        Self::Unknown
    }
}

/// SPF reported power state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpfPowerState {
    Off,
    Ups,
    FullPower,
    LowPower,
    Unknown,
}

impl Default for SpfPowerState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// SPF Receiver operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpfRxOperatingMode {
    Unknown,
    Startup,
    Standby,
    DataCapture,
    Configure,
    Maintenance,
}

impl Default for SpfRxOperatingMode {
    fn default() -> Self {
        Self::Unknown
    }
}

/// B5DC admin/operating mode (the down-converter has a small enum of its own).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum B5dcOperatingMode {
    Unknown,
    Startup,
    Standby,
    Operate,
}

impl Default for B5dcOperatingMode {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Pointing state of the dish structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointingState {
    Ready,
    Slew,
    Track,
    Scan,
    Unknown,
}

impl Default for PointingState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Receiver band identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Unknown,
    B1,
    B2,
    B3,
    B4,
    B5a,
    B5b,
    None,
}

impl Default for Band {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "UNKNOWN",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::B3 => "B3",
            Self::B4 => "B4",
            Self::B5a => "B5a",
            Self::B5b => "B5b",
            Self::None => "NONE",
        };
        f.write_str(s)
    }
}

impl Band {
    /// All bands that `ConfigureBandN` commands and `bXCapabilityState`
    /// attributes are indexed by, in schema order.
    pub const CONFIGURABLE: [Band; 6] = [
        Band::B1,
        Band::B2,
        Band::B3,
        Band::B4,
        Band::B5a,
        Band::B5b,
    ];
}

/// Rolled-up per-band capability state (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityState {
    Unavailable,
    Standby,
    Configuring,
    OperateDegraded,
    OperateFull,
    Unknown,
}

impl Default for CapabilityState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Child-health classification, worst-of aggregated by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HealthState {
    Ok,
    Degraded,
    Failed,
    Unknown,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Per-child communication status, mirrored onto `{name}ConnectionState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunicationStatus {
    Disabled,
    NotEstablished,
    Established,
}

impl Default for CommunicationStatus {
    fn default() -> Self {
        Self::Disabled
    }
}

/// Lifecycle status of a long-running command (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Staging,
    Queued,
    InProgress,
    Completed,
    Failed,
    Aborted,
    Rejected,
    NotFound,
}

impl TaskStatus {
    /// Whether this status is a terminal status for an LRC record.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Aborted | Self::Rejected
        )
    }
}

/// Synchronous result code returned at command submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultCode {
    Ok,
    Started,
    Queued,
    Aborted,
    Rejected,
    Failed,
    Unknown,
}

/// Interpolation mode used for the program-track table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackInterpolationMode {
    Spline,
    Newton,
}

impl Default for TrackInterpolationMode {
    fn default() -> Self {
        Self::Spline
    }
}

/// DS track-program-table indexer position, part of the DS component state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexerPosition {
    Unknown,
    B1,
    B2,
    B3,
    B4,
    B5,
    Moving,
}

impl Default for IndexerPosition {
    fn default() -> Self {
        Self::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dish_mode_display_matches_schema_names() {
        assert_eq!(DishMode::StandbyFp.to_string(), "STANDBY_FP");
        assert_eq!(DishMode::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn health_state_ordering_is_worst_last() {
        assert!(HealthState::Ok < HealthState::Degraded);
        assert!(HealthState::Degraded < HealthState::Failed);
        assert!(HealthState::Failed < HealthState::Unknown);
    }

    #[test]
    fn task_status_terminal_classification() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Aborted.is_terminal());
        assert!(!TaskStatus::InProgress.is_terminal());
        assert!(!TaskStatus::Queued.is_terminal());
    }

    #[test]
    fn configurable_bands_are_in_schema_order() {
        assert_eq!(
            Band::CONFIGURABLE,
            [Band::B1, Band::B2, Band::B3, Band::B4, Band::B5a, Band::B5b]
        );
    }
}
