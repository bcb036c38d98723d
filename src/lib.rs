//! Supervisory control-plane core for a single radio-telescope antenna.
//!
//! This crate is the thin public surface over the workspace: shared types
//! live in `dish-manager-types`, runtime behaviour in `dish-manager-core`.
//! A service front-end (TANGO device server, gRPC front, whatever the
//! deployment needs) is expected to depend on this crate alone.

pub use dish_manager_core::{
    AbortSequencer, ChangeCallback, CommandScheduler, DishManagerComponentManager, FanoutEngine,
    FanoutOutcome, LrcTracker, Plan, SubCommand, SubComponentManager, WatchdogTimer,
};
pub use dish_manager_types::{
    AttributeValue, B5dcOperatingMode, Band, CapabilityState, CommunicationStatus, ComponentState,
    DishManagerConfig, DishManagerError, DishManagerResult, DishMode, DsOperatingMode,
    DsPowerState, HealthState, InMemoryFlags, IndexerPosition, LrcRecord, LrcResult,
    PersistedFlags, PointingState, Quality, ResultCode, SpfOperatingMode, SpfPowerState,
    SpfRxOperatingMode, TaskStatus, TrackInterpolationMode,
};
