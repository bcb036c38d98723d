//! Shared types for the dish manager supervisory control plane: the
//! rolled-up and per-child enumerations, the component-state model, the
//! error taxonomy, the dish-mode transition graph, configuration, and the
//! persisted-flags seam. `dish-manager-core` builds the runtime behaviour
//! on top of these.

pub mod component_state;
pub mod config;
pub mod enums;
pub mod errors;
pub mod graph;
pub mod lrc;
pub mod persistence;
pub mod schemas;

pub use component_state::{AttributeValue, ComponentState, Quality};
pub use config::{DeviceProxyConfig, DishManagerConfig, LrcTrackerConfig, ValidationConfig, WatchdogConfig};
pub use enums::{
    B5dcOperatingMode, Band, CapabilityState, CommunicationStatus, DishMode, DsOperatingMode,
    DsPowerState, HealthState, IndexerPosition, PointingState, ResultCode, SpfOperatingMode,
    SpfPowerState, SpfRxOperatingMode, TaskStatus, TrackInterpolationMode,
};
pub use errors::{DishManagerError, DishManagerResult};
pub use graph::is_command_allowed;
pub use lrc::{new_command_id, LrcRecord, LrcResult};
pub use persistence::{InMemoryFlags, PersistedFlags};
