//! Runtime behaviour for the dish manager supervisory control plane:
//! device proxying (C1/C2), per-child sub-component managers (C3),
//! aggregation (C7), the command map / fan-out engine (C8), the abort
//! sequencer (C9), and the top-level component manager (C10) that binds
//! them all together. Shared types live in `dish-manager-types`.

pub mod abort;
pub mod aggregation;
pub mod command_map;
pub mod component_manager;
pub mod components;
pub mod device;
pub mod lrc_tracker;
pub mod pointing_model;
pub mod scheduler;
pub mod tai;
pub mod watchdog;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use abort::AbortSequencer;
pub use command_map::{FanoutEngine, FanoutOutcome, Plan, SubCommand};
pub use component_manager::DishManagerComponentManager;
pub use components::{BuildStateCallback, ChangeCallback, SubComponentManager};
pub use lrc_tracker::LrcTracker;
pub use pointing_model::validate as validate_pointing_model;
pub use scheduler::CommandScheduler;
pub use watchdog::WatchdogTimer;
