//! Command Map / Fan-out Engine (C8, spec §4.8).

pub mod engine;
pub mod plans;
pub mod types;

pub use engine::{FanoutEngine, FanoutOutcome};
pub use types::{Plan, SubCommand};
