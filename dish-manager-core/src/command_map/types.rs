//! Shared plan/predicate types for the Command Map (C8, spec §4.8).

use dish_manager_types::ComponentState;
use std::sync::Arc;

/// A boolean over a `ComponentState` snapshot, evaluated on every child
/// state change until it holds (spec §4.8 "awaited predicate"). Used both
/// for a plan's aggregate predicate (over the rolled-up state) and for a
/// step's own predicate (over that one child's state).
pub type Predicate = Arc<dyn Fn(&ComponentState) -> bool + Send + Sync>;

/// One `Device.Command` step in a fan-out plan. `predicate`, when set, is
/// awaited against `device`'s own component state before the engine moves
/// on and logs `"{device}.{command} completed"`; without one the step is
/// fire-and-forget and the engine logs `"{device}.{command} accepted"`
/// immediately after dispatch.
#[derive(Clone)]
pub struct SubCommand {
    pub device: &'static str,
    pub command: &'static str,
    pub arg: serde_json::Value,
    pub predicate: Option<Predicate>,
    pub predicate_description: Option<String>,
}

impl SubCommand {
    pub fn new(device: &'static str, command: &'static str, arg: serde_json::Value) -> Self {
        Self { device, command, arg, predicate: None, predicate_description: None }
    }

    pub fn awaiting(mut self, predicate: Predicate, description: impl Into<String>) -> Self {
        self.predicate = Some(predicate);
        self.predicate_description = Some(description.into());
        self
    }
}

/// One high-level command's fan-out recipe.
pub struct Plan {
    pub name: &'static str,
    pub steps: Vec<SubCommand>,
    /// `None` for fire-and-forget commands (spec §4.8 rows marked "—").
    pub predicate: Option<Predicate>,
    pub predicate_description: Option<String>,
}

impl Plan {
    pub fn fanout_description(&self) -> String {
        let joined = self
            .steps
            .iter()
            .map(|s| format!("{}.{}", s.device, s.command))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Fanned out commands: {joined}")
    }
}
