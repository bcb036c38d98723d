//! Sub-Component Manager (C3, spec §4.3): one instance per child (DS, SPF,
//! SPFRX, B5DC, WMS), each wrapping C1+C2 for its own remote device and
//! translating raw events into the child's typed component state.

mod core;

pub mod b5dc;
pub mod ds;
pub mod spf;
pub mod spfrx;
pub mod wms;

pub use b5dc::B5dcManager;
pub use core::BuildStateCallback;
pub use ds::DsManager;
pub use spf::SpfManager;
pub use spfrx::SpfRxManager;
pub use wms::WmsManager;

use async_trait::async_trait;
use dish_manager_types::{CommunicationStatus, ComponentState, DishManagerResult, TaskStatus};
use std::sync::Arc;

/// Invoked on every component-state update, naming the child that changed.
/// C10 uses this to trigger re-aggregation (spec §7 pure functions are
/// "re-run on every child state change").
pub type ChangeCallback = Arc<dyn Fn(&'static str) + Send + Sync>;

/// The capability set shared by every child manager (spec §9 "Polymorphism").
#[async_trait]
pub trait SubComponentManager: Send + Sync {
    /// The child's name, as used in `Device.Command` fan-out logging and in
    /// the `{name}ConnectionState` mirrored key.
    fn name(&self) -> &'static str;

    async fn start_communicating(&self);
    async fn stop_communicating(&self);

    /// Issue a named command; rejects immediately if communication is not
    /// established (spec §4.3 "Command execution").
    async fn execute_command(&self, name: &str, arg: serde_json::Value) -> (TaskStatus, String);

    async fn write_attribute_value(&self, name: &str, value: serde_json::Value) -> DishManagerResult<()>;

    /// A read-copy snapshot of this child's component state.
    fn component_state(&self) -> ComponentState;

    fn communication_state(&self) -> CommunicationStatus;

    fn set_state_change_callback(&self, callback: ChangeCallback);
}
