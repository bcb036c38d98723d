//! Weather Monitoring System (WMS) sub-component manager.
//!
//! WMS is a rolled-up view over a group of weather stations (spec §4.3
//! "WMS is a device group, not a single device"); the group-aggregation
//! itself happens upstream in the transport's `windgust`/`meanwindspeed`
//! rollup attributes, so this manager is otherwise identical to the other
//! children.

use super::core::ChildCore;
use super::{ChangeCallback, SubComponentManager};
use crate::device::DeviceProxyManager;
use async_trait::async_trait;
use dish_manager_types::{schemas, CommunicationStatus, ComponentState, DishManagerResult, TaskStatus};
use std::sync::Arc;

pub struct WmsManager {
    core: Arc<ChildCore>,
}

impl WmsManager {
    pub fn new(address: impl Into<String>, proxy: Arc<DeviceProxyManager>) -> Self {
        Self {
            core: Arc::new(ChildCore::new("WMS", address, schemas::wms_schema(), proxy)),
        }
    }
}

#[async_trait]
impl SubComponentManager for WmsManager {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn start_communicating(&self) {
        self.core.start_communicating().await;
    }

    async fn stop_communicating(&self) {
        self.core.stop_communicating().await;
    }

    async fn execute_command(&self, name: &str, arg: serde_json::Value) -> (TaskStatus, String) {
        self.core.execute_command(name, arg).await
    }

    async fn write_attribute_value(&self, name: &str, value: serde_json::Value) -> DishManagerResult<()> {
        self.core.write_attribute_value(name, value).await
    }

    fn component_state(&self) -> ComponentState {
        self.core.component_state()
    }

    fn communication_state(&self) -> CommunicationStatus {
        self.core.communication_state()
    }

    fn set_state_change_callback(&self, callback: ChangeCallback) {
        self.core.set_state_change_callback(callback);
    }
}
