//! Single Pixel Feed (SPF) sub-component manager.

use super::core::ChildCore;
use super::{ChangeCallback, SubComponentManager};
use crate::device::DeviceProxyManager;
use async_trait::async_trait;
use dish_manager_types::{schemas, CommunicationStatus, ComponentState, DishManagerResult, TaskStatus};
use std::sync::Arc;

pub struct SpfManager {
    core: Arc<ChildCore>,
}

impl SpfManager {
    pub fn new(address: impl Into<String>, proxy: Arc<DeviceProxyManager>) -> Self {
        Self {
            core: Arc::new(ChildCore::new("SPF", address, schemas::spf_schema(), proxy)),
        }
    }
}

#[async_trait]
impl SubComponentManager for SpfManager {
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
