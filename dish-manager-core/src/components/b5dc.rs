//! Band 5 Down Converter (B5DC) sub-component manager.

use super::core::ChildCore;
use super::{BuildStateCallback, ChangeCallback, SubComponentManager};
use crate::device::DeviceProxyManager;
use async_trait::async_trait;
use dish_manager_types::{schemas, CommunicationStatus, ComponentState, DishManagerResult, TaskStatus};
use std::sync::Arc;

pub struct B5dcManager {
    core: Arc<ChildCore>,
}

impl B5dcManager {
    pub fn new(address: impl Into<String>, proxy: Arc<DeviceProxyManager>) -> Self {
        Self {
            core: Arc::new(ChildCore::new("B5DC", address, schemas::b5dc_schema(), proxy)),
        }
    }

    /// Registers the seam a release-info collector hangs off: fired once
    /// per ESTABLISHED edge with B5DC's freshly-seen `buildstate` value.
    pub fn set_build_state_callback(&self, callback: BuildStateCallback) {
        self.core.set_build_state_callback(callback);
    }
}

#[async_trait]
impl SubComponentManager for B5dcManager {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;

    #[tokio::test]
    async fn component_state_starts_with_full_schema() {
        let proxy = Arc::new(DeviceProxyManager::new(
            Arc::new(MockTransport::default()),
            Default::default(),
        ));
        let manager = B5dcManager::new("b5dc-001", proxy);
        assert_eq!(manager.component_state().len(), schemas::b5dc_schema().len());
    }
}
