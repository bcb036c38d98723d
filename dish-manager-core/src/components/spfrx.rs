//! SPF Receiver (SPFRX) sub-component manager.
//!
//! SPFRX gets one extra duty beyond the shared [`ChildCore`] machinery: while
//! communication has not yet been established, it issues a `MonitorPing`
//! command every 30 seconds through the Command Scheduler (C5) to prod the
//! device into resuming its event stream (spec §4.3 "SPFRX keep-alive").
//! The job is removed on `stop_communicating` so it never outlives the
//! manager's own lifecycle.

use super::core::ChildCore;
use super::{ChangeCallback, SubComponentManager};
use crate::device::DeviceProxyManager;
use crate::scheduler::CommandScheduler;
use async_trait::async_trait;
use dish_manager_types::{
    schemas, CommunicationStatus, ComponentState, DishManagerResult, TaskStatus,
};
use std::sync::Arc;
use std::time::Duration;

const MONITOR_PING_PERIOD: Duration = Duration::from_secs(30);

pub struct SpfRxManager {
    core: Arc<ChildCore>,
    scheduler: Arc<CommandScheduler>,
    job_name: String,
}

impl SpfRxManager {
    pub fn new(
        address: impl Into<String>,
        proxy: Arc<DeviceProxyManager>,
        scheduler: Arc<CommandScheduler>,
    ) -> Self {
        let address = address.into();
        let job_name = format!("spfrx-monitor-ping-{address}");
        Self {
            core: Arc::new(ChildCore::new("SPFRX", address, schemas::spfrx_schema(), proxy)),
            scheduler,
            job_name,
        }
    }
}

#[async_trait]
impl SubComponentManager for SpfRxManager {
    fn name(&self) -> &'static str {
        self.core.name()
    }

    async fn start_communicating(&self) {
        self.core.start_communicating().await;
        let core = self.core.clone();
        self.scheduler.submit(self.job_name.clone(), MONITOR_PING_PERIOD, move || {
            let core = core.clone();
            Box::pin(async move {
                if core.communication_state() != CommunicationStatus::Established {
                    let _ = core.execute_command("MonitorPing", serde_json::Value::Null).await;
                }
            })
        });
    }

    async fn stop_communicating(&self) {
        self.scheduler.remove(&self.job_name);
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
