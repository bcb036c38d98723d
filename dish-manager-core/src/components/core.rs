//! Shared machinery behind every concrete [`super::SubComponentManager`]:
//! owns the component-state map, drives the C2 event loop, and mirrors
//! communication-state transitions.

use super::ChangeCallback;
use crate::device::{DeviceMonitor, DeviceProxyManager};
use chrono::Utc;
use dish_manager_types::{
    AttributeValue, CommunicationStatus, ComponentState, DishManagerError, DishManagerResult,
    Quality, TaskStatus,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::info;

/// Core state and event-loop plumbing reused by every child manager. Each
/// concrete manager (DS, SPF, ...) owns one `ChildCore` configured with its
/// own schema and address, and implements `SubComponentManager` mostly by
/// delegating here.
/// Fired once per ESTABLISHED edge with the child's freshly-seen
/// `buildstate` value, for a release-info collector to consume.
pub type BuildStateCallback = Arc<dyn Fn(&str, String) + Send + Sync>;

pub struct ChildCore {
    name: &'static str,
    address: String,
    schema: Vec<&'static str>,
    proxy: Arc<DeviceProxyManager>,
    state: Arc<Mutex<ComponentState>>,
    comm_status: Arc<Mutex<CommunicationStatus>>,
    callback: Arc<Mutex<Option<ChangeCallback>>>,
    build_state_callback: Arc<Mutex<Option<BuildStateCallback>>>,
    build_state_fetched: Arc<Mutex<bool>>,
    sink_capacity: usize,
    running: Mutex<Option<(crate::device::monitor::MonitorHandle, JoinHandle<()>)>>,
}

impl ChildCore {
    pub fn new(
        name: &'static str,
        address: impl Into<String>,
        schema: Vec<&'static str>,
        proxy: Arc<DeviceProxyManager>,
    ) -> Self {
        let now = Utc::now();
        Self {
            name,
            address: address.into(),
            state: Arc::new(Mutex::new(ComponentState::new_with_schema(&schema, now))),
            schema,
            proxy,
            comm_status: Arc::new(Mutex::new(CommunicationStatus::Disabled)),
            callback: Arc::new(Mutex::new(None)),
            build_state_callback: Arc::new(Mutex::new(None)),
            build_state_fetched: Arc::new(Mutex::new(false)),
            sink_capacity: 256,
            running: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn set_state_change_callback(&self, callback: ChangeCallback) {
        *self.callback.lock().expect("callback lock poisoned") = Some(callback);
    }

    /// Registers the release-info collector's sink for this child's
    /// once-per-ESTABLISHED-edge `buildstate` fetch.
    pub fn set_build_state_callback(&self, callback: BuildStateCallback) {
        *self.build_state_callback.lock().expect("build state callback lock poisoned") = Some(callback);
    }

    fn fire_callback(&self) {
        if let Some(callback) = self.callback.lock().expect("callback lock poisoned").as_ref() {
            callback(self.name);
        }
    }

    fn set_comm_status(&self, status: CommunicationStatus) {
        let mut current = self.comm_status.lock().expect("comm status lock poisoned");
        if *current != status {
            info!(child = self.name, from = ?*current, to = ?status, "communication state changed");
            *current = status;
        }
    }

    pub fn communication_state(&self) -> CommunicationStatus {
        *self.comm_status.lock().expect("comm status lock poisoned")
    }

    pub fn component_state(&self) -> ComponentState {
        self.state.lock().expect("component state lock poisoned").clone()
    }

    pub async fn start_communicating(self: &Arc<Self>) {
        if self.running.lock().expect("running lock poisoned").is_some() {
            return;
        }
        self.set_comm_status(CommunicationStatus::NotEstablished);
        let monitor = Arc::new(DeviceMonitor::new(self.proxy.clone()));
        let attributes = self.schema.iter().map(|s| s.to_string()).collect();
        let (sink, monitor_handle) = monitor.spawn(self.address.clone(), attributes, self.sink_capacity);

        let this = self.clone();
        let event_task = tokio::spawn(async move {
            loop {
                let event = sink.recv().await;
                let now = Utc::now();
                if event.error {
                    this.state.lock().expect("component state lock poisoned").degrade_quality(now);
                    this.set_comm_status(CommunicationStatus::NotEstablished);
                    *this.build_state_fetched.lock().expect("build state flag lock poisoned") = false;
                } else {
                    let quality = event.quality;
                    let attr = if matches!(quality, Quality::Valid) {
                        AttributeValue::valid(event.value.clone(), now)
                    } else {
                        AttributeValue::invalid(event.value.clone(), now)
                    };
                    this.state
                        .lock()
                        .expect("component state lock poisoned")
                        .set(&event.name, attr);
                    this.set_comm_status(CommunicationStatus::Established);
                    this.maybe_fetch_build_state(&event.name, &event.value);
                }
                this.fire_callback();
            }
        });

        *self.running.lock().expect("running lock poisoned") = Some((monitor_handle, event_task));
    }

    /// On each new ESTABLISHED edge, the first `buildstate` event seen is
    /// fetched once and handed to the release-info collector; later
    /// `buildstate` events on the same connection are passive updates only.
    fn maybe_fetch_build_state(&self, attribute: &str, value: &serde_json::Value) {
        if attribute != "buildstate" {
            return;
        }
        let mut fetched = self.build_state_fetched.lock().expect("build state flag lock poisoned");
        if *fetched {
            return;
        }
        *fetched = true;
        drop(fetched);
        if let Some(callback) = self.build_state_callback.lock().expect("build state callback lock poisoned").as_ref()
        {
            callback(self.name, value.to_string());
        }
    }

    pub async fn stop_communicating(&self) {
        let running = self.running.lock().expect("running lock poisoned").take();
        if let Some((monitor_handle, event_task)) = running {
            monitor_handle.stop().await;
            event_task.abort();
        }
        self.set_comm_status(CommunicationStatus::Disabled);
        *self.build_state_fetched.lock().expect("build state flag lock poisoned") = false;
        self.fire_callback();
    }

    /// Shared guard every `execute_command` implementation opens with
    /// (spec §4.3 "Command execution": reject immediately unless
    /// `communication_state == ESTABLISHED`).
    pub fn require_established(&self) -> DishManagerResult<()> {
        if self.communication_state() != CommunicationStatus::Established {
            return Err(DishManagerError::CommunicationDisabled {
                device: self.name.to_string(),
            });
        }
        Ok(())
    }

    pub async fn get_handle(&self) -> DishManagerResult<Arc<dyn crate::device::DeviceHandle>> {
        self.proxy.get(&self.address).await
    }

    pub async fn write_attribute_value(
        &self,
        name: &str,
        value: serde_json::Value,
    ) -> DishManagerResult<()> {
        self.require_established()?;
        let handle = self.get_handle().await?;
        handle
            .write_attribute(name, value.clone())
            .await
            .map_err(|err| DishManagerError::RemoteFailure {
                device: self.name.to_string(),
                message: err.to_string(),
            })?;
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set(name, AttributeValue::valid(value, Utc::now()));
        self.fire_callback();
        Ok(())
    }

    /// Shared `execute_command` dispatch: rejects if not established,
    /// otherwise invokes the remote command and translates its synchronous
    /// `(ResultCode, message)` per spec §4.3.
    pub async fn execute_command(
        &self,
        name: &str,
        arg: serde_json::Value,
    ) -> (TaskStatus, String) {
        if self.communication_state() != CommunicationStatus::Established {
            return (
                TaskStatus::Rejected,
                format!("{} communication is not established", self.name),
            );
        }
        let handle = match self.get_handle().await {
            Ok(handle) => handle,
            Err(err) => return (TaskStatus::Failed, err.to_string()),
        };
        match handle.invoke_command(name, arg).await {
            Ok((code, message)) => {
                let status = if code == dish_manager_types::ResultCode::Failed {
                    TaskStatus::Failed
                } else {
                    TaskStatus::InProgress
                };
                (status, message)
            }
            Err(err) => (TaskStatus::Failed, err.to_string()),
        }
    }
}

impl std::fmt::Debug for ChildCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildCore")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("communication_state", &self.communication_state())
            .finish()
    }
}
