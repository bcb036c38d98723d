//! In-memory stand-in for the abstract RPC/monitoring adapter (spec §1),
//! used by this crate's own tests and available to integrators under the
//! `test-utils` feature before a real transport is wired up.

#![cfg(any(test, feature = "test-utils"))]

use crate::device::{AttributeEvent, DeviceHandle, DeviceTransport, TransportError};
use async_trait::async_trait;
use dish_manager_types::{Quality, ResultCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Default)]
struct DeviceState {
    values: HashMap<String, serde_json::Value>,
    subscribers: Vec<(Vec<String>, mpsc::Sender<AttributeEvent>)>,
    command_responses: HashMap<String, (ResultCode, String)>,
    remaining_connect_failures: usize,
}

/// A fully in-memory [`DeviceTransport`]: every device address is backed by
/// a value map and a subscriber list, mutated directly by tests via
/// [`MockTransport::seed`] / [`MockTransport::push`] / [`MockTransport::push_error`].
#[derive(Default, Clone)]
pub struct MockTransport {
    devices: Arc<Mutex<HashMap<String, DeviceState>>>,
}

impl MockTransport {
    fn with_device<R>(&self, address: &str, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        let mut devices = self.devices.lock().expect("mock transport lock poisoned");
        f(devices.entry(address.to_string()).or_default())
    }

    /// Pre-populate an attribute's value before any subscriber connects.
    pub fn seed(&self, address: &str, attribute: &str, value: serde_json::Value) {
        self.with_device(address, |state| {
            state.values.insert(attribute.to_string(), value);
        });
    }

    /// Push a new value to every current subscriber of `attribute`.
    pub fn push(&self, address: &str, attribute: &str, value: serde_json::Value) {
        self.with_device(address, |state| {
            state.values.insert(attribute.to_string(), value.clone());
            state.subscribers.retain(|(attrs, tx)| {
                if attrs.iter().any(|a| a == attribute) {
                    let _ = tx.try_send(AttributeEvent {
                        name: attribute.to_string(),
                        value: value.clone(),
                        quality: Quality::Valid,
                        error: false,
                    });
                }
                !tx.is_closed()
            });
        });
    }

    /// Simulate a transport-error event on `attribute`, triggering the
    /// monitor's resubscribe path.
    pub fn push_error(&self, address: &str, attribute: &str) {
        self.with_device(address, |state| {
            state.subscribers.retain(|(attrs, tx)| {
                if attrs.iter().any(|a| a == attribute) {
                    let _ = tx.try_send(AttributeEvent {
                        name: attribute.to_string(),
                        value: serde_json::Value::Null,
                        quality: Quality::Invalid,
                        error: true,
                    });
                }
                !tx.is_closed()
            });
        });
    }

    /// Make the next `n` connection attempts to `address` fail.
    pub fn fail_next_connects(&self, address: &str, n: usize) {
        self.with_device(address, |state| state.remaining_connect_failures = n);
    }

    /// Override the synchronous `(ResultCode, message)` a command returns.
    pub fn set_command_response(
        &self,
        address: &str,
        command: &str,
        response: (ResultCode, impl Into<String>),
    ) {
        self.with_device(address, |state| {
            state
                .command_responses
                .insert(command.to_string(), (response.0, response.1.into()));
        });
    }
}

#[async_trait]
impl DeviceTransport for MockTransport {
    async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceHandle>, TransportError> {
        let should_fail = self.with_device(address, |state| {
            if state.remaining_connect_failures > 0 {
                state.remaining_connect_failures -= 1;
                true
            } else {
                false
            }
        });
        if should_fail {
            return Err(TransportError::ConnectFailed {
                address: address.to_string(),
            });
        }
        Ok(Arc::new(MockHandle {
            address: address.to_string(),
            devices: self.devices.clone(),
        }))
    }
}

/// A connected handle into [`MockTransport`]'s shared state.
pub struct MockHandle {
    address: String,
    devices: Arc<Mutex<HashMap<String, DeviceState>>>,
}

impl MockHandle {
    /// A standalone handle not backed by a shared [`MockTransport`], for
    /// tests that only need a connect-succeeds stub.
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            devices: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn with_device<R>(&self, f: impl FnOnce(&mut DeviceState) -> R) -> R {
        let mut devices = self.devices.lock().expect("mock transport lock poisoned");
        f(devices.entry(self.address.clone()).or_default())
    }
}

#[async_trait]
impl DeviceHandle for MockHandle {
    async fn ping(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn invoke_command(
        &self,
        name: &str,
        _arg: serde_json::Value,
    ) -> Result<(ResultCode, String), TransportError> {
        Ok(self.with_device(|state| {
            state
                .command_responses
                .get(name)
                .cloned()
                .unwrap_or((ResultCode::Started, format!("{name} accepted")))
        }))
    }

    async fn write_attribute(
        &self,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), TransportError> {
        self.with_device(|state| {
            state.values.insert(name.to_string(), value.clone());
            state.subscribers.retain(|(attrs, tx)| {
                if attrs.iter().any(|a| a == name) {
                    let _ = tx.try_send(AttributeEvent {
                        name: name.to_string(),
                        value: value.clone(),
                        quality: Quality::Valid,
                        error: false,
                    });
                }
                !tx.is_closed()
            });
        });
        Ok(())
    }

    async fn subscribe(
        &self,
        attributes: Vec<String>,
        sink: mpsc::Sender<AttributeEvent>,
    ) -> Result<(), TransportError> {
        self.with_device(|state| {
            for attribute in &attributes {
                let value = state
                    .values
                    .get(attribute)
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                let quality = if value.is_null() {
                    Quality::Invalid
                } else {
                    Quality::Valid
                };
                let _ = sink.try_send(AttributeEvent {
                    name: attribute.clone(),
                    value,
                    quality,
                    error: false,
                });
            }
            state.subscribers.push((attributes, sink));
        });
        Ok(())
    }
}

/// Monotonic counter a test can share to assert retry attempts were made,
/// independent of `MockTransport`'s own per-address failure budget.
#[derive(Debug, Default)]
pub struct CallCounter(AtomicUsize);

impl CallCounter {
    pub fn record(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
