//! The abstract RPC/monitoring adapter to subservient devices (spec §1:
//! "modelled as an abstract RPC/monitoring adapter" — the concrete wire
//! transport is deliberately out of scope here).
//!
//! `DeviceTransport` and `DeviceHandle` are the seam every sub-component
//! manager (C3) reaches through via C1/C2; [`crate::testing::MockTransport`]
//! is the in-memory stand-in used by tests and by integrators wiring this
//! crate up before a real transport exists.

pub mod monitor;
pub mod proxy;

use async_trait::async_trait;
use dish_manager_types::{Quality, ResultCode};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

pub use monitor::DeviceMonitor;
pub use proxy::DeviceProxyManager;

/// Failure reported by the transport layer. Distinct from
/// [`dish_manager_types::DishManagerError`] because it is the transport's
/// own vocabulary; C1 translates it into the dish-manager error taxonomy.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("could not establish a connection to {address}")]
    ConnectFailed { address: String },
    #[error("remote command failed: {0}")]
    CommandFailed(String),
    #[error("connection to the device was lost")]
    Disconnected,
}

/// One inbound attribute event, as pushed by a subscription (spec §4.2).
#[derive(Debug, Clone)]
pub struct AttributeEvent {
    pub name: String,
    pub value: serde_json::Value,
    pub quality: Quality,
    pub error: bool,
}

/// A connection to one remote device, obtained through [`DeviceTransport::connect`].
#[async_trait]
pub trait DeviceHandle: Send + Sync {
    /// Verify liveness of an already-established connection.
    async fn ping(&self) -> Result<(), TransportError>;

    /// Invoke a named remote command, returning the synchronous
    /// `(ResultCode, message)` the remote reports at submission time.
    async fn invoke_command(
        &self,
        name: &str,
        arg: serde_json::Value,
    ) -> Result<(ResultCode, String), TransportError>;

    /// Write a remote attribute value.
    async fn write_attribute(
        &self,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), TransportError>;

    /// Subscribe to a batch of named attributes; events (including the
    /// subscribe-time snapshot of each) are pushed into `sink`.
    async fn subscribe(
        &self,
        attributes: Vec<String>,
        sink: mpsc::Sender<AttributeEvent>,
    ) -> Result<(), TransportError>;
}

/// Factory for [`DeviceHandle`]s, keyed by device address.
#[async_trait]
pub trait DeviceTransport: Send + Sync {
    async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceHandle>, TransportError>;
}
