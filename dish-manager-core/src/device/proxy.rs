//! Device Proxy Manager (C1, spec §4.1): one cached handle per remote
//! device address, retried with bounded back-off and cancellation-aware.

use super::{DeviceHandle, DeviceTransport, TransportError};
use dish_manager_types::{DeviceProxyConfig, DishManagerError, DishManagerResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::warn;

/// Caches one [`DeviceHandle`] per address and drives the connect/retry
/// state machine described in spec §4.1.
pub struct DeviceProxyManager {
    transport: Arc<dyn DeviceTransport>,
    handles: Mutex<HashMap<String, Arc<dyn DeviceHandle>>>,
    cancelled: AtomicBool,
    cancel_notify: Notify,
    config: DeviceProxyConfig,
}

impl DeviceProxyManager {
    pub fn new(transport: Arc<dyn DeviceTransport>, config: DeviceProxyConfig) -> Self {
        Self {
            transport,
            handles: Mutex::new(HashMap::new()),
            cancelled: AtomicBool::new(false),
            cancel_notify: Notify::new(),
            config,
        }
    }

    /// Return the cached handle for `address`, connecting (with retry) on a
    /// cache miss. `Ok(None)`-equivalent behaviour is represented as an
    /// error: cancellation surfaces `ConnectionInterrupted`, retry exhaustion
    /// surfaces `ConnectionFailed`.
    pub async fn get(&self, address: &str) -> DishManagerResult<Arc<dyn DeviceHandle>> {
        if let Some(handle) = self.handles.lock().expect("proxy lock poisoned").get(address) {
            return Ok(handle.clone());
        }
        let handle = self.connect_with_retry(address).await?;
        self.handles
            .lock()
            .expect("proxy lock poisoned")
            .insert(address.to_string(), handle.clone());
        Ok(handle)
    }

    /// Block until the device becomes reachable, or give up per the same
    /// retry budget as [`Self::get`].
    pub async fn wait_for_device(&self, address: &str) -> DishManagerResult<Arc<dyn DeviceHandle>> {
        self.get(address).await
    }

    /// Drop every cached handle and clear the cancellation flag, so a
    /// subsequent `get` attempts fresh connections.
    pub fn reset(&self) {
        self.handles.lock().expect("proxy lock poisoned").clear();
        self.cancelled.store(false, Ordering::Release);
    }

    /// Short-circuit any in-flight or future retry loop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.cancel_notify.notify_waiters();
    }

    /// Drop a single cached handle, forcing the next `get` to reconnect.
    /// Used by the device monitor (C2) when a subscription reports a
    /// transport error on an otherwise-cached handle.
    pub fn evict(&self, address: &str) {
        self.handles.lock().expect("proxy lock poisoned").remove(address);
    }

    async fn connect_with_retry(&self, address: &str) -> DishManagerResult<Arc<dyn DeviceHandle>> {
        let mut backoff_secs = self.config.initial_backoff_secs;
        for attempt in 0..=self.config.max_retries {
            if self.cancelled.load(Ordering::Acquire) {
                return Err(DishManagerError::ConnectionInterrupted);
            }
            match self.transport.connect(address).await {
                Ok(handle) => {
                    if let Err(err) = handle.ping().await {
                        warn!(address, error = %err, "post-connect ping failed");
                        return Err(DishManagerError::ConnectionFailed);
                    }
                    return Ok(handle);
                }
                Err(err) => {
                    warn!(address, attempt, error = %err, "connect attempt failed");
                    if attempt == self.config.max_retries {
                        return Err(DishManagerError::ConnectionFailed);
                    }
                    tokio::select! {
                        _ = tokio::time::sleep(std::time::Duration::from_secs_f64(backoff_secs)) => {}
                        _ = self.cancel_notify.notified() => {
                            return Err(DishManagerError::ConnectionInterrupted);
                        }
                    }
                    backoff_secs = (backoff_secs * self.config.backoff_factor).round();
                }
            }
        }
        Err(DishManagerError::ConnectionFailed)
    }
}

impl std::fmt::Debug for DeviceProxyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceProxyManager")
            .field("cancelled", &self.cancelled.load(Ordering::Relaxed))
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockHandle, MockTransport};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct FlakyTransport {
        attempts: AtomicUsize,
        succeed_after: usize,
    }

    #[async_trait]
    impl DeviceTransport for FlakyTransport {
        async fn connect(&self, address: &str) -> Result<Arc<dyn DeviceHandle>, TransportError> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.succeed_after {
                return Err(TransportError::ConnectFailed {
                    address: address.to_string(),
                });
            }
            Ok(Arc::new(MockHandle::new(address)))
        }
    }

    #[tokio::test]
    async fn get_caches_handle_by_address() {
        let manager = DeviceProxyManager::new(
            Arc::new(MockTransport::default()),
            DeviceProxyConfig {
                initial_backoff_secs: 0.0,
                ..Default::default()
            },
        );
        let a = manager.get("ds").await.unwrap();
        let b = manager.get("ds").await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn retries_until_success_within_budget() {
        let transport = Arc::new(FlakyTransport {
            attempts: AtomicUsize::new(0),
            succeed_after: 2,
        });
        let manager = DeviceProxyManager::new(
            transport,
            DeviceProxyConfig {
                initial_backoff_secs: 0.0,
                backoff_factor: 1.0,
                max_retries: 5,
                ..Default::default()
            },
        );
        assert!(manager.get("ds").await.is_ok());
    }

    #[tokio::test]
    async fn gives_up_after_retry_budget_exhausted() {
        let transport = Arc::new(FlakyTransport {
            attempts: AtomicUsize::new(0),
            succeed_after: 100,
        });
        let manager = DeviceProxyManager::new(
            transport,
            DeviceProxyConfig {
                initial_backoff_secs: 0.0,
                backoff_factor: 1.0,
                max_retries: 2,
                ..Default::default()
            },
        );
        assert_eq!(
            manager.get("ds").await.unwrap_err(),
            DishManagerError::ConnectionFailed
        );
    }

    #[tokio::test]
    async fn cancel_short_circuits_a_future_get() {
        let manager = DeviceProxyManager::new(
            Arc::new(MockTransport::default()),
            DeviceProxyConfig::default(),
        );
        manager.cancel();
        assert_eq!(
            manager.get("ds").await.unwrap_err(),
            DishManagerError::ConnectionInterrupted
        );
    }

    #[tokio::test]
    async fn reset_clears_cache_and_cancellation() {
        let manager = DeviceProxyManager::new(
            Arc::new(MockTransport::default()),
            DeviceProxyConfig::default(),
        );
        let a = manager.get("ds").await.unwrap();
        manager.cancel();
        manager.reset();
        let b = manager.get("ds").await.unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
