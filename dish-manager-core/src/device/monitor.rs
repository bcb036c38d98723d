//! Device Monitor (C2, spec §4.2): subscribes to a named set of remote
//! attributes and pushes change events into a bounded, oldest-drops sink.

use super::{AttributeEvent, DeviceProxyManager};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A bounded event queue where, on overflow, the *oldest* event is dropped
/// (spec §4.2 "Backpressure"). Readers that need a consistent view must
/// re-read from the proxy rather than rely on replaying every drop.
#[derive(Debug)]
pub struct EventSink {
    buffer: Mutex<VecDeque<AttributeEvent>>,
    notify: Notify,
    capacity: usize,
    dropped: AtomicU64,
}

impl EventSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
            notify: Notify::new(),
            capacity: capacity.max(1),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn push(&self, event: AttributeEvent) {
        let mut buffer = self.buffer.lock().expect("event sink lock poisoned");
        if buffer.len() >= self.capacity {
            buffer.pop_front();
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        buffer.push_back(event);
        drop(buffer);
        self.notify.notify_one();
    }

    /// Await the next event, blocking until one is pushed.
    pub async fn recv(&self) -> AttributeEvent {
        loop {
            if let Some(event) = self.buffer.lock().expect("event sink lock poisoned").pop_front() {
                return event;
            }
            self.notify.notified().await;
        }
    }

    pub fn try_recv(&self) -> Option<AttributeEvent> {
        self.buffer.lock().expect("event sink lock poisoned").pop_front()
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle to a running monitor loop; dropping it does not stop the loop —
/// call [`MonitorHandle::stop`] for a clean teardown (spec §5 "Leakage
/// guards").
pub struct MonitorHandle {
    task: JoinHandle<()>,
    shutdown: Arc<Notify>,
}

impl MonitorHandle {
    pub async fn stop(self) {
        self.shutdown.notify_waiters();
        let _ = self.task.await;
    }
}

/// Subscribes to a fixed attribute set on one device and republishes
/// updates into an [`EventSink`], transparently resubscribing whenever the
/// transport reports an error (spec §4.2 "Algorithm").
#[derive(Debug)]
pub struct DeviceMonitor {
    proxy: Arc<DeviceProxyManager>,
    run_count: AtomicU64,
}

impl DeviceMonitor {
    pub fn new(proxy: Arc<DeviceProxyManager>) -> Self {
        Self {
            proxy,
            run_count: AtomicU64::new(0),
        }
    }

    /// Number of (re)subscribe cycles since this monitor was created;
    /// observability only (spec §4.2).
    pub fn run_count(&self) -> u64 {
        self.run_count.load(Ordering::Relaxed)
    }

    /// Start the monitor loop in the background, returning the sink it
    /// publishes into and a handle to stop it.
    pub fn spawn(
        self: Arc<Self>,
        address: String,
        attributes: Vec<String>,
        sink_capacity: usize,
    ) -> (Arc<EventSink>, MonitorHandle) {
        let sink = Arc::new(EventSink::new(sink_capacity));
        let shutdown = Arc::new(Notify::new());

        let task_sink = sink.clone();
        let task_shutdown = shutdown.clone();
        let monitor = self;
        let task = tokio::spawn(async move {
            monitor.run(address, attributes, task_sink, task_shutdown).await;
        });

        (sink, MonitorHandle { task, shutdown })
    }

    async fn run(
        &self,
        address: String,
        attributes: Vec<String>,
        sink: Arc<EventSink>,
        shutdown: Arc<Notify>,
    ) {
        loop {
            self.run_count.fetch_add(1, Ordering::Relaxed);

            let handle = tokio::select! {
                result = self.proxy.get(&address) => match result {
                    Ok(handle) => handle,
                    Err(err) => {
                        warn!(address = %address, error = %err, "monitor could not obtain a device handle, retrying");
                        continue;
                    }
                },
                _ = shutdown.notified() => return,
            };

            let (sub_tx, mut sub_rx) = tokio::sync::mpsc::channel(attributes.len().max(1) * 4);
            if let Err(err) = handle.subscribe(attributes.clone(), sub_tx).await {
                warn!(address = %address, error = %err, "subscribe failed, will reconnect");
                self.proxy.evict(&address);
                continue;
            }

            loop {
                tokio::select! {
                    maybe_event = sub_rx.recv() => match maybe_event {
                        Some(event) if event.error => {
                            debug!(address = %address, attribute = %event.name, "transport reported an error event, resubscribing");
                            sink.push(event);
                            self.proxy.evict(&address);
                            break;
                        }
                        Some(event) => sink.push(event),
                        None => {
                            self.proxy.evict(&address);
                            break;
                        }
                    },
                    _ = shutdown.notified() => return,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use dish_manager_types::Quality;

    #[test]
    fn sink_drops_oldest_on_overflow() {
        let sink = EventSink::new(2);
        for i in 0..3 {
            sink.push(AttributeEvent {
                name: "x".into(),
                value: serde_json::json!(i),
                quality: Quality::Valid,
                error: false,
            });
        }
        assert_eq!(sink.dropped_count(), 1);
        assert_eq!(sink.try_recv().unwrap().value, serde_json::json!(1));
        assert_eq!(sink.try_recv().unwrap().value, serde_json::json!(2));
        assert!(sink.try_recv().is_none());
    }

    #[tokio::test]
    async fn monitor_delivers_the_subscribe_time_snapshot() {
        let transport = Arc::new(MockTransport::default());
        transport.seed("ds", "operatingmode", serde_json::json!("STANDBY_LP"));
        let proxy = Arc::new(DeviceProxyManager::new(
            transport,
            dish_manager_types::DeviceProxyConfig::default(),
        ));
        let monitor = Arc::new(DeviceMonitor::new(proxy));
        let (sink, handle) = monitor.spawn(
            "ds".to_string(),
            vec!["operatingmode".to_string()],
            16,
        );
        let event = sink.recv().await;
        assert_eq!(event.name, "operatingmode");
        assert_eq!(event.value, serde_json::json!("STANDBY_LP"));
        handle.stop().await;
    }

    #[tokio::test]
    async fn run_count_increases_across_resubscribes() {
        let transport = Arc::new(MockTransport::default());
        let proxy = Arc::new(DeviceProxyManager::new(
            transport,
            dish_manager_types::DeviceProxyConfig::default(),
        ));
        let monitor = Arc::new(DeviceMonitor::new(proxy));
        assert_eq!(monitor.run_count(), 0);
        let (_sink, handle) = monitor.clone().spawn("ds".to_string(), vec!["operatingmode".to_string()], 16);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(monitor.run_count() >= 1);
        handle.stop().await;
    }
}
