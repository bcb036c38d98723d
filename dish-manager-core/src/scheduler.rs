//! Command Scheduler (C5, spec §4.5): a min-heap of periodic callables
//! (SPFRX `MonitorPing`, WMS polling, ...) driven by a single worker task.
//!
//! Reschedule happens from the *completion* time of the previous run, not
//! its originally scheduled time (spec §9 "Scheduler fairness") — an
//! overrunning callable pushes its own next run back rather than firing a
//! burst of catch-up executions.

use futures::future::BoxFuture;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Callable = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

struct Job {
    period: Duration,
    callable: Callable,
}

/// Thread-safe periodic-job scheduler with a single worker.
pub struct CommandScheduler {
    jobs: Mutex<HashMap<String, Job>>,
    heap: Mutex<BinaryHeap<Reverse<(Instant, String)>>>,
    notify: Arc<Notify>,
    stopped: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CommandScheduler {
    /// Build the scheduler and start its worker task.
    pub fn start() -> Arc<Self> {
        let this = Arc::new(Self {
            jobs: Mutex::new(HashMap::new()),
            heap: Mutex::new(BinaryHeap::new()),
            notify: Arc::new(Notify::new()),
            stopped: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        });
        let worker_handle = tokio::spawn(this.clone().run());
        *this.worker.lock().expect("scheduler lock poisoned") = Some(worker_handle);
        this
    }

    /// Register a periodic callable; the first run fires after one period.
    pub fn submit(
        &self,
        name: impl Into<String>,
        period: Duration,
        callable: impl Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
    ) {
        let name = name.into();
        let next_run = Instant::now() + period;
        self.jobs
            .lock()
            .expect("scheduler lock poisoned")
            .insert(name.clone(), Job { period, callable: Arc::new(callable) });
        self.heap
            .lock()
            .expect("scheduler lock poisoned")
            .push(Reverse((next_run, name)));
        self.notify.notify_waiters();
    }

    /// Remove a job; a pending heap entry for it becomes a no-op when popped.
    pub fn remove(&self, name: &str) {
        self.jobs.lock().expect("scheduler lock poisoned").remove(name);
    }

    /// Change a job's period; takes effect from its next scheduled run.
    pub fn update_period(&self, name: &str, period: Duration) {
        if let Some(job) = self.jobs.lock().expect("scheduler lock poisoned").get_mut(name) {
            job.period = period;
        }
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    async fn run(self: Arc<Self>) {
        loop {
            if self.stopped.load(Ordering::Acquire) {
                return;
            }

            let next = self.heap.lock().expect("scheduler lock poisoned").peek().map(|Reverse((t, _))| *t);

            match next {
                None => {
                    self.notify.notified().await;
                    continue;
                }
                Some(next_run) => {
                    let now = Instant::now();
                    if next_run > now {
                        tokio::select! {
                            _ = tokio::time::sleep(next_run - now) => {}
                            _ = self.notify.notified() => continue,
                        }
                    }
                }
            }

            if self.stopped.load(Ordering::Acquire) {
                return;
            }

            let popped = self.heap.lock().expect("scheduler lock poisoned").pop();
            let Some(Reverse((_, name))) = popped else { continue };

            let job_callable = self
                .jobs
                .lock()
                .expect("scheduler lock poisoned")
                .get(&name)
                .map(|job| job.callable.clone());

            let Some(callable) = job_callable else {
                debug!(job = %name, "skipping execution of a removed job");
                continue;
            };

            debug!(job = %name, "executing scheduled job");
            callable().await;

            let still_present = self.jobs.lock().expect("scheduler lock poisoned").get(&name).map(|job| job.period);
            match still_present {
                Some(period) => {
                    let next_run = Instant::now() + period;
                    self.heap.lock().expect("scheduler lock poisoned").push(Reverse((next_run, name)));
                }
                None => warn!(job = %name, "job removed mid-execution, not rescheduling"),
            }
        }
    }
}

impl std::fmt::Debug for CommandScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandScheduler")
            .field("job_count", &self.jobs.lock().expect("scheduler lock poisoned").len())
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish()
    }
}
