//! Abort Sequencer (C9, spec §4.9): a single in-flight abort that chains
//! `TrackStop` → (conditionally) `SetStandbyFPMode` → `EndScan` →
//! `ResetTrackTable` with no gap between the slow `SetStandbyFPMode` LRC and
//! the two fast steps that follow it (SPEC_FULL §2 "Abort step ordering").

use crate::command_map::{engine::FanoutEngine, plans};
use crate::components::SubComponentManager;
use crate::lrc_tracker::LrcTracker;
use crate::tai::current_tai_timestamp;
use chrono::Utc;
use dish_manager_types::{
    AttributeValue, ComponentState, DishMode, LrcResult, TaskStatus,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Five identical rows `(timestamp+5s, az=0, el=50)`, flattened the same way
/// `programTrackTable` is (spec §6 "flattened `[t,az,el,...]`").
pub(crate) fn reset_table_rows() -> Vec<f64> {
    let base = current_tai_timestamp() + 5.0;
    let mut rows = Vec::with_capacity(15);
    for _ in 0..5 {
        rows.extend_from_slice(&[base, 0.0, 50.0]);
    }
    rows
}

/// Coordinates the single-instance abort sequence and the shared cancel
/// signal that every other in-flight fan-out watches.
pub struct AbortSequencer {
    engine: Arc<FanoutEngine>,
    lrc: Arc<LrcTracker>,
    ds: Arc<dyn SubComponentManager>,
    state: Arc<Mutex<ComponentState>>,
    /// Set by this sequencer (and cleared once it finishes) to cancel every
    /// other in-flight high-level command; also set permanently by
    /// `stop_communicating` teardown.
    shared_abort: Arc<AtomicBool>,
    shared_abort_notify: Arc<Notify>,
    /// Set only by `stop_communicating`; this sequencer's own steps watch it
    /// so a shutdown mid-abort still short-circuits (spec §4.9 "checks the
    /// shared abort event before running").
    shutdown: Arc<AtomicBool>,
    in_progress: AtomicBool,
    timeout: Duration,
}

impl AbortSequencer {
    pub fn new(
        engine: Arc<FanoutEngine>,
        lrc: Arc<LrcTracker>,
        ds: Arc<dyn SubComponentManager>,
        state: Arc<Mutex<ComponentState>>,
        shared_abort: Arc<AtomicBool>,
        shared_abort_notify: Arc<Notify>,
        shutdown: Arc<AtomicBool>,
        timeout: Duration,
    ) -> Self {
        Self {
            engine,
            lrc,
            ds,
            state,
            shared_abort,
            shared_abort_notify,
            shutdown,
            in_progress: AtomicBool::new(false),
            timeout,
        }
    }

    fn dish_mode(&self) -> DishMode {
        match self
            .state
            .lock()
            .expect("component state lock poisoned")
            .get("dishmode")
            .and_then(|v| v.as_str())
        {
            Some("STANDBY_LP") => DishMode::StandbyLp,
            Some("STANDBY_FP") => DishMode::StandbyFp,
            Some("STOW") => DishMode::Stow,
            Some("MAINTENANCE") => DishMode::Maintenance,
            Some("CONFIG") => DishMode::Config,
            Some("OPERATE") => DishMode::Operate,
            Some("STARTUP") => DishMode::Startup,
            _ => DishMode::Unknown,
        }
    }

    fn snapshot(&self) -> ComponentState {
        self.state.lock().expect("component state lock poisoned").clone()
    }

    /// Run the full sequence. Rejects immediately (without allocating an LRC
    /// record) if one is already in flight.
    pub async fn run(&self, ignored: &HashSet<&'static str>) -> (TaskStatus, String) {
        if self.in_progress.swap(true, Ordering::AcqRel) {
            return (TaskStatus::Rejected, "Existing Abort sequence ongoing".to_string());
        }

        let id = self.lrc.new_command("Abort");
        self.lrc.set_status(&id, TaskStatus::InProgress);
        self.shared_abort.store(true, Ordering::Release);
        self.shared_abort_notify.notify_waiters();

        let result = self.run_steps(&id, ignored).await;

        self.shared_abort.store(false, Ordering::Release);
        self.in_progress.store(false, Ordering::Release);

        match result {
            Ok(message) => {
                self.lrc.complete(&id, TaskStatus::Completed, LrcResult::ok(message.clone()));
                (TaskStatus::Completed, message)
            }
            Err(message) => {
                self.lrc.complete(&id, TaskStatus::Failed, LrcResult::failed(message.clone()));
                (TaskStatus::Failed, message)
            }
        }
    }

    async fn run_steps(&self, id: &str, ignored: &HashSet<&'static str>) -> Result<String, String> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err("Abort sequence failed: component manager is stopping".to_string());
        }

        if self.dish_mode() != DishMode::Stow {
            let outcome = self.run_step(id, plans::track_stop(), ignored).await;
            if !matches!(outcome.status, TaskStatus::Completed) {
                return Err(format!("Abort sequence failed during TrackStop: {}", outcome.message));
            }
        }

        if self.shutdown.load(Ordering::Acquire) {
            return Err("Abort sequence failed: component manager is stopping".to_string());
        }

        if self.dish_mode() != DishMode::StandbyFp {
            let outcome = self.run_step(id, plans::set_standby_fp_mode(), ignored).await;
            if !matches!(outcome.status, TaskStatus::Completed) {
                return Err(format!("Abort sequence failed during SetStandbyFPMode: {}", outcome.message));
            }
        }

        if self.shutdown.load(Ordering::Acquire) {
            return Err("Abort sequence failed: component manager is stopping".to_string());
        }
        self.lrc.push_progress(id, "EndScan");
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("scanid", AttributeValue::valid("", Utc::now()));

        if self.shutdown.load(Ordering::Acquire) {
            return Err("Abort sequence failed: component manager is stopping".to_string());
        }
        self.lrc.push_progress(id, "ResetTrackTable");
        if let Err(err) = self
            .ds
            .write_attribute_value("programtracktable", serde_json::json!(reset_table_rows()))
            .await
        {
            return Err(format!("Abort sequence failed during ResetTrackTable: {err}"));
        }

        Ok("Abort sequence completed".to_string())
    }

    async fn run_step(
        &self,
        id: &str,
        plan: crate::command_map::Plan,
        ignored: &HashSet<&'static str>,
    ) -> crate::command_map::FanoutOutcome {
        self.engine
            .run(
                id,
                &self.lrc,
                plan,
                ignored,
                Arc::new(Notify::new()),
                || self.snapshot(),
                self.shutdown.clone(),
                Arc::new(Notify::new()),
                self.timeout,
            )
            .await
    }
}
