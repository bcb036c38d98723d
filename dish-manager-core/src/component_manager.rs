//! Dish Manager Component Manager (C10, spec §4.10): binds every other
//! component, owns the rolled-up dish-level `ComponentState`, and exposes
//! the command handlers named in spec §6.

use crate::abort::AbortSequencer;
use crate::aggregation::{
    compute_capability_states, compute_dish_mode, compute_error_status, compute_health_state,
    compute_power_state, AggregationInput,
};
use crate::command_map::{engine::FanoutEngine, plans, FanoutOutcome};
use crate::components::SubComponentManager;
use crate::lrc_tracker::LrcTracker;
use crate::scheduler::CommandScheduler;
use crate::tai::current_tai_timestamp;
use crate::watchdog::WatchdogTimer;
use chrono::Utc;
use dish_manager_types::{
    AttributeValue, Band, CapabilityState, CommunicationStatus, ComponentState, DishMode,
    DishManagerConfig, DishManagerError, DishManagerResult, DsPowerState, HealthState, LrcResult,
    PersistedFlags, ResultCode, TaskStatus,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tracing::{info, warn};

const CHILD_NAMES: [&str; 5] = ["DS", "SPF", "SPFRX", "B5DC", "WMS"];

fn power_state_label(state: DsPowerState) -> &'static str {
    match state {
        DsPowerState::Off => "OFF",
        DsPowerState::Ups => "UPS",
        DsPowerState::FullPower => "FULL_POWER",
        DsPowerState::LowPower => "LOW_POWER",
        DsPowerState::Unknown => "UNKNOWN",
    }
}

fn health_state_label(state: HealthState) -> &'static str {
    match state {
        HealthState::Ok => "OK",
        HealthState::Degraded => "DEGRADED",
        HealthState::Failed => "FAILED",
        HealthState::Unknown => "UNKNOWN",
    }
}

fn capability_state_label(state: CapabilityState) -> &'static str {
    match state {
        CapabilityState::Unavailable => "UNAVAILABLE",
        CapabilityState::Standby => "STANDBY",
        CapabilityState::Configuring => "CONFIGURING",
        CapabilityState::OperateDegraded => "OPERATE_DEGRADED",
        CapabilityState::OperateFull => "OPERATE_FULL",
        CapabilityState::Unknown => "UNKNOWN",
    }
}

fn communication_status_label(status: CommunicationStatus) -> &'static str {
    match status {
        CommunicationStatus::Disabled => "DISABLED",
        CommunicationStatus::NotEstablished => "NOT_ESTABLISHED",
        CommunicationStatus::Established => "ESTABLISHED",
    }
}

/// The dish-level rolled-up attribute surface (spec §6, trimmed to the
/// subset this core computes or mirrors itself).
fn rolled_up_schema() -> Vec<&'static str> {
    vec![
        "dishmode",
        "powerstate",
        "healthstate",
        "pointingstate",
        "configuredband",
        "scanid",
        "kvalue",
        "dscerrorstatuses",
        "tmcheartbeatinterval",
        "tmclastheartbeat",
        "dsconnectionstate",
        "spfconnectionstate",
        "spfrxconnectionstate",
        "b5dcconnectionstate",
        "wmsconnectionstate",
        "ignorespf",
        "ignorespfrx",
        "ignoreb5dc",
        "achievedpointingaz",
        "achievedpointingel",
        "desiredpointingaz",
        "desiredpointingel",
        "achievedtargetlock",
        "actstaticoffsetvaluexel",
        "actstaticoffsetvalueel",
        "dscpowerlimitkw",
        "windgust",
        "meanwindspeed",
        "lastcommandinvoked",
        "lastcommandedmode",
        "b1capabilitystate",
        "b2capabilitystate",
        "b3capabilitystate",
        "b4capabilitystate",
        "b5acapabilitystate",
        "b5bcapabilitystate",
    ]
}

/// Bounded history of invoked commands, backing `lastCommandInvoked` (spec
/// §6), grounded on the original's `command_logger.py`.
struct CommandLogger {
    history: Mutex<VecDeque<(String, f64, serde_json::Value)>>,
    bound: usize,
}

impl CommandLogger {
    fn new(bound: usize) -> Self {
        Self { history: Mutex::new(VecDeque::with_capacity(bound)), bound }
    }

    fn record(&self, name: &str, arg: serde_json::Value) -> serde_json::Value {
        let tai = current_tai_timestamp();
        let mut history = self.history.lock().expect("command logger lock poisoned");
        if history.len() >= self.bound {
            history.pop_front();
        }
        history.push_back((name.to_string(), tai, arg.clone()));
        serde_json::json!({"command": name, "tai": tai, "args": arg})
    }
}

/// Binds C1–C9 into the supervisory control plane fronting one antenna.
pub struct DishManagerComponentManager {
    children: HashMap<&'static str, Arc<dyn SubComponentManager>>,
    state: Arc<Mutex<ComponentState>>,
    flags: Arc<dyn PersistedFlags>,
    lrc: Arc<LrcTracker>,
    scheduler: Arc<CommandScheduler>,
    watchdog: Arc<WatchdogTimer>,
    engine: Arc<FanoutEngine>,
    abort_sequencer: Arc<AbortSequencer>,
    state_notify: Arc<Notify>,
    command_abort_flag: Arc<AtomicBool>,
    command_abort_notify: Arc<Notify>,
    shutdown_flag: Arc<AtomicBool>,
    configuring: Arc<AtomicBool>,
    last_dish_mode: Mutex<DishMode>,
    command_logger: CommandLogger,
    heartbeat_tx: mpsc::Sender<()>,
    config: DishManagerConfig,
}

impl DishManagerComponentManager {
    pub fn new(
        ds: Arc<dyn SubComponentManager>,
        spf: Arc<dyn SubComponentManager>,
        spfrx: Arc<dyn SubComponentManager>,
        b5dc: Arc<dyn SubComponentManager>,
        wms: Arc<dyn SubComponentManager>,
        flags: Arc<dyn PersistedFlags>,
        config: DishManagerConfig,
    ) -> Arc<Self> {
        let mut children: HashMap<&'static str, Arc<dyn SubComponentManager>> = HashMap::new();
        children.insert("DS", ds.clone());
        children.insert("SPF", spf);
        children.insert("SPFRX", spfrx);
        children.insert("B5DC", b5dc);
        children.insert("WMS", wms);

        let state = Arc::new(Mutex::new(ComponentState::new_with_schema(&rolled_up_schema(), Utc::now())));
        let lrc = Arc::new(LrcTracker::new(config.lrc_tracker));
        let engine = Arc::new(FanoutEngine::new(children.clone()));
        let command_abort_flag = Arc::new(AtomicBool::new(false));
        let command_abort_notify = Arc::new(Notify::new());
        let shutdown_flag = Arc::new(AtomicBool::new(false));

        let abort_sequencer = Arc::new(AbortSequencer::new(
            engine.clone(),
            lrc.clone(),
            ds,
            state.clone(),
            command_abort_flag.clone(),
            command_abort_notify.clone(),
            shutdown_flag.clone(),
            config.device_proxy.command_timeout,
        ));

        let (heartbeat_tx, mut heartbeat_rx) = mpsc::channel::<()>(1);
        let watchdog = Arc::new(WatchdogTimer::new({
            let heartbeat_tx = heartbeat_tx.clone();
            move || {
                let heartbeat_tx = heartbeat_tx.clone();
                Box::pin(async move {
                    let _ = heartbeat_tx.send(()).await;
                })
            }
        }));

        let this = Arc::new(Self {
            children,
            state,
            flags,
            lrc,
            scheduler: CommandScheduler::start(),
            watchdog,
            engine,
            abort_sequencer,
            state_notify: Arc::new(Notify::new()),
            command_abort_flag,
            command_abort_notify,
            shutdown_flag,
            configuring: Arc::new(AtomicBool::new(false)),
            last_dish_mode: Mutex::new(DishMode::Unknown),
            command_logger: CommandLogger::new(config.lrc_tracker.history_bound),
            heartbeat_tx,
            config,
        });

        let timeout_handler = this.clone();
        tokio::spawn(async move {
            while heartbeat_rx.recv().await.is_some() {
                timeout_handler.handle_heartbeat_timeout().await;
            }
        });

        for child in CHILD_NAMES {
            let this = this.clone();
            this.children[child].set_state_change_callback(Arc::new(move |_name| {
                this.recompute_aggregation();
                this.state_notify.notify_waiters();
            }));
        }

        this
    }

    // ---- lifecycle -----------------------------------------------------

    pub async fn start_communicating(self: &Arc<Self>) {
        self.shutdown_flag.store(false, Ordering::Release);
        for name in CHILD_NAMES {
            self.children[name].start_communicating().await;
        }
        self.recompute_aggregation();
        let interval = self
            .state
            .lock()
            .expect("component state lock poisoned")
            .get("tmcheartbeatinterval")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        if interval > 0.0 {
            let _ = self.watchdog.enable(Duration::from_secs_f64(interval));
        }
    }

    pub async fn stop_communicating(self: &Arc<Self>) {
        self.shutdown_flag.store(true, Ordering::Release);
        self.command_abort_flag.store(true, Ordering::Release);
        self.command_abort_notify.notify_waiters();
        self.watchdog.disable();
        for name in CHILD_NAMES {
            self.children[name].stop_communicating().await;
        }
    }

    // ---- aggregation -----------------------------------------------------

    fn ignored_set(&self) -> HashSet<&'static str> {
        let mut set = HashSet::new();
        if self.flags.ignore_spf() {
            set.insert("SPF");
        }
        if self.flags.ignore_spfrx() {
            set.insert("SPFRX");
        }
        if self.flags.ignore_b5dc() {
            set.insert("B5DC");
        }
        set
    }

    fn communication_ok(&self) -> bool {
        let ignored = self.ignored_set();
        CHILD_NAMES
            .iter()
            .filter(|name| !ignored.contains(*name))
            .all(|name| self.children[*name].communication_state() == CommunicationStatus::Established)
    }

    fn recompute_aggregation(&self) {
        let ds = self.children["DS"].component_state();
        let spf = self.children["SPF"].component_state();
        let spfrx = self.children["SPFRX"].component_state();
        let b5dc = self.children["B5DC"].component_state();
        let wms = self.children["WMS"].component_state();

        let ignored = self.ignored_set();
        let input = AggregationInput {
            ds: &ds,
            spf: &spf,
            spfrx: &spfrx,
            b5dc: &b5dc,
            wms: &wms,
            ds_comm: self.children["DS"].communication_state(),
            spf_comm: self.children["SPF"].communication_state(),
            spfrx_comm: self.children["SPFRX"].communication_state(),
            b5dc_comm: self.children["B5DC"].communication_state(),
            wms_comm: self.children["WMS"].communication_state(),
            ignore_spf: ignored.contains("SPF"),
            ignore_spfrx: ignored.contains("SPFRX"),
            ignore_b5dc: ignored.contains("B5DC"),
        };

        let mut dish_mode = compute_dish_mode(&input);
        // Open Question (c): CONFIG is only surfaced while a ConfigureBand
        // fan-out is actually in flight (SPEC_FULL §3(c)).
        if dish_mode == DishMode::Config && !self.configuring.load(Ordering::Acquire) {
            dish_mode = *self.last_dish_mode.lock().expect("last dish mode lock poisoned");
        }
        *self.last_dish_mode.lock().expect("last dish mode lock poisoned") = dish_mode;

        let power_state = compute_power_state(&input);
        let health_state = compute_health_state(&input);
        let capability_states = compute_capability_states(&input, dish_mode);
        let error_status = compute_error_status(&input);

        let now = Utc::now();
        let mut state = self.state.lock().expect("component state lock poisoned");
        state.set("dishmode", AttributeValue::valid(dish_mode.to_string(), now));
        state.set("powerstate", AttributeValue::valid(power_state_label(power_state), now));
        state.set("healthstate", AttributeValue::valid(health_state_label(health_state), now));
        state.set("dscerrorstatuses", AttributeValue::valid(error_status, now));
        for (band, capability) in capability_states {
            if let Band::B1 | Band::B2 | Band::B3 | Band::B4 | Band::B5a | Band::B5b = band {
                let key = format!("{}capabilitystate", band.to_string().to_lowercase());
                state.set(&key, AttributeValue::valid(capability_state_label(capability), now));
            }
        }
        state.set(
            "configuredband",
            spfrx
                .get("configuredband")
                .cloned()
                .unwrap_or_else(|| AttributeValue::unknown(now)),
        );
        state.set(
            "pointingstate",
            ds.get("pointingstate").cloned().unwrap_or_else(|| AttributeValue::unknown(now)),
        );
        for key in [
            "achievedpointingaz",
            "achievedpointingel",
            "desiredpointingaz",
            "desiredpointingel",
            "achievedtargetlock",
            "actstaticoffsetvaluexel",
            "actstaticoffsetvalueel",
            "dscpowerlimitkw",
        ] {
            if let Some(value) = ds.get(key) {
                state.set(key, value.clone());
            }
        }
        for key in ["windgust", "meanwindspeed"] {
            if let Some(value) = wms.get(key) {
                state.set(key, value.clone());
            }
        }
        state.set(
            "dsconnectionstate",
            AttributeValue::valid(
                communication_status_label(self.children["DS"].communication_state()),
                now,
            ),
        );
        state.set(
            "spfconnectionstate",
            AttributeValue::valid(
                communication_status_label(self.children["SPF"].communication_state()),
                now,
            ),
        );
        state.set(
            "spfrxconnectionstate",
            AttributeValue::valid(
                communication_status_label(self.children["SPFRX"].communication_state()),
                now,
            ),
        );
        state.set(
            "b5dcconnectionstate",
            AttributeValue::valid(
                communication_status_label(self.children["B5DC"].communication_state()),
                now,
            ),
        );
        state.set(
            "wmsconnectionstate",
            AttributeValue::valid(
                communication_status_label(self.children["WMS"].communication_state()),
                now,
            ),
        );
    }

    fn snapshot(&self) -> ComponentState {
        self.state.lock().expect("component state lock poisoned").clone()
    }

    pub fn dish_mode(&self) -> DishMode {
        *self.last_dish_mode.lock().expect("last dish mode lock poisoned")
    }

    fn pointing_state(&self) -> String {
        self.state
            .lock()
            .expect("component state lock poisoned")
            .get("pointingstate")
            .and_then(|v| v.as_str())
            .unwrap_or("UNKNOWN")
            .to_string()
    }

    pub fn component_state(&self) -> ComponentState {
        self.snapshot()
    }

    // ---- generic fan-out submission ------------------------------------

    fn log_command(&self, name: &str, arg: serde_json::Value) {
        let entry = self.command_logger.record(name, arg);
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("lastcommandinvoked", AttributeValue::valid(entry, Utc::now()));
    }

    fn reject(&self, id: &str, message: impl Into<String>) -> (ResultCode, String) {
        let message = message.into();
        self.lrc.complete(id, TaskStatus::Rejected, LrcResult::failed(message));
        (ResultCode::Rejected, id.to_string())
    }

    async fn submit_plan(
        self: &Arc<Self>,
        command_name: &'static str,
        allowed_modes: &'static [DishMode],
        arg: serde_json::Value,
        plan: crate::command_map::Plan,
    ) -> (ResultCode, String) {
        self.log_command(command_name, arg);
        let id = self.lrc.new_command(command_name);

        if self.shutdown_flag.load(Ordering::Acquire) {
            return self.reject(&id, "Connection interrupted");
        }
        if !self.communication_ok() {
            return self.reject(&id, "Communication with one or more devices is disabled");
        }
        if !allowed_modes.is_empty() && !allowed_modes.contains(&self.dish_mode()) {
            return self.reject(&id, "Command is not allowed");
        }

        self.lrc.set_status(&id, TaskStatus::InProgress);
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("lastcommandedmode", AttributeValue::valid(command_name, Utc::now()));

        let this = self.clone();
        let ignored = self.ignored_set();
        let plan_name = plan.name;
        let is_configure = plan_name.starts_with("ConfigureBand");
        let spawned_id = id.clone();
        tokio::spawn(async move {
            if is_configure {
                this.configuring.store(true, Ordering::Release);
            }
            let outcome = this
                .engine
                .run(
                    &spawned_id,
                    &this.lrc,
                    plan,
                    &ignored,
                    this.state_notify.clone(),
                    || this.snapshot(),
                    this.command_abort_flag.clone(),
                    this.command_abort_notify.clone(),
                    this.config.device_proxy.command_timeout,
                )
                .await;
            if is_configure {
                this.configuring.store(false, Ordering::Release);
                this.recompute_aggregation();
            }
            this.finish(&spawned_id, outcome);
        });

        (ResultCode::Started, id)
    }

    fn finish(&self, id: &str, outcome: FanoutOutcome) {
        let result = match outcome.status {
            TaskStatus::Completed => LrcResult::ok(outcome.message),
            _ => LrcResult::failed(outcome.message),
        };
        self.lrc.complete(id, outcome.status, result);
    }

    // ---- mode commands ---------------------------------------------------

    pub async fn set_standby_lp_mode(self: &Arc<Self>) -> (ResultCode, String) {
        self.submit_plan(
            "SetStandbyLPMode",
            &[DishMode::StandbyFp, DishMode::Stow, DishMode::Maintenance],
            serde_json::Value::Null,
            plans::set_standby_lp_mode(),
        )
        .await
    }

    pub async fn set_standby_fp_mode(self: &Arc<Self>) -> (ResultCode, String) {
        self.submit_plan(
            "SetStandbyFPMode",
            &[
                DishMode::StandbyLp,
                DishMode::Stow,
                DishMode::Operate,
                DishMode::Maintenance,
                DishMode::Config,
            ],
            serde_json::Value::Null,
            plans::set_standby_fp_mode(),
        )
        .await
    }

    pub async fn set_operate_mode(self: &Arc<Self>) -> (ResultCode, String) {
        self.log_command("SetOperateMode", serde_json::Value::Null);
        let id = self.lrc.new_command("SetOperateMode");
        let configured_band_unknown = self
            .state
            .lock()
            .expect("component state lock poisoned")
            .get("configuredband")
            .and_then(|v| v.as_str())
            .map(|band| band == "UNKNOWN" || band == "NONE")
            .unwrap_or(true);
        if configured_band_unknown {
            return self.reject(&id, "SetOperateMode requires a configured band");
        }
        if self.dish_mode() != DishMode::StandbyFp {
            return self.reject(&id, "Command is not allowed");
        }
        self.lrc.set_status(&id, TaskStatus::InProgress);
        let this = self.clone();
        let ignored = self.ignored_set();
        let spawned_id = id.clone();
        tokio::spawn(async move {
            let outcome = this
                .engine
                .run(
                    &spawned_id,
                    &this.lrc,
                    plans::set_operate_mode(),
                    &ignored,
                    this.state_notify.clone(),
                    || this.snapshot(),
                    this.command_abort_flag.clone(),
                    this.command_abort_notify.clone(),
                    this.config.device_proxy.command_timeout,
                )
                .await;
            this.finish(&spawned_id, outcome);
        });
        (ResultCode::Started, id)
    }

    pub async fn set_stow_mode(self: &Arc<Self>) -> (ResultCode, String) {
        self.submit_plan("SetStowMode", &[], serde_json::Value::Null, plans::set_stow_mode())
            .await
    }

    pub async fn set_maintenance_mode(self: &Arc<Self>) -> (ResultCode, String) {
        self.submit_plan(
            "SetMaintenanceMode",
            &[DishMode::StandbyLp, DishMode::StandbyFp],
            serde_json::Value::Null,
            plans::set_maintenance_mode(),
        )
        .await
    }

    pub async fn configure_band(self: &Arc<Self>, band: Band) -> (ResultCode, String) {
        let plan = plans::configure_band(band);
        let name: &'static str = plan.name;
        self.submit_plan(
            name,
            &[DishMode::StandbyFp, DishMode::Stow, DishMode::Operate],
            serde_json::json!(band.to_string()),
            plan,
        )
        .await
    }

    pub async fn track(self: &Arc<Self>) -> (ResultCode, String) {
        let id = self.lrc.new_command("Track");
        self.log_command("Track", serde_json::Value::Null);
        if self.dish_mode() != DishMode::Operate || self.pointing_state() != "READY" {
            return self.reject(&id, "Command is not allowed");
        }
        self.dispatch_plan(id, plans::track()).await
    }

    pub async fn track_stop(self: &Arc<Self>) -> (ResultCode, String) {
        let id = self.lrc.new_command("TrackStop");
        self.log_command("TrackStop", serde_json::Value::Null);
        let pointing_ok = matches!(self.pointing_state().as_str(), "TRACK" | "SLEW");
        if self.dish_mode() != DishMode::Operate || !pointing_ok {
            return self.reject(&id, "Command is not allowed");
        }
        self.dispatch_plan(id, plans::track_stop()).await
    }

    pub async fn slew(self: &Arc<Self>, args: Vec<f64>) -> (ResultCode, String) {
        self.log_command("Slew", serde_json::json!(args));
        let id = self.lrc.new_command("Slew");
        if args.len() != 2 {
            return self.reject(&id, format!("Expected 2 arguments (az, el) but got {} arg(s).", args.len()));
        }
        if self.dish_mode() != DishMode::Operate {
            return self.reject(
                &id,
                "Slew command rejected for current dishMode. Slew command is allowed for dishMode OPERATE",
            );
        }
        if self.pointing_state() != "READY" {
            return self.reject(&id, "Command is not allowed");
        }
        self.dispatch_plan(id, plans::slew(args[0], args[1])).await
    }

    pub async fn scan(self: &Arc<Self>, scan_id: String) -> (ResultCode, String) {
        self.log_command("Scan", serde_json::json!(scan_id));
        let id = self.lrc.new_command("Scan");
        self.lrc.set_status(&id, TaskStatus::InProgress);
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("scanid", AttributeValue::valid(scan_id, Utc::now()));
        self.lrc.complete(&id, TaskStatus::Completed, LrcResult::ok("Scan completed"));
        (ResultCode::Ok, id)
    }

    pub async fn end_scan(self: &Arc<Self>) -> (ResultCode, String) {
        self.log_command("EndScan", serde_json::Value::Null);
        let id = self.lrc.new_command("EndScan");
        self.lrc.set_status(&id, TaskStatus::InProgress);
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("scanid", AttributeValue::valid("", Utc::now()));
        self.lrc.complete(&id, TaskStatus::Completed, LrcResult::ok("EndScan completed"));
        (ResultCode::Ok, id)
    }

    pub async fn track_load_static_off(self: &Arc<Self>, args: Vec<f64>) -> (ResultCode, String) {
        self.log_command("TrackLoadStaticOff", serde_json::json!(args));
        let id = self.lrc.new_command("TrackLoadStaticOff");
        if args.len() != 2 {
            return self.reject(&id, format!("Expected 2 arguments (xel, el) but got {} arg(s).", args.len()));
        }
        self.dispatch_plan(id, plans::track_load_static_off(args[0], args[1])).await
    }

    pub async fn set_k_value(self: &Arc<Self>, k: i64) -> (ResultCode, String) {
        let id = self.lrc.new_command("SetKValue");
        self.log_command("SetKValue", serde_json::json!(k));
        self.dispatch_plan(id, plans::set_k_value(k)).await
    }

    async fn dispatch_plan(self: &Arc<Self>, id: String, plan: crate::command_map::Plan) -> (ResultCode, String) {
        if self.shutdown_flag.load(Ordering::Acquire) {
            return self.reject(&id, "Connection interrupted");
        }
        if !self.communication_ok() {
            return self.reject(&id, "Communication with one or more devices is disabled");
        }
        self.lrc.set_status(&id, TaskStatus::InProgress);
        let this = self.clone();
        let ignored = self.ignored_set();
        let spawned_id = id.clone();
        tokio::spawn(async move {
            let outcome = this
                .engine
                .run(
                    &spawned_id,
                    &this.lrc,
                    plan,
                    &ignored,
                    this.state_notify.clone(),
                    || this.snapshot(),
                    this.command_abort_flag.clone(),
                    this.command_abort_notify.clone(),
                    this.config.device_proxy.command_timeout,
                )
                .await;
            this.finish(&spawned_id, outcome);
        });
        (ResultCode::Started, id)
    }

    pub async fn apply_pointing_model(self: &Arc<Self>, json: serde_json::Value) -> (ResultCode, String) {
        self.log_command("ApplyPointingModel", json.clone());
        let id = self.lrc.new_command("ApplyPointingModel");
        match crate::pointing_model::validate(&self.config, &json) {
            Ok((band, coefficients)) => {
                self.lrc.set_status(&id, TaskStatus::InProgress);
                let key = format!("band{}pointingmodelparams", band.to_lowercase());
                match self.children["DS"].write_attribute_value(&key, serde_json::json!(coefficients)).await {
                    Ok(()) => {
                        self.lrc.complete(&id, TaskStatus::Completed, LrcResult::ok("ApplyPointingModel completed"));
                        (ResultCode::Ok, id)
                    }
                    Err(err) => {
                        self.lrc.complete(&id, TaskStatus::Failed, LrcResult::failed(err.to_string()));
                        (ResultCode::Failed, id)
                    }
                }
            }
            Err(message) => self.reject(&id, message),
        }
    }

    pub async fn abort(self: &Arc<Self>) -> (ResultCode, String) {
        self.log_command("Abort", serde_json::Value::Null);
        let ignored = self.ignored_set();
        let (status, message) = self.abort_sequencer.run(&ignored).await;
        match status {
            TaskStatus::Rejected => (ResultCode::Rejected, message),
            TaskStatus::Completed => (ResultCode::Ok, message),
            _ => (ResultCode::Failed, message),
        }
    }

    /// Deprecated alias of `abort`, kept for clients that haven't migrated
    /// off the old name. Same behaviour, warns once per call.
    pub async fn abort_commands(self: &Arc<Self>) -> (ResultCode, String) {
        warn!("AbortCommands is deprecated, use Abort instead");
        self.abort().await
    }

    /// Resets the DS program-track table to five copies of
    /// `(timestamp+5s, az=0, el=50)` without running the rest of the abort
    /// sequence.
    pub async fn reset_track_table(self: &Arc<Self>) -> (ResultCode, String) {
        self.log_command("ResetTrackTable", serde_json::Value::Null);
        let id = self.lrc.new_command("ResetTrackTable");
        self.lrc.set_status(&id, TaskStatus::InProgress);
        match self
            .children["DS"]
            .write_attribute_value("programtracktable", serde_json::json!(crate::abort::reset_table_rows()))
            .await
        {
            Ok(()) => {
                self.lrc.complete(&id, TaskStatus::Completed, LrcResult::ok("ResetTrackTable completed"));
                (ResultCode::Ok, id)
            }
            Err(err) => {
                self.lrc.complete(&id, TaskStatus::Failed, LrcResult::failed(err.to_string()));
                (ResultCode::Failed, id)
            }
        }
    }

    /// Forces a fresh read of every child's current component state into
    /// the rolled-up view, rather than waiting for the next change-callback.
    pub fn sync_component_states(self: &Arc<Self>) -> ComponentState {
        self.recompute_aggregation();
        self.snapshot()
    }

    // ---- heartbeat ---------------------------------------------------

    pub fn write_tmc_heartbeat_interval(&self, seconds: f64) -> DishManagerResult<()> {
        let now = Utc::now();
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("tmcheartbeatinterval", AttributeValue::valid(seconds, now));
        if seconds > 0.0 {
            self.watchdog.enable(Duration::from_secs_f64(seconds))
        } else {
            self.watchdog.disable();
            Ok(())
        }
    }

    pub fn tmc_heartbeat(&self) -> DishManagerResult<String> {
        let interval = self
            .state
            .lock()
            .expect("component state lock poisoned")
            .get("tmcheartbeatinterval")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        if interval <= 0.0 {
            return Err(DishManagerError::WatchdogInactive);
        }
        self.watchdog.reset(Duration::from_secs_f64(interval))?;
        let tai = current_tai_timestamp();
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("tmclastheartbeat", AttributeValue::valid(tai, Utc::now()));
        Ok(format!("TMC heartbeat received at: {}", Utc::now()))
    }

    async fn handle_heartbeat_timeout(self: &Arc<Self>) {
        warn!("TMC heartbeat expired, forcing SetStowMode");
        self.set_stow_mode().await;
        let now = Utc::now();
        let mut state = self.state.lock().expect("component state lock poisoned");
        state.set("tmclastheartbeat", AttributeValue::valid(0.0, now));
        state.set("tmcheartbeatinterval", AttributeValue::valid(0.0, now));
    }

    // ---- ignore flags ---------------------------------------------------

    pub fn write_ignore_spf(&self, value: bool) {
        self.flags.set_ignore_spf(value);
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("ignorespf", AttributeValue::valid(value, Utc::now()));
        self.recompute_aggregation();
    }

    pub fn write_ignore_spfrx(&self, value: bool) {
        self.flags.set_ignore_spfrx(value);
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("ignorespfrx", AttributeValue::valid(value, Utc::now()));
        self.recompute_aggregation();
    }

    pub fn write_ignore_b5dc(&self, value: bool) {
        self.flags.set_ignore_b5dc(value);
        self.state
            .lock()
            .expect("component state lock poisoned")
            .set("ignoreb5dc", AttributeValue::valid(value, Utc::now()));
        self.recompute_aggregation();
    }

    // ---- introspection ---------------------------------------------------

    pub fn get_component_states(&self) -> HashMap<&'static str, ComponentState> {
        CHILD_NAMES
            .into_iter()
            .map(|name| (name, self.children[name].component_state()))
            .collect()
    }

    pub fn lrc_tracker(&self) -> &Arc<LrcTracker> {
        &self.lrc
    }
}

impl Drop for DishManagerComponentManager {
    fn drop(&mut self) {
        self.scheduler.stop();
        info!("dish manager component manager dropped");
    }
}
