//! End-to-end scenarios driving the full component manager (C1-C10) against
//! `MockTransport`, exercising one antenna's command surface the way a
//! service front-end would.

use dish_manager_core::components::{B5dcManager, DsManager, SpfManager, SpfRxManager, WmsManager};
use dish_manager_core::device::DeviceProxyManager;
use dish_manager_core::scheduler::CommandScheduler;
use dish_manager_core::testing::MockTransport;
use dish_manager_core::DishManagerComponentManager;
use dish_manager_types::{
    Band, DishManagerConfig, DishMode, InMemoryFlags, ResultCode, TaskStatus,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    manager: Arc<DishManagerComponentManager>,
    transport: Arc<MockTransport>,
    spfrx_scheduler: Arc<CommandScheduler>,
}

async fn build(config: DishManagerConfig) -> Harness {
    let transport = Arc::new(MockTransport::default());

    transport.seed("ds", "operatingmode", json!("STANDBY_LP"));
    transport.seed("ds", "pointingstate", json!("READY"));
    transport.seed("ds", "powerstate", json!("LOW_POWER"));
    transport.seed("ds", "healthstate", json!("OK"));
    transport.seed("spf", "operatingmode", json!("STANDBY_LP"));
    transport.seed("spf", "healthstate", json!("OK"));
    transport.seed("spfrx", "operatingmode", json!("STANDBY"));
    transport.seed("spfrx", "configuredband", json!("NONE"));
    transport.seed("spfrx", "healthstate", json!("OK"));
    transport.seed("b5dc", "healthstate", json!("OK"));

    let proxy = Arc::new(DeviceProxyManager::new(transport.clone(), config.device_proxy.clone()));
    let spfrx_scheduler = CommandScheduler::start();

    let ds = Arc::new(DsManager::new("ds", proxy.clone()));
    let spf = Arc::new(SpfManager::new("spf", proxy.clone()));
    let spfrx = Arc::new(SpfRxManager::new("spfrx", proxy.clone(), spfrx_scheduler.clone()));
    let b5dc = Arc::new(B5dcManager::new("b5dc", proxy.clone()));
    let wms = Arc::new(WmsManager::new("wms", proxy));
    let flags = Arc::new(InMemoryFlags::default());

    let manager = DishManagerComponentManager::new(ds, spf, spfrx, b5dc, wms, flags, config);
    manager.start_communicating().await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    Harness { manager, transport, spfrx_scheduler }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.spfrx_scheduler.stop();
    }
}

async fn wait_for_lrc_terminal(
    manager: &DishManagerComponentManager,
    id: &str,
    attempts: u32,
) -> TaskStatus {
    for _ in 0..attempts {
        if let Some(record) = manager.lrc_tracker().get(id) {
            if record.status.is_terminal() {
                return record.status;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("LRC {id} did not reach a terminal status in time");
}

#[tokio::test]
async fn standby_lp_to_fp_happy_path() {
    let harness = build(DishManagerConfig::default()).await;
    assert_eq!(harness.manager.dish_mode(), DishMode::StandbyLp);

    let (code, id) = harness.manager.set_standby_fp_mode().await;
    assert_eq!(code, ResultCode::Started);

    tokio::time::sleep(Duration::from_millis(30)).await;
    harness.transport.push("ds", "operatingmode", json!("STANDBY_FP"));
    harness.transport.push("spf", "operatingmode", json!("OPERATE"));

    let status = wait_for_lrc_terminal(&harness.manager, &id, 25).await;
    assert_eq!(status, TaskStatus::Completed);
    assert_eq!(harness.manager.dish_mode(), DishMode::StandbyFp);
}

#[tokio::test]
async fn set_operate_mode_is_rejected_without_a_configured_band() {
    let harness = build(DishManagerConfig::default()).await;

    harness.transport.push("ds", "operatingmode", json!("STANDBY_FP"));
    harness.transport.push("spf", "operatingmode", json!("OPERATE"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(harness.manager.dish_mode(), DishMode::StandbyFp);

    let (code, id) = harness.manager.set_operate_mode().await;
    assert_eq!(code, ResultCode::Rejected);
    let record = harness.manager.lrc_tracker().get(&id).unwrap();
    assert_eq!(record.status, TaskStatus::Rejected);
}

#[tokio::test]
async fn configure_band_2_from_standby_fp() {
    let harness = build(DishManagerConfig::default()).await;

    harness.transport.push("ds", "operatingmode", json!("STANDBY_FP"));
    harness.transport.push("spf", "operatingmode", json!("OPERATE"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(harness.manager.dish_mode(), DishMode::StandbyFp);

    let (code, id) = harness.manager.configure_band(Band::B2).await;
    assert_eq!(code, ResultCode::Started);

    tokio::time::sleep(Duration::from_millis(30)).await;
    harness.transport.push("spfrx", "configuredband", json!("B2"));

    let status = wait_for_lrc_terminal(&harness.manager, &id, 25).await;
    assert_eq!(status, TaskStatus::Completed);
    let state = harness.manager.component_state();
    assert_eq!(state.get("configuredband").and_then(|v| v.as_str()), Some("B2"));
}

#[tokio::test]
async fn abort_cancels_the_in_flight_command_and_runs_its_own_sequence() {
    let harness = build(DishManagerConfig::default()).await;

    let (code, original_id) = harness.manager.set_standby_fp_mode().await;
    assert_eq!(code, ResultCode::Started);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let manager = harness.manager.clone();
    let abort_task = tokio::spawn(async move { manager.abort().await });
    tokio::time::sleep(Duration::from_millis(30)).await;

    // Let the abort sequencer's own SetStandbyFPMode step complete quickly.
    harness.transport.push("ds", "operatingmode", json!("STANDBY_FP"));
    harness.transport.push("spf", "operatingmode", json!("OPERATE"));

    let (abort_code, _message) = abort_task.await.unwrap();
    assert_eq!(abort_code, ResultCode::Ok);

    let original_status = wait_for_lrc_terminal(&harness.manager, &original_id, 10).await;
    assert_eq!(original_status, TaskStatus::Aborted);
}

#[tokio::test]
async fn heartbeat_timeout_forces_stow() {
    let harness = build(DishManagerConfig::default()).await;

    harness
        .manager
        .write_tmc_heartbeat_interval(0.1)
        .expect("enabling the watchdog should succeed");

    tokio::time::sleep(Duration::from_millis(250)).await;

    let state = harness.manager.component_state();
    assert_eq!(state.get("tmcheartbeatinterval").and_then(|v| v.as_f64()), Some(0.0));

    let in_flight = harness.manager.lrc_tracker().list_terminal();
    let stow_logged = in_flight.iter().any(|id| {
        harness
            .manager
            .lrc_tracker()
            .get(id)
            .map(|record| record.command_name == "SetStowMode")
            .unwrap_or(false)
    });
    assert!(stow_logged, "expected a SetStowMode record after heartbeat timeout");
}

#[tokio::test]
async fn slew_rejects_the_wrong_argument_count() {
    let harness = build(DishManagerConfig::default()).await;

    let (code, id) = harness.manager.slew(vec![12.0]).await;
    assert_eq!(code, ResultCode::Rejected);
    let record = harness.manager.lrc_tracker().get(&id).unwrap();
    assert!(record.result.as_ref().unwrap().message.contains("Expected 2 arguments"));
}
