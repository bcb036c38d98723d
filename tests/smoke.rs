//! Smoke test for the thin root crate's public surface: installs a
//! `tracing-subscriber` fmt subscriber (the way a real front-end would) and
//! drives one mode transition through the re-exported types end-to-end.

use dish_manager::{DishManagerComponentManager, DishManagerConfig, DishMode, InMemoryFlags, ResultCode};
use dish_manager_core::components::{B5dcManager, DsManager, SpfManager, SpfRxManager, WmsManager};
use dish_manager_core::device::DeviceProxyManager;
use dish_manager_core::scheduler::CommandScheduler;
use dish_manager_core::testing::MockTransport;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("info").with_test_writer().try_init();
}

#[tokio::test]
async fn root_crate_surface_drives_a_mode_transition() {
    init_tracing();

    let transport = Arc::new(MockTransport::default());
    transport.seed("ds", "operatingmode", json!("STANDBY_LP"));
    transport.seed("ds", "powerstate", json!("LOW_POWER"));
    transport.seed("ds", "healthstate", json!("OK"));
    transport.seed("spf", "operatingmode", json!("STANDBY_LP"));
    transport.seed("spf", "healthstate", json!("OK"));
    transport.seed("spfrx", "operatingmode", json!("STANDBY"));
    transport.seed("spfrx", "healthstate", json!("OK"));
    transport.seed("b5dc", "healthstate", json!("OK"));

    let config = DishManagerConfig::default();
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
    assert_eq!(manager.dish_mode(), DishMode::StandbyLp);

    let (code, id) = manager.set_standby_fp_mode().await;
    assert_eq!(code, ResultCode::Started);

    tokio::time::sleep(Duration::from_millis(30)).await;
    transport.push("ds", "operatingmode", json!("STANDBY_FP"));
    transport.push("spf", "operatingmode", json!("OPERATE"));

    for _ in 0..25 {
        if manager.lrc_tracker().get(&id).map(|r| r.status.is_terminal()).unwrap_or(false) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(manager.dish_mode(), DishMode::StandbyFp);

    spfrx_scheduler.stop();
}
