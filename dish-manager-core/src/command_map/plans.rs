//! Canonical fan-out plans (spec §4.8 table). Each function builds one
//! high-level command's ordered `Device.Command` steps plus its awaited
//! predicate over the dish-level rolled-up state.

use super::types::{Plan, Predicate, SubCommand};
use dish_manager_types::{Band, DishMode};
use std::sync::Arc;

fn dish_mode_predicate(target: DishMode) -> (Predicate, String) {
    let expected = target.to_string();
    let description = format!("dishmode change to {expected}");
    let predicate: Predicate =
        Arc::new(move |state| state.get("dishmode").and_then(|v| v.as_str()) == Some(expected.as_str()));
    (predicate, description)
}

/// A step-level predicate over the *child's own* raw state (not the
/// dish-level rolled-up view), so the engine can report that one child's
/// command actually took effect rather than just that it was accepted.
fn raw_value_predicate(key: &'static str, expected: impl Into<String>) -> (Predicate, String) {
    let expected = expected.into();
    let description = format!("{key} change to {expected}");
    let predicate: Predicate =
        Arc::new(move |state| state.get(key).and_then(|v| v.as_str()) == Some(expected.as_str()));
    (predicate, description)
}

pub fn set_standby_lp_mode() -> Plan {
    let (predicate, predicate_description) = dish_mode_predicate(DishMode::StandbyLp);
    let (spf_done, spf_desc) = raw_value_predicate("operatingmode", "STANDBY_LP");
    let (spfrx_done, spfrx_desc) = raw_value_predicate("operatingmode", "STANDBY");
    let (ds_done, ds_desc) = raw_value_predicate("operatingmode", "STANDBY_LP");
    Plan {
        name: "SetStandbyLPMode",
        steps: vec![
            SubCommand::new("SPF", "SetStandbyLPMode", serde_json::Value::Null).awaiting(spf_done, spf_desc),
            SubCommand::new("SPFRX", "SetStandbyMode", serde_json::Value::Null).awaiting(spfrx_done, spfrx_desc),
            SubCommand::new("DS", "SetStandbyLPMode", serde_json::Value::Null).awaiting(ds_done, ds_desc),
        ],
        predicate: Some(predicate),
        predicate_description: Some(predicate_description),
    }
}

pub fn set_standby_fp_mode() -> Plan {
    let (predicate, predicate_description) = dish_mode_predicate(DishMode::StandbyFp);
    let (ds_mode_done, ds_mode_desc) = raw_value_predicate("operatingmode", "STANDBY_FP");
    let (spf_done, spf_desc) = raw_value_predicate("operatingmode", "OPERATE");
    let spfrx_done: Predicate = Arc::new(|state| {
        matches!(state.get("operatingmode").and_then(|v| v.as_str()), Some("STANDBY") | Some("DATA_CAPTURE"))
    });
    Plan {
        name: "SetStandbyFPMode",
        steps: vec![
            SubCommand::new("DS", "SetStandbyFPMode", serde_json::Value::Null).awaiting(ds_mode_done, ds_mode_desc),
            // SetPowerMode's effect surfaces as a `powerstate` push from the
            // device itself, which no step here can await without a real
            // device backing it; left fire-and-forget like the other
            // single-shot mode commands.
            SubCommand::new("DS", "SetPowerMode", serde_json::json!("FULL_POWER")),
            SubCommand::new("SPF", "SetOperateMode", serde_json::Value::Null).awaiting(spf_done, spf_desc),
            SubCommand::new("SPFRX", "SetStandbyMode", serde_json::Value::Null)
                .awaiting(spfrx_done, "operatingmode change to STANDBY or DATA_CAPTURE"),
        ],
        predicate: Some(predicate),
        predicate_description: Some(predicate_description),
    }
}

pub fn set_operate_mode() -> Plan {
    let (predicate, predicate_description) = dish_mode_predicate(DishMode::Operate);
    let (spf_done, spf_desc) = raw_value_predicate("operatingmode", "OPERATE");
    let (ds_done, ds_desc) = raw_value_predicate("operatingmode", "POINT");
    Plan {
        name: "SetOperateMode",
        steps: vec![
            SubCommand::new("SPF", "SetOperateMode", serde_json::Value::Null).awaiting(spf_done, spf_desc),
            SubCommand::new("DS", "SetPointMode", serde_json::Value::Null).awaiting(ds_done, ds_desc),
        ],
        predicate: Some(predicate),
        predicate_description: Some(predicate_description),
    }
}

pub fn set_stow_mode() -> Plan {
    Plan {
        name: "SetStowMode",
        steps: vec![SubCommand::new("DS", "Stow", serde_json::Value::Null)],
        predicate: None,
        predicate_description: None,
    }
}

pub fn set_maintenance_mode() -> Plan {
    let (predicate, predicate_description) = dish_mode_predicate(DishMode::Maintenance);
    let (ds_done, ds_desc) = raw_value_predicate("operatingmode", "STOW");
    let (spf_done, spf_desc) = raw_value_predicate("operatingmode", "MAINTENANCE");
    let (spfrx_done, spfrx_desc) = raw_value_predicate("operatingmode", "STANDBY");
    Plan {
        name: "SetMaintenanceMode",
        steps: vec![
            SubCommand::new("DS", "Stow", serde_json::Value::Null).awaiting(ds_done, ds_desc),
            SubCommand::new("SPF", "SetMaintenanceMode", serde_json::Value::Null).awaiting(spf_done, spf_desc),
            SubCommand::new("SPFRX", "SetStandbyMode", serde_json::Value::Null).awaiting(spfrx_done, spfrx_desc),
        ],
        predicate: Some(predicate),
        predicate_description: Some(predicate_description),
    }
}

pub fn configure_band(band: Band) -> Plan {
    let expected = band.to_string();
    let description = format!("configuredBand change to {expected}");
    let predicate: Predicate =
        Arc::new(move |state| state.get("configuredband").and_then(|v| v.as_str()) == Some(expected.as_str()));
    let command_name: &'static str = match band {
        Band::B1 => "ConfigureBand1",
        Band::B2 => "ConfigureBand2",
        Band::B3 => "ConfigureBand3",
        Band::B4 => "ConfigureBand4",
        Band::B5a => "ConfigureBand5a",
        Band::B5b => "ConfigureBand5b",
        _ => "ConfigureBand",
    };
    let (spfrx_done, spfrx_desc) = raw_value_predicate("configuredband", band.to_string());
    Plan {
        name: command_name,
        steps: vec![
            SubCommand::new("DS", "SetIndexPosition", serde_json::json!(band.to_string())),
            SubCommand::new("SPFRX", command_name, serde_json::Value::Null).awaiting(spfrx_done, spfrx_desc),
        ],
        predicate: Some(predicate),
        predicate_description: Some(description),
    }
}

pub fn track() -> Plan {
    Plan {
        name: "Track",
        steps: vec![SubCommand::new("DS", "Track", serde_json::Value::Null)],
        predicate: None,
        predicate_description: None,
    }
}

pub fn track_stop() -> Plan {
    let predicate: Predicate =
        Arc::new(|state| state.get("pointingstate").and_then(|v| v.as_str()) == Some("READY"));
    Plan {
        name: "TrackStop",
        steps: vec![SubCommand::new("DS", "TrackStop", serde_json::Value::Null)],
        predicate: Some(predicate),
        predicate_description: Some("pointingState change to READY".to_string()),
    }
}

pub fn slew(az: f64, el: f64) -> Plan {
    Plan {
        name: "Slew",
        steps: vec![SubCommand::new("DS", "Slew", serde_json::json!([az, el]))],
        predicate: None,
        predicate_description: None,
    }
}

pub fn track_load_static_off(xel: f64, el: f64) -> Plan {
    let predicate: Predicate = Arc::new(move |state| {
        let xel_match = state.get("actstaticoffsetvaluexel").and_then(|v| v.as_f64()) == Some(xel);
        let el_match = state.get("actstaticoffsetvalueel").and_then(|v| v.as_f64()) == Some(el);
        xel_match && el_match
    });
    Plan {
        name: "TrackLoadStaticOff",
        steps: vec![SubCommand::new(
            "DS",
            "TrackLoadStaticOff",
            serde_json::json!([xel, el]),
        )],
        predicate: Some(predicate),
        predicate_description: Some("static pointing offset applied".to_string()),
    }
}

pub fn set_k_value(k: i64) -> Plan {
    Plan {
        name: "SetKValue",
        steps: vec![SubCommand::new("SPFRX", "SetKValue", serde_json::json!(k))],
        predicate: None,
        predicate_description: None,
    }
}
