//! Per-band `capabilityState` aggregation (spec §4.7).

use super::AggregationInput;
use dish_manager_types::{Band, CapabilityState, DishMode};

fn band_key(band: Band) -> &'static str {
    match band {
        Band::B1 => "b1capabilitystate",
        Band::B2 => "b2capabilitystate",
        Band::B3 => "b3capabilitystate",
        Band::B4 => "b4capabilitystate",
        Band::B5a => "b5acapabilitystate",
        Band::B5b => "b5bcapabilitystate",
        Band::Unknown | Band::None => "",
    }
}

fn parse_capability(raw: Option<&str>) -> CapabilityState {
    match raw {
        Some("UNAVAILABLE") => CapabilityState::Unavailable,
        Some("STANDBY") => CapabilityState::Standby,
        Some("CONFIGURING") => CapabilityState::Configuring,
        Some("OPERATE_DEGRADED") => CapabilityState::OperateDegraded,
        Some("OPERATE_FULL") => CapabilityState::OperateFull,
        _ => CapabilityState::Unknown,
    }
}

/// Computes all six `CONFIGURABLE` bands' capability state against an
/// already-resolved `dish_mode` (the caller runs [`super::compute_dish_mode`]
/// first and feeds the result in here — the rule table depends on it).
pub fn compute_capability_states(
    input: &AggregationInput<'_>,
    dish_mode: DishMode,
) -> Vec<(Band, CapabilityState)> {
    let ds_startup = input.ds.get("operatingmode").and_then(|v| v.as_str()) == Some("STARTUP");
    let indexer_moving = input.ds.get("indexerposition").and_then(|v| v.as_str()) == Some("MOVING");
    let spfrx_configuring = !input.ignore_spfrx
        && input.spfrx.get("operatingmode").and_then(|v| v.as_str()) == Some("CONFIGURE");

    Band::CONFIGURABLE
        .into_iter()
        .map(|band| {
            let key = band_key(band);
            let spf_cap = if input.ignore_spf {
                CapabilityState::Unknown
            } else {
                parse_capability(input.spf.get(key).and_then(|v| v.as_str()))
            };
            let spfrx_cap = if input.ignore_spfrx {
                CapabilityState::Unknown
            } else {
                parse_capability(input.spfrx.get(key).and_then(|v| v.as_str()))
            };

            let state = if ds_startup
                || spf_cap == CapabilityState::Unavailable
                || spfrx_cap == CapabilityState::Unavailable
            {
                CapabilityState::Unavailable
            } else if dish_mode == DishMode::StandbyLp
                || (spf_cap == CapabilityState::Standby && spfrx_cap == CapabilityState::Standby)
            {
                CapabilityState::Standby
            } else if dish_mode == DishMode::Config && (indexer_moving || spfrx_configuring) {
                CapabilityState::Configuring
            } else if spf_cap == CapabilityState::OperateFull && spfrx_cap == CapabilityState::OperateFull {
                CapabilityState::OperateFull
            } else if spf_cap == CapabilityState::OperateDegraded || indexer_moving {
                CapabilityState::OperateDegraded
            } else {
                CapabilityState::Unknown
            };

            (band, state)
        })
        .collect()
}
