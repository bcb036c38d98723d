//! `powerState` aggregation (spec §4.7, §9 Open Question (a)).
//!
//! The original component keeps two rule sets — one considering SPF, one
//! with it ignored — rather than a single unconditional fallback. DESIGN.md
//! records the decision to keep both, selected by the `ignoreSpf` flag,
//! rather than collapsing to the spec's suggested single rule.

use super::AggregationInput;
use dish_manager_types::DsPowerState;

fn ds_mapped(raw: Option<&str>) -> Option<DsPowerState> {
    match raw {
        Some("OFF") | Some("UPS") => Some(DsPowerState::Ups),
        Some("LOW_POWER") => Some(DsPowerState::LowPower),
        Some("FULL_POWER") => Some(DsPowerState::FullPower),
        _ => None,
    }
}

fn spf_mapped(raw: Option<&str>) -> Option<DsPowerState> {
    match raw {
        Some("OFF") | Some("UPS") => Some(DsPowerState::Ups),
        Some("LOW_POWER") => Some(DsPowerState::LowPower),
        Some("FULL_POWER") => Some(DsPowerState::FullPower),
        _ => None,
    }
}

pub fn compute_power_state(input: &AggregationInput<'_>) -> DsPowerState {
    let ds_raw = input.ds.get("powerstate").and_then(|v| v.as_str());

    if input.ignore_spf {
        // POWER_STATE_RULES_SPF_IGNORED: DS UNKNOWN folds straight into LOW.
        return ds_mapped(ds_raw).unwrap_or(DsPowerState::LowPower);
    }

    // POWER_STATE_RULES_ALL_DEVICES: DS is primary; SPF only consulted when
    // DS itself is UNKNOWN, and both-unknown resolves to LOW.
    if let Some(state) = ds_mapped(ds_raw) {
        return state;
    }
    let spf_raw = input.spf.get("powerstate").and_then(|v| v.as_str());
    spf_mapped(spf_raw).unwrap_or(DsPowerState::LowPower)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::test_support::snapshot;

    #[test]
    fn ds_full_power_wins_outright() {
        let snap = snapshot(&[("ds", "powerstate", "FULL_POWER")]);
        assert_eq!(
            compute_power_state(&snap.as_input(false, false, false)),
            DsPowerState::FullPower
        );
    }

    #[test]
    fn ds_unknown_falls_back_to_spf() {
        let snap = snapshot(&[
            ("ds", "powerstate", "UNKNOWN"),
            ("spf", "powerstate", "FULL_POWER"),
        ]);
        assert_eq!(
            compute_power_state(&snap.as_input(false, false, false)),
            DsPowerState::FullPower
        );
    }

    #[test]
    fn both_unknown_resolves_to_low() {
        let snap = snapshot(&[
            ("ds", "powerstate", "UNKNOWN"),
            ("spf", "powerstate", "UNKNOWN"),
        ]);
        assert_eq!(
            compute_power_state(&snap.as_input(false, false, false)),
            DsPowerState::LowPower
        );
    }

    #[test]
    fn ignoring_spf_treats_ds_unknown_as_low_without_consulting_spf() {
        let snap = snapshot(&[
            ("ds", "powerstate", "UNKNOWN"),
            ("spf", "powerstate", "FULL_POWER"),
        ]);
        assert_eq!(
            compute_power_state(&snap.as_input(true, false, false)),
            DsPowerState::LowPower
        );
    }
}
