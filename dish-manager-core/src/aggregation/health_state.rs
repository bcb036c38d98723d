//! `healthState` aggregation (spec §4.7): worst-of DS/SPF/SPFRX, forced to
//! `UNKNOWN` if communication with any non-ignored child is lost.

use super::AggregationInput;
use dish_manager_types::{CommunicationStatus, HealthState};

fn child_health(state: &dish_manager_types::ComponentState) -> HealthState {
    match state.get("healthstate").and_then(|v| v.as_str()) {
        Some("OK") => HealthState::Ok,
        Some("DEGRADED") => HealthState::Degraded,
        Some("FAILED") => HealthState::Failed,
        _ => HealthState::Unknown,
    }
}

pub fn compute_health_state(input: &AggregationInput<'_>) -> HealthState {
    if input.ds_comm != CommunicationStatus::Established {
        return HealthState::Unknown;
    }
    if !input.ignore_spf && input.spf_comm != CommunicationStatus::Established {
        return HealthState::Unknown;
    }
    if !input.ignore_spfrx && input.spfrx_comm != CommunicationStatus::Established {
        return HealthState::Unknown;
    }

    let mut worst = child_health(input.ds);
    if !input.ignore_spf {
        worst = worst.max(child_health(input.spf));
    }
    if !input.ignore_spfrx {
        worst = worst.max(child_health(input.spfrx));
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::test_support::snapshot;

    #[test]
    fn all_ok_is_ok() {
        let snap = snapshot(&[
            ("ds", "healthstate", "OK"),
            ("spf", "healthstate", "OK"),
            ("spfrx", "healthstate", "OK"),
        ]);
        assert_eq!(compute_health_state(&snap.as_input(false, false, false)), HealthState::Ok);
    }

    #[test]
    fn worst_of_children_wins() {
        let snap = snapshot(&[
            ("ds", "healthstate", "OK"),
            ("spf", "healthstate", "DEGRADED"),
            ("spfrx", "healthstate", "FAILED"),
        ]);
        assert_eq!(compute_health_state(&snap.as_input(false, false, false)), HealthState::Failed);
    }

    #[test]
    fn communication_loss_on_ds_forces_unknown() {
        let snap = snapshot(&[("ds", "healthstate", "OK")])
            .with_comm(CommunicationStatus::NotEstablished);
        assert_eq!(compute_health_state(&snap.as_input(false, false, false)), HealthState::Unknown);
    }

    #[test]
    fn ignored_child_communication_loss_does_not_force_unknown() {
        let snap = snapshot(&[("ds", "healthstate", "OK")]);
        let mut input = snap.as_input(true, true, false);
        input.spf_comm = CommunicationStatus::NotEstablished;
        input.spfrx_comm = CommunicationStatus::NotEstablished;
        assert_eq!(compute_health_state(&input), HealthState::Ok);
    }
}
