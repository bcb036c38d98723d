//! Aggregation Engine (C7, spec §4.7): pure functions mapping a merged
//! child-state snapshot to the rolled-up `dishMode`, `powerState`,
//! `healthState`, per-band `capabilityState`, and `dscErrorStatuses`.
//!
//! Every function here is deterministic and side-effect free — no network,
//! no locks held across a call — so the component manager (C10) can re-run
//! the whole engine synchronously on every child state change (spec §7
//! "re-run on every child state change").

pub mod capability_state;
pub mod dish_mode;
pub mod error_status;
pub mod health_state;
pub mod power_state;

pub use capability_state::compute_capability_states;
pub use dish_mode::compute_dish_mode;
pub use error_status::compute_error_status;
pub use health_state::compute_health_state;
pub use power_state::compute_power_state;

use dish_manager_types::{CommunicationStatus, ComponentState};

/// The merged view the engine computes over: one component-state snapshot
/// per child, plus the three ignore flags that remove a child from every
/// predicate (spec §4.7 "SPF and SPFRX may be ignored...").
pub struct AggregationInput<'a> {
    pub ds: &'a ComponentState,
    pub spf: &'a ComponentState,
    pub spfrx: &'a ComponentState,
    pub b5dc: &'a ComponentState,
    pub wms: &'a ComponentState,
    pub ds_comm: CommunicationStatus,
    pub spf_comm: CommunicationStatus,
    pub spfrx_comm: CommunicationStatus,
    pub b5dc_comm: CommunicationStatus,
    pub wms_comm: CommunicationStatus,
    pub ignore_spf: bool,
    pub ignore_spfrx: bool,
    pub ignore_b5dc: bool,
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use dish_manager_types::{schemas, AttributeValue, CommunicationStatus, ComponentState};

    pub struct Snapshot {
        pub ds: ComponentState,
        pub spf: ComponentState,
        pub spfrx: ComponentState,
        pub b5dc: ComponentState,
        pub wms: ComponentState,
        pub comm: CommunicationStatus,
    }

    impl Snapshot {
        pub fn as_input(
            &self,
            ignore_spf: bool,
            ignore_spfrx: bool,
            ignore_b5dc: bool,
        ) -> super::AggregationInput<'_> {
            super::AggregationInput {
                ds: &self.ds,
                spf: &self.spf,
                spfrx: &self.spfrx,
                b5dc: &self.b5dc,
                wms: &self.wms,
                ds_comm: self.comm,
                spf_comm: self.comm,
                spfrx_comm: self.comm,
                b5dc_comm: self.comm,
                wms_comm: self.comm,
                ignore_spf,
                ignore_spfrx,
                ignore_b5dc,
            }
        }

        pub fn with_comm(mut self, comm: CommunicationStatus) -> Self {
            self.comm = comm;
            self
        }
    }

    /// Build a snapshot with every child schema initialized to "unknown",
    /// then overlaid with `(child, attribute, value)` triples.
    pub fn snapshot(overlay: &[(&str, &str, &str)]) -> Snapshot {
        let now = Utc::now();
        let mut snap = Snapshot {
            ds: ComponentState::new_with_schema(&schemas::ds_schema(), now),
            spf: ComponentState::new_with_schema(&schemas::spf_schema(), now),
            spfrx: ComponentState::new_with_schema(&schemas::spfrx_schema(), now),
            b5dc: ComponentState::new_with_schema(&schemas::b5dc_schema(), now),
            wms: ComponentState::new_with_schema(&schemas::wms_schema(), now),
            comm: CommunicationStatus::Established,
        };
        for (child, attribute, value) in overlay {
            let state = match *child {
                "ds" => &mut snap.ds,
                "spf" => &mut snap.spf,
                "spfrx" => &mut snap.spfrx,
                "b5dc" => &mut snap.b5dc,
                "wms" => &mut snap.wms,
                other => panic!("unknown child in test snapshot: {other}"),
            };
            state.set(attribute, AttributeValue::valid(serde_json::json!(value), now));
        }
        snap
    }
}
