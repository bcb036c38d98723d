//! `dscErrorStatuses` aggregation (spec §4.7): a single human-readable
//! string joining every DS error-status flag currently set, or `"OK"` when
//! none are.

use super::AggregationInput;
use dish_manager_types::schemas::DS_ERROR_STATUS_FLAGS;

pub fn compute_error_status(input: &AggregationInput<'_>) -> String {
    let messages: Vec<&str> = DS_ERROR_STATUS_FLAGS
        .iter()
        .filter(|(key, _)| input.ds.get(key).and_then(|v| v.as_bool()).unwrap_or(false))
        .map(|(_, message)| *message)
        .collect();

    if messages.is_empty() {
        "OK".to_string()
    } else {
        messages.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::test_support::snapshot;
    use dish_manager_types::AttributeValue;

    #[test]
    fn no_flags_set_is_ok() {
        let snap = snapshot(&[]);
        assert_eq!(compute_error_status(&snap.as_input(false, false, false)), "OK");
    }

    #[test]
    fn single_flag_reports_its_message() {
        let mut snap = snapshot(&[]);
        snap.ds.set("hvactripflag", AttributeValue::valid(true, chrono::Utc::now()));
        assert_eq!(
            compute_error_status(&snap.as_input(false, false, false)),
            "HVAC trip"
        );
    }

    #[test]
    fn multiple_flags_join_in_schema_order() {
        let mut snap = snapshot(&[]);
        let now = chrono::Utc::now();
        snap.ds.set("brakeerror", AttributeValue::valid(true, now));
        snap.ds.set("hvactripflag", AttributeValue::valid(true, now));
        assert_eq!(
            compute_error_status(&snap.as_input(false, false, false)),
            "HVAC trip; Brake error"
        );
    }
}
