//! `dishMode` aggregation (spec §4.7 "dishMode rules (first matching wins)").
//!
//! The table in the spec lists the generic `STOW` row before the more
//! specific `STOW` + `MAINTENANCE` row; "first matching wins" only makes
//! sense read as most-specific-first, so `MAINTENANCE` is checked before
//! falling back to plain `STOW` here (recorded in DESIGN.md).

use super::AggregationInput;
use dish_manager_types::DishMode;

fn raw<'a>(state: &'a dish_manager_types::ComponentState, key: &str) -> Option<&'a str> {
    state.get(key).and_then(|v| v.as_str())
}

/// A non-DS child's contribution to a dishMode row's predicate.
///
/// `Ignored` is the only wildcard case (the spec's `any` columns apply to
/// `dishMode` rows themselves, not to the ignore flags); a child that is
/// merely unset — hasn't sent its first event yet — must fail the
/// predicate rather than satisfy it, or a reconnecting/starting-up dish
/// would transiently read as whatever mode DS alone happens to report.
enum ChildMode<'a> {
    Ignored,
    Unset,
    Value(&'a str),
}

impl<'a> ChildMode<'a> {
    fn matches(&self, predicate: impl Fn(&str) -> bool) -> bool {
        match self {
            ChildMode::Ignored => true,
            ChildMode::Unset => false,
            ChildMode::Value(v) => predicate(v),
        }
    }
}

fn mode_of<'a>(state: &'a dish_manager_types::ComponentState, ignored: bool) -> ChildMode<'a> {
    if ignored {
        return ChildMode::Ignored;
    }
    match raw(state, "operatingmode") {
        Some(v) => ChildMode::Value(v),
        None => ChildMode::Unset,
    }
}

pub fn compute_dish_mode(input: &AggregationInput<'_>) -> DishMode {
    let ds_mode = raw(input.ds, "operatingmode").unwrap_or("UNKNOWN");
    let spf_mode = mode_of(input.spf, input.ignore_spf);
    let spfrx_mode = mode_of(input.spfrx, input.ignore_spfrx);

    if ds_mode == "STARTUP" {
        return DishMode::Startup;
    }

    if ds_mode == "STANDBY_LP"
        && spf_mode.matches(|m| m == "STANDBY_LP")
        && spfrx_mode.matches(|m| m == "STANDBY")
    {
        return DishMode::StandbyLp;
    }

    if ds_mode == "STANDBY_FP"
        && spf_mode.matches(|m| m == "OPERATE")
        && spfrx_mode.matches(|m| matches!(m, "STANDBY" | "DATA_CAPTURE"))
    {
        return DishMode::StandbyFp;
    }

    if ds_mode == "STOW" {
        if spf_mode.matches(|m| m == "MAINTENANCE") && spfrx_mode.matches(|m| m == "STANDBY") {
            return DishMode::Maintenance;
        }
        return DishMode::Stow;
    }

    if ds_mode == "POINT"
        && spf_mode.matches(|m| m == "OPERATE")
        && spfrx_mode.matches(|m| m == "DATA_CAPTURE")
    {
        return DishMode::Operate;
    }

    // A ConfigureBand sequence puts SPFRX into CONFIGURE regardless of the
    // DS mode it started from (spec §9 Open Question (c): CONFIG is
    // transient for the fan-out's duration only).
    if spfrx_mode.matches(|m| m == "CONFIGURE") {
        return DishMode::Config;
    }

    DishMode::Unknown
}
