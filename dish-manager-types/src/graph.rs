//! Dish-mode transition graph (spec §3 "Dish-Mode Transition Graph").
//!
//! A fixed table of `(source mode, command name)` pairs standing in for the
//! edge-labelled directed graph the original component built with
//! `networkx`: each edge from `source_mode` carries the commands that may
//! drive the dish out of it. `is_command_allowed` is the base admissibility
//! check; the command map (C8) layers its own per-command predicates
//! (configured band, pointing state, ...) on top of this.

use crate::enums::DishMode;

const CONFIG_COMMANDS: &[&str] = &[
    "ConfigureBand1",
    "ConfigureBand2",
    "ConfigureBand3",
    "ConfigureBand4",
    "ConfigureBand5a",
    "ConfigureBand5b",
];

/// One edge: the commands that may be invoked while in `from`.
struct Edge {
    from: DishMode,
    commands: &'static [&'static str],
}

/// `SetStowMode` is valid from every mode except `STOW` itself; modelled as
/// a catch-all checked separately from the named edges below.
const STOW_COMMAND: &str = "SetStowMode";

fn edges() -> &'static [Edge] {
    &[
        Edge {
            from: DishMode::StandbyLp,
            commands: &["SetStandbyFPMode", "SetMaintenanceMode"],
        },
        Edge {
            from: DishMode::StandbyFp,
            commands: &["SetStandbyLPMode", "SetOperateMode", "SetMaintenanceMode"],
        },
        Edge {
            from: DishMode::StandbyFp,
            commands: CONFIG_COMMANDS,
        },
        Edge {
            from: DishMode::Operate,
            commands: &["SetStandbyFPMode"],
        },
        Edge {
            from: DishMode::Operate,
            commands: CONFIG_COMMANDS,
        },
        Edge {
            from: DishMode::Config,
            commands: &["SetStandbyFPMode", "SetOperateMode"],
        },
        Edge {
            from: DishMode::Stow,
            commands: &["SetStandbyFPMode", "SetStandbyLPMode"],
        },
    ]
}

/// Whether `command_name` is admissible while the dish is in `mode`,
/// according to the transition graph alone.
pub fn is_command_allowed(mode: DishMode, command_name: &str) -> bool {
    if command_name == STOW_COMMAND {
        return mode != DishMode::Stow;
    }
    edges()
        .iter()
        .any(|edge| edge.from == mode && edge.commands.contains(&command_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stow_is_allowed_from_every_mode_but_stow() {
        assert!(is_command_allowed(DishMode::Operate, "SetStowMode"));
        assert!(is_command_allowed(DishMode::Startup, "SetStowMode"));
        assert!(!is_command_allowed(DishMode::Stow, "SetStowMode"));
    }

    #[test]
    fn set_operate_mode_only_from_standby_fp_and_config() {
        assert!(is_command_allowed(DishMode::StandbyFp, "SetOperateMode"));
        assert!(is_command_allowed(DishMode::Config, "SetOperateMode"));
        assert!(!is_command_allowed(DishMode::StandbyLp, "SetOperateMode"));
        assert!(!is_command_allowed(DishMode::Operate, "SetOperateMode"));
    }

    #[test]
    fn configure_band_commands_from_standby_fp_and_operate() {
        for command in CONFIG_COMMANDS {
            assert!(is_command_allowed(DishMode::StandbyFp, command));
            assert!(is_command_allowed(DishMode::Operate, command));
            assert!(!is_command_allowed(DishMode::StandbyLp, command));
        }
    }

    #[test]
    fn set_maintenance_mode_only_from_lp_and_fp() {
        assert!(is_command_allowed(DishMode::StandbyLp, "SetMaintenanceMode"));
        assert!(is_command_allowed(DishMode::StandbyFp, "SetMaintenanceMode"));
        assert!(!is_command_allowed(DishMode::Config, "SetMaintenanceMode"));
    }

    #[test]
    fn unknown_command_name_is_never_allowed() {
        assert!(!is_command_allowed(DishMode::StandbyFp, "NotACommand"));
    }
}
