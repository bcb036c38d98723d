//! Fan-out Engine (C8, spec §4.8): dispatches one plan's steps sequentially
//! against the children, then waits for the aggregate predicate to hold.

use super::types::{Plan, Predicate};
use crate::components::SubComponentManager;
use crate::lrc_tracker::LrcTracker;
use dish_manager_types::{ComponentState, TaskStatus};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Outcome of awaiting one predicate (a step's own or a plan's aggregate).
enum WaitOutcome {
    Satisfied,
    Aborted,
    TimedOut,
}

async fn await_predicate(
    predicate: &Predicate,
    snapshot: &impl Fn() -> ComponentState,
    state_notify: &Notify,
    abort_flag: &AtomicBool,
    abort_notify: &Notify,
    timeout: Duration,
) -> WaitOutcome {
    loop {
        if predicate(&snapshot()) {
            return WaitOutcome::Satisfied;
        }
        if abort_flag.load(Ordering::Acquire) {
            return WaitOutcome::Aborted;
        }
        tokio::select! {
            _ = state_notify.notified() => continue,
            _ = abort_notify.notified() => return WaitOutcome::Aborted,
            _ = tokio::time::sleep(timeout) => return WaitOutcome::TimedOut,
        }
    }
}

/// The terminal status a fan-out resolves to, carrying the message that
/// becomes the LRC's final result.
pub struct FanoutOutcome {
    pub status: TaskStatus,
    pub message: String,
}

/// Runs [`Plan`]s against a fixed set of children.
pub struct FanoutEngine {
    children: HashMap<&'static str, Arc<dyn SubComponentManager>>,
}

impl FanoutEngine {
    pub fn new(children: HashMap<&'static str, Arc<dyn SubComponentManager>>) -> Self {
        Self { children }
    }

    /// Execute `plan`, logging progress onto `lrc_id`'s record, skipping any
    /// device named in `ignored`, and waiting (if the plan has a predicate)
    /// for `snapshot()` to satisfy it — waking on `state_notify`, bailing out
    /// early on `abort_flag`/`abort_notify`, and giving up after `timeout`.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &self,
        lrc_id: &str,
        tracker: &LrcTracker,
        plan: Plan,
        ignored: &HashSet<&'static str>,
        state_notify: Arc<Notify>,
        snapshot: impl Fn() -> ComponentState,
        abort_flag: Arc<AtomicBool>,
        abort_notify: Arc<Notify>,
        timeout: Duration,
    ) -> FanoutOutcome {
        if !plan.steps.is_empty() {
            tracker.push_progress(lrc_id, plan.fanout_description());
        }

        for step in &plan.steps {
            if abort_flag.load(Ordering::Acquire) {
                return FanoutOutcome {
                    status: TaskStatus::Aborted,
                    message: format!("{} Aborted", plan.name),
                };
            }

            if ignored.contains(step.device) {
                tracker.push_progress(
                    lrc_id,
                    format!("{} device is disabled. {} call ignored", step.device, step.command),
                );
                continue;
            }

            let Some(child) = self.children.get(step.device) else {
                return FanoutOutcome {
                    status: TaskStatus::Failed,
                    message: format!("no sub-component manager registered for {}", step.device),
                };
            };

            let (status, message) = child.execute_command(step.command, step.arg.clone()).await;
            match status {
                TaskStatus::Rejected => {
                    return FanoutOutcome {
                        status: TaskStatus::Rejected,
                        message,
                    }
                }
                TaskStatus::Failed => {
                    return FanoutOutcome {
                        status: TaskStatus::Failed,
                        message: format!("{}.{} failed: {message}", step.device, step.command),
                    }
                }
                _ => {}
            }

            match &step.predicate {
                None => {
                    tracker.push_progress(lrc_id, format!("{}.{} accepted", step.device, step.command));
                }
                Some(step_predicate) => {
                    if let Some(description) = &step.predicate_description {
                        tracker.push_progress(
                            lrc_id,
                            format!("Awaiting {}.{} ({description})", step.device, step.command),
                        );
                    }
                    let child = child.clone();
                    let outcome = await_predicate(
                        step_predicate,
                        &|| child.component_state(),
                        &state_notify,
                        &abort_flag,
                        &abort_notify,
                        timeout,
                    )
                    .await;
                    match outcome {
                        WaitOutcome::Satisfied => {
                            tracker.push_progress(lrc_id, format!("{}.{} completed", step.device, step.command));
                        }
                        WaitOutcome::Aborted => {
                            return FanoutOutcome {
                                status: TaskStatus::Aborted,
                                message: format!("{} Aborted", plan.name),
                            };
                        }
                        WaitOutcome::TimedOut => {
                            return FanoutOutcome {
                                status: TaskStatus::Failed,
                                message: format!("Timed out waiting for {}.{}", step.device, step.command),
                            };
                        }
                    }
                }
            }
        }

        let Some(predicate) = plan.predicate.clone() else {
            return FanoutOutcome {
                status: TaskStatus::Completed,
                message: format!("{} completed", plan.name),
            };
        };

        if let Some(description) = &plan.predicate_description {
            tracker.push_progress(lrc_id, format!("Awaiting {description}"));
        }

        match await_predicate(&predicate, &snapshot, &state_notify, &abort_flag, &abort_notify, timeout).await {
            WaitOutcome::Satisfied => FanoutOutcome {
                status: TaskStatus::Completed,
                message: format!("{} completed", plan.name),
            },
            WaitOutcome::Aborted => FanoutOutcome {
                status: TaskStatus::Aborted,
                message: format!("{} Aborted", plan.name),
            },
            WaitOutcome::TimedOut => FanoutOutcome {
                status: TaskStatus::Failed,
                message: format!("Timed out waiting for {}", plan.name),
            },
        }
    }
}
