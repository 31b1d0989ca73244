use serde::Serialize;
use shared::{domain::SettingsDocument, error::RequestFailure};

use crate::actions::Action;

/// Tasks that carry per-task resource limits in the settings document.
pub const TASK_NAMES: [&str; 5] = [
    "create_sample",
    "build_index",
    "create_subtraction",
    "pathoscope_bowtie",
    "nuvs",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskLimits {
    pub proc: Option<u64>,
    pub mem: Option<u64>,
    pub inst: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsState {
    pub data: Option<SettingsDocument>,
    pub error: Option<RequestFailure>,
}

pub fn reduce(state: SettingsState, action: &Action) -> SettingsState {
    match action {
        Action::GetSettingsSucceeded { data } | Action::UpdateSettingSucceeded { data } => {
            SettingsState {
                data: Some(data.clone()),
                error: None,
            }
        }
        Action::GetSettingsFailed { error } | Action::UpdateSettingFailed { error, .. } => {
            SettingsState {
                error: Some(error.clone()),
                ..state
            }
        }
        _ => state,
    }
}

/// Reads the flat `<task>_proc`, `<task>_mem` and `<task>_inst` keys for
/// every task in [`TASK_NAMES`], in that order.
pub fn task_limits(settings: &SettingsDocument) -> Vec<(&'static str, TaskLimits)> {
    TASK_NAMES
        .iter()
        .map(|task| {
            let limits = TaskLimits {
                proc: settings.get_u64(&format!("{task}_proc")),
                mem: settings.get_u64(&format!("{task}_mem")),
                inst: settings.get_u64(&format!("{task}_inst")),
            };
            (*task, limits)
        })
        .collect()
}

/// Instance-wide `(proc, mem)` ceilings the task limits must stay under.
pub fn resource_limits(settings: &SettingsDocument) -> (Option<u64>, Option<u64>) {
    (settings.get_u64("proc"), settings.get_u64("mem"))
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
