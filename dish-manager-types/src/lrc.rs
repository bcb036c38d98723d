//! Long-running-command record types (spec §3, §4.4).

use crate::enums::{ResultCode, TaskStatus};
use serde::{Deserialize, Serialize};

/// Unique id for one long-running command: `<tai-timestamp>_<nonce>_<command-name>`.
pub fn new_command_id(tai_timestamp: f64, nonce: u32, command_name: &str) -> String {
    format!("{tai_timestamp}_{nonce}_{command_name}")
}

/// The result reported at LRC completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LrcResult {
    pub code: ResultCode,
    pub message: String,
}

impl LrcResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Ok,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Failed,
            message: message.into(),
        }
    }
}

/// One long-running-command's lifecycle record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LrcRecord {
    pub id: String,
    pub command_name: String,
    pub status: TaskStatus,
    pub progress: Vec<String>,
    pub result: Option<LrcResult>,
}

impl LrcRecord {
    pub fn new(id: impl Into<String>, command_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            command_name: command_name.into(),
            status: TaskStatus::Queued,
            progress: Vec::new(),
            result: None,
        }
    }

    pub fn push_progress(&mut self, message: impl Into<String>) {
        self.progress.push(message.into());
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub fn complete(&mut self, status: TaskStatus, result: LrcResult) {
        self.status = status;
        self.result = Some(result);
    }
}
