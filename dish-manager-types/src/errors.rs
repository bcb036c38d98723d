//! Error taxonomy for the dish manager core (spec §7).

use thiserror::Error;

/// Result alias used throughout the dish manager crates.
pub type DishManagerResult<T> = Result<T, DishManagerError>;

/// Errors surfaced by the dish manager core.
///
/// Per spec §7, only argument-validation errors (the `Rejected*` and
/// `InvalidArgument` variants) are meant to surface synchronously from a
/// command's `(ResultCode, message)` return; everything else is translated
/// into LRC progress/result messages by the caller rather than propagated.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DishManagerError {
    #[error("Command is not allowed")]
    CommandNotAllowed,

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Communication with {device} is disabled")]
    CommunicationDisabled { device: String },

    #[error("{device} reported a failure: {message}")]
    RemoteFailure { device: String, message: String },

    #[error("Command was aborted")]
    Aborted,

    #[error("Timed out waiting for {operation}")]
    Timeout { operation: String },

    #[error("Watchdog timer is disabled. Call enable first.")]
    WatchdogInactive,

    #[error("Connection interrupted")]
    ConnectionInterrupted,

    #[error("Connection failed")]
    ConnectionFailed,

    #[error("Existing Abort sequence ongoing")]
    AbortAlreadyInProgress,
}

impl DishManagerError {
    /// Whether the failure is one a caller may sensibly retry, as opposed
    /// to one that will keep failing until the underlying request changes.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CommunicationDisabled { .. }
                | Self::Timeout { .. }
                | Self::ConnectionFailed
                | Self::ConnectionInterrupted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_not_allowed_message_matches_spec() {
        assert_eq!(
            DishManagerError::CommandNotAllowed.to_string(),
            "Command is not allowed"
        );
    }

    #[test]
    fn abort_already_in_progress_message_matches_spec() {
        assert_eq!(
            DishManagerError::AbortAlreadyInProgress.to_string(),
            "Existing Abort sequence ongoing"
        );
    }

    #[test]
    fn remote_failure_is_not_recoverable() {
        let err = DishManagerError::RemoteFailure {
            device: "DS".to_string(),
            message: "boom".to_string(),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn timeout_is_recoverable() {
        let err = DishManagerError::Timeout {
            operation: "dishMode change".to_string(),
        };
        assert!(err.is_recoverable());
    }
}
