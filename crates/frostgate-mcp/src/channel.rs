//! The execution channel contract.
//!
//! Frostgate never talks to the remote platform itself. Callers hand the
//! object tools an [`ExecutionChannel`] that runs one finished statement and
//! returns its rows. Timeouts, retries and cancellation belong to the
//! channel; the tools only report what it returns.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// One result row, keyed by column name.
pub type Row = Map<String, Value>;

/// Remote error code for "object does not exist or not authorized".
pub const OBJECT_DOES_NOT_EXIST: &str = "002003";

/// Remote error code for "insufficient privileges to operate on ...".
pub const INSUFFICIENT_PRIVILEGES: &str = "003001";

/// How a remote call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// The remote side ran the statement and rejected it.
    Rejected,
    Timeout,
    Cancelled,
    /// The channel could not reach the remote side.
    Unavailable,
}

impl FailureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::Rejected => "rejected",
            FailureMode::Timeout => "timeout",
            FailureMode::Cancelled => "cancelled",
            FailureMode::Unavailable => "unavailable",
        }
    }
}

/// Error reported by an execution channel. Code and message are passed
/// through to callers untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("[{code}] {message}")]
pub struct RemoteExecutionError {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_state: Option<String>,
    pub message: String,
    pub failure: FailureMode,
}

impl RemoteExecutionError {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            sql_state: None,
            message: message.into(),
            failure: FailureMode::Rejected,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            code: "timeout".to_string(),
            sql_state: None,
            message: message.into(),
            failure: FailureMode::Timeout,
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self {
            code: "cancelled".to_string(),
            sql_state: None,
            message: message.into(),
            failure: FailureMode::Cancelled,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            code: "unavailable".to_string(),
            sql_state: None,
            message: message.into(),
            failure: FailureMode::Unavailable,
        }
    }

    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    /// Whether the remote side reported that the target object is missing.
    ///
    /// The remote reports a missing object and one the current role cannot
    /// see with the same `002003` error, so this cannot tell them apart.
    /// Explicit privilege failures are never treated as missing.
    pub fn is_object_missing(&self) -> bool {
        if self.failure != FailureMode::Rejected || self.code == INSUFFICIENT_PRIVILEGES {
            return false;
        }
        let message = self.message.to_ascii_lowercase();
        if message.contains("insufficient privileges") {
            return false;
        }
        self.code == OBJECT_DOES_NOT_EXIST || message.contains("does not exist")
    }
}

/// Runs finished statements against the remote platform.
#[async_trait]
pub trait ExecutionChannel: Send + Sync {
    async fn execute(&self, statement: &str) -> Result<Vec<Row>, RemoteExecutionError>;
}

/// A channel with no remote side. Every statement fails as unavailable.
///
/// Useful for building and inspecting statements offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisconnectedChannel;

#[async_trait]
impl ExecutionChannel for DisconnectedChannel {
    async fn execute(&self, _statement: &str) -> Result<Vec<Row>, RemoteExecutionError> {
        Err(RemoteExecutionError::unavailable(
            "no execution channel is connected",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_missing_detection() {
        assert!(RemoteExecutionError::rejected("002003", "SQL compilation error").is_object_missing());
        assert!(
            RemoteExecutionError::rejected("000000", "Warehouse 'X' does not exist.")
                .is_object_missing()
        );
        assert!(!RemoteExecutionError::rejected("002002", "already exists").is_object_missing());
        assert!(!RemoteExecutionError::timeout("does not exist").is_object_missing());
    }

    #[test]
    fn test_privilege_failure_is_not_missing() {
        assert!(
            !RemoteExecutionError::rejected(
                "003001",
                "Insufficient privileges to operate on warehouse 'WH1'"
            )
            .is_object_missing()
        );
        assert!(
            !RemoteExecutionError::rejected(
                "002003",
                "Insufficient privileges: schema 'S' does not exist or not authorized"
            )
            .is_object_missing()
        );
    }

    #[tokio::test]
    async fn test_disconnected_channel_is_unavailable() {
        let err = DisconnectedChannel.execute("SHOW WAREHOUSES").await.unwrap_err();
        assert_eq!(err.failure, FailureMode::Unavailable);
    }
}
