//! Error types for the SQL crate.

use frostgate_core::StatementKind;
use thiserror::Error;

/// Errors produced by the permission gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// A statement of a disallowed kind was submitted.
    #[error("statement kind '{kind}' is not permitted")]
    PermissionDenied {
        kind: StatementKind,
        /// Position of the denied statement within the submitted batch.
        statement_index: usize,
    },

    /// The permission seed could not be turned into a table.
    #[error("invalid statement permissions: {0}")]
    InvalidPermissions(#[from] frostgate_core::ConfigError),
}

impl GateError {
    /// The denied kind, if this is a denial.
    pub fn denied_kind(&self) -> Option<StatementKind> {
        match self {
            GateError::PermissionDenied { kind, .. } => Some(*kind),
            GateError::InvalidPermissions(_) => None,
        }
    }
}
