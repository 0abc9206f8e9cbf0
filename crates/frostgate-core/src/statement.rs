//! Statement kinds shared by the classifier and the permission seed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse category a free-form command is classified into.
///
/// The set is closed: every classification result is one of these variants,
/// and every permission entry must name one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatementKind {
    /// SELECT, WITH ... SELECT, VALUES.
    Query,
    /// SHOW, DESCRIBE, EXPLAIN, LIST.
    Describe,
    MutationInsert,
    MutationUpdate,
    MutationDelete,
    MutationMerge,
    MutationTruncate,
    SchemaCreate,
    SchemaAlter,
    SchemaDrop,
    /// BEGIN, COMMIT, ROLLBACK, SAVEPOINT.
    TransactionControl,
    /// USE, SET, UNSET, ALTER SESSION.
    SessionControl,
    /// GRANT, REVOKE, CALL, COPY and other account-level commands.
    AdministrativeCommand,
    /// Empty text or text made only of comments.
    Comment,
    Unrecognized,
}

impl StatementKind {
    /// Every kind, in declaration order.
    pub const ALL: [StatementKind; 15] = [
        StatementKind::Query,
        StatementKind::Describe,
        StatementKind::MutationInsert,
        StatementKind::MutationUpdate,
        StatementKind::MutationDelete,
        StatementKind::MutationMerge,
        StatementKind::MutationTruncate,
        StatementKind::SchemaCreate,
        StatementKind::SchemaAlter,
        StatementKind::SchemaDrop,
        StatementKind::TransactionControl,
        StatementKind::SessionControl,
        StatementKind::AdministrativeCommand,
        StatementKind::Comment,
        StatementKind::Unrecognized,
    ];

    /// The configuration name of this kind (e.g. `mutation-delete`).
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Query => "query",
            StatementKind::Describe => "describe",
            StatementKind::MutationInsert => "mutation-insert",
            StatementKind::MutationUpdate => "mutation-update",
            StatementKind::MutationDelete => "mutation-delete",
            StatementKind::MutationMerge => "mutation-merge",
            StatementKind::MutationTruncate => "mutation-truncate",
            StatementKind::SchemaCreate => "schema-create",
            StatementKind::SchemaAlter => "schema-alter",
            StatementKind::SchemaDrop => "schema-drop",
            StatementKind::TransactionControl => "transaction-control",
            StatementKind::SessionControl => "session-control",
            StatementKind::AdministrativeCommand => "administrative-command",
            StatementKind::Comment => "comment",
            StatementKind::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a name does not match any statement kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown statement kind '{0}'")]
pub struct UnknownStatementKind(pub String);

impl FromStr for StatementKind {
    type Err = UnknownStatementKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        StatementKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownStatementKind(s.to_string()))
    }
}
