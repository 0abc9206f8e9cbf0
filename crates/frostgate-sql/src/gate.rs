//! Statement permission table and gate.
//!
//! The gate is the only path by which free-form text may reach the
//! execution channel. It is a pure decision function: no I/O, no state.

use std::collections::HashMap;

use frostgate_core::{StatementKind, StatementPermissionsConfig};
use serde::Serialize;

use crate::classifier::StatementClassifier;
use crate::error::GateError;

/// Immutable allow/deny table for statement kinds.
#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    allow_all: bool,
    catch_all: bool,
    entries: HashMap<StatementKind, bool>,
}

impl PermissionTable {
    /// A table with no entries that resolves every kind to `catch_all`.
    pub fn new(catch_all: bool) -> Self {
        Self {
            allow_all: false,
            catch_all,
            entries: HashMap::new(),
        }
    }

    /// Build from the configuration seed.
    pub fn from_config(config: &StatementPermissionsConfig) -> Result<Self, GateError> {
        Ok(Self {
            allow_all: config.allow_all,
            catch_all: config.catch_all,
            entries: config.entries()?.into_iter().collect(),
        })
    }

    /// Set the decision for one kind.
    pub fn with(mut self, kind: StatementKind, allowed: bool) -> Self {
        self.entries.insert(kind, allowed);
        self
    }

    /// Set the blanket-allow override.
    pub fn with_allow_all(mut self, allow_all: bool) -> Self {
        self.allow_all = allow_all;
        self
    }

    pub fn catch_all(&self) -> bool {
        self.catch_all
    }

    pub fn allows_all(&self) -> bool {
        self.allow_all
    }

    /// Resolve a kind against this table.
    pub fn authorize(&self, kind: StatementKind) -> Decision {
        authorize(kind, self)
    }
}

/// Which part of the table produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    AllowAll,
    Entry,
    CatchAll,
}

/// Outcome of authorizing one statement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub kind: StatementKind,
    pub allowed: bool,
    pub source: DecisionSource,
}

/// Resolve `kind`: blanket allow first, then the kind's entry, then the
/// catch-all.
pub fn authorize(kind: StatementKind, table: &PermissionTable) -> Decision {
    if table.allow_all {
        return Decision {
            kind,
            allowed: true,
            source: DecisionSource::AllowAll,
        };
    }
    match table.entries.get(&kind) {
        Some(&allowed) => Decision {
            kind,
            allowed,
            source: DecisionSource::Entry,
        },
        None => Decision {
            kind,
            allowed: table.catch_all,
            source: DecisionSource::CatchAll,
        },
    }
}

/// Classify `text` and check every statement against `table`.
///
/// Returns the text unchanged when all statements are allowed; otherwise
/// `PermissionDenied` naming the first denied kind.
pub fn gate<'t>(
    text: &'t str,
    classifier: &StatementClassifier,
    table: &PermissionTable,
) -> Result<&'t str, GateError> {
    for (idx, kind) in classifier.classify_all(text).into_iter().enumerate() {
        let decision = authorize(kind, table);
        if !decision.allowed {
            tracing::warn!(
                kind = %kind,
                statement_index = idx,
                source = ?decision.source,
                "Statement denied by permission table"
            );
            return Err(GateError::PermissionDenied {
                kind,
                statement_index: idx,
            });
        }
    }
    Ok(text)
}

/// A classifier and permission table bundled for repeated use.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    classifier: StatementClassifier,
    table: PermissionTable,
}

impl PermissionGate {
    pub fn new(classifier: StatementClassifier, table: PermissionTable) -> Self {
        Self { classifier, table }
    }

    /// See [`gate`].
    pub fn check<'t>(&self, text: &'t str) -> Result<&'t str, GateError> {
        gate(text, &self.classifier, &self.table)
    }

    /// Decisions for every statement in `text`, without stopping at a denial.
    pub fn explain(&self, text: &str) -> Vec<Decision> {
        self.classifier
            .classify_all(text)
            .into_iter()
            .map(|kind| authorize(kind, &self.table))
            .collect()
    }
}
