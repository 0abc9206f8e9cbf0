//! Statement permission seed.
//!
//! ```yaml
//! statement_permissions:
//!   allow_all: false
//!   catch_all: false
//!   kinds:
//!     - query: true
//!     - describe: true
//!     - mutation-delete: false
//! ```
//!
//! Each entry in `kinds` is a single-key map. Kind names must belong to the
//! closed set in [`StatementKind`]; an unknown name fails at load time.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::ConfigError;
use crate::statement::StatementKind;

/// Administrator-defined allow/deny table for free-form statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementPermissionsConfig {
    /// Allow every kind regardless of the entries below.
    #[serde(default)]
    pub allow_all: bool,

    /// Decision for kinds that have no entry.
    #[serde(default)]
    pub catch_all: bool,

    #[serde(default = "default_kinds")]
    pub kinds: Vec<BTreeMap<StatementKind, bool>>,
}

impl Default for StatementPermissionsConfig {
    fn default() -> Self {
        Self {
            allow_all: false,
            catch_all: false,
            kinds: default_kinds(),
        }
    }
}

fn default_kinds() -> Vec<BTreeMap<StatementKind, bool>> {
    vec![
        BTreeMap::from([(StatementKind::Query, true)]),
        BTreeMap::from([(StatementKind::Describe, true)]),
    ]
}

impl StatementPermissionsConfig {
    /// Flatten `kinds` into ordered `(kind, allowed)` pairs.
    ///
    /// Fails when an entry holds other than exactly one kind, or when a kind
    /// is listed twice.
    pub fn entries(&self) -> Result<Vec<(StatementKind, bool)>, ConfigError> {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.kinds.len());

        for (idx, entry) in self.kinds.iter().enumerate() {
            if entry.len() != 1 {
                return Err(ConfigError::Config(format!(
                    "statement_permissions.kinds[{}] must name exactly one kind, found {}",
                    idx,
                    entry.len()
                )));
            }
            for (kind, allowed) in entry {
                if !seen.insert(*kind) {
                    return Err(ConfigError::Config(format!(
                        "statement_permissions lists '{}' more than once",
                        kind
                    )));
                }
                entries.push((*kind, *allowed));
            }
        }

        Ok(entries)
    }
}
