//! Success payloads returned by the object tools.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::channel::Row;

/// The three object operations, plus free-form execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    List,
    Drop,
    Execute,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Drop => "drop",
            Operation::Execute => "execute",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A created or listed object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectDescriptor {
    pub object_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Validated attributes for a created object, or the remote row for a
    /// listed one.
    pub attributes: Map<String, Value>,
}

impl ObjectDescriptor {
    /// Descriptor for an object that was just created from `attributes`.
    pub fn created(object_type: &str, attributes: Map<String, Value>) -> Self {
        let text = |key: &str| attributes.get(key).and_then(Value::as_str).map(String::from);
        Self {
            object_type: object_type.to_string(),
            name: text("name").unwrap_or_default(),
            database: text("database"),
            schema: text("schema"),
            attributes,
        }
    }

    /// Descriptor built from one row of a `SHOW` result.
    ///
    /// Column names are matched case-insensitively, so `name`, `NAME` and
    /// `"name"` all work.
    pub fn from_row(object_type: &str, row: Row) -> Self {
        let text = |key: &str| {
            row.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .and_then(|(_, v)| v.as_str())
                .map(String::from)
        };
        Self {
            object_type: object_type.to_string(),
            name: text("name").unwrap_or_default(),
            database: text("database_name"),
            schema: text("schema_name"),
            attributes: row,
        }
    }
}

/// Outcome of `drop_object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropConfirmation {
    pub object_type: String,
    /// Fully qualified name that was targeted.
    pub name: String,
    /// `false` when `if_exists` turned a missing object into a no-op.
    ///
    /// The remote answers "does not exist or not authorized" for both a
    /// missing object and one hidden from the current role, so `false` can
    /// also mean the role cannot see the object. Explicit privilege errors
    /// are still returned as remote failures.
    pub existed: bool,
    pub cascade: bool,
    pub statement: String,
}

/// A statement built without being executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStatement {
    pub object_type: String,
    pub operation: Operation,
    pub statement: String,
}
