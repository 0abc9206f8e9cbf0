//! Request types for list and drop operations.
//!
//! Create requests carry a free-form attribute map that is checked by the
//! [`AttributeValidator`](crate::validator::AttributeValidator); list and drop
//! requests have a fixed shape and are deserialized directly from tool
//! arguments.

use serde::{Deserialize, Serialize};

/// Filter for `list_objects`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    /// Case-preserving LIKE pattern (`%` and `_` wildcards).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like: Option<String>,

    /// Anchored name prefix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,

    /// Parent database to enumerate in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    /// Parent schema to enumerate in (requires `database`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Maximum number of results, applied last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// Identifier and safety flags for `drop_object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRequest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Argument types identifying a function or procedure overload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Vec<String>>,

    /// A missing object is success when set.
    #[serde(default = "default_if_exists")]
    pub if_exists: bool,

    /// Also drop contained objects.
    #[serde(default)]
    pub cascade: bool,
}

impl DropRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: None,
            schema: None,
            signature: None,
            if_exists: default_if_exists(),
            cascade: false,
        }
    }

    pub fn in_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn in_schema(mut self, database: impl Into<String>, schema: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self.schema = Some(schema.into());
        self
    }

    pub fn with_signature(mut self, signature: Vec<String>) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn if_exists(mut self, if_exists: bool) -> Self {
        self.if_exists = if_exists;
        self
    }

    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }
}

fn default_if_exists() -> bool {
    true
}
