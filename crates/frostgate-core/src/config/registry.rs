//! Registry seed documents.
//!
//! A registry seed describes resource types as data: their containment scope,
//! the attributes a create request may carry, cross-field rules, and how each
//! attribute is rendered into a statement.
//!
//! ```yaml
//! version: "1"
//! resource_types:
//!   - name: warehouse
//!     keyword: WAREHOUSE
//!     scope: standalone
//!     attributes:
//!       - name: name
//!         type: string
//!         required: true
//!         render: identity
//!       - name: size
//!         type: enum
//!         constraints:
//!           - kind: one_of
//!             values: [XSMALL, SMALL, MEDIUM]
//!         keyword: WAREHOUSE_SIZE
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::ConfigError;

const BUILTIN_CATALOG: &str = include_str!("../../catalog/builtin.yaml");

/// A registry seed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySeed {
    /// Seed format version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Resource types, in registration order.
    #[serde(default)]
    pub resource_types: Vec<ResourceTypeDefinition>,
}

impl RegistrySeed {
    /// Load a seed from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse a seed from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// The catalog shipped with Frostgate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }
}

fn default_version() -> String {
    "1".to_string()
}

/// Definition of one resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTypeDefinition {
    /// Type discriminator used by callers (e.g. `warehouse`).
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Object keyword used in statements (e.g. `WAREHOUSE`, `DATABASE ROLE`).
    pub keyword: String,

    /// Keyword used for enumeration. Defaults to `keyword` + `S`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,

    #[serde(default)]
    pub scope: Scope,

    #[serde(default)]
    pub manager: ManagerKind,

    /// Whether `DROP ... CASCADE` is accepted for this type.
    #[serde(default)]
    pub supports_cascade: bool,

    /// Names that may never be dropped (compared case-insensitively).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protected_names: Vec<String>,

    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CrossFieldRule>,
}

impl ResourceTypeDefinition {
    /// Keyword used by `SHOW`.
    pub fn plural_keyword(&self) -> String {
        self.plural
            .clone()
            .unwrap_or_else(|| format!("{}S", self.keyword))
    }
}

/// Where objects of a type live.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Scope {
    #[default]
    Standalone,
    NestedInDatabase,
    NestedInSchema,
}

impl Scope {
    /// Ancestor identifiers an object of this scope must name, outermost first.
    pub fn ancestors(&self) -> &'static [&'static str] {
        match self {
            Scope::Standalone => &[],
            Scope::NestedInDatabase => &["database"],
            Scope::NestedInSchema => &["database", "schema"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Standalone => "standalone",
            Scope::NestedInDatabase => "nested-in-database",
            Scope::NestedInSchema => "nested-in-schema",
        }
    }
}

/// Which manager builds statements for a type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ManagerKind {
    #[default]
    Generic,
    Table,
    View,
    Function,
    Procedure,
}

impl ManagerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerKind::Generic => "generic",
            ManagerKind::Table => "table",
            ManagerKind::View => "view",
            ManagerKind::Function => "function",
            ManagerKind::Procedure => "procedure",
        }
    }
}

/// Definition of one attribute of a resource type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: AttributeType,

    #[serde(default)]
    pub required: bool,

    /// Value used when the attribute is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<AttributeConstraint>,

    #[serde(default)]
    pub render: Rendering,

    /// Statement keyword for `property` and `modifier` rendering.
    /// Defaults to the upper-cased attribute name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
}

impl AttributeDefinition {
    pub fn render_keyword(&self) -> String {
        self.keyword
            .clone()
            .unwrap_or_else(|| self.name.to_ascii_uppercase())
    }

    /// Allowed values when the attribute carries a `one_of` constraint.
    pub fn allowed_values(&self) -> Option<&[String]> {
        self.constraints.iter().find_map(|c| match c {
            AttributeConstraint::OneOf { values } => Some(values.as_slice()),
            _ => None,
        })
    }
}

/// Semantic type of an attribute value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Enum,
    Integer,
    Boolean,
    ColumnList,
    /// Verbatim code or query text.
    Body,
    StringList,
}

impl AttributeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Enum => "enum",
            AttributeType::Integer => "integer",
            AttributeType::Boolean => "boolean",
            AttributeType::ColumnList => "column_list",
            AttributeType::Body => "body",
            AttributeType::StringList => "string_list",
        }
    }
}

/// Constraint on a single attribute value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeConstraint {
    /// Value must be one of these (case-insensitive, canonicalized).
    OneOf { values: Vec<String> },
    /// Inclusive integer range.
    Range {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    /// Value must fully match this regular expression.
    Pattern { regex: String },
    MaxLength { max: usize },
    /// Lists must carry at least this many items.
    MinItems { min: usize },
}

/// Rule relating two or more attributes of the same request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CrossFieldRule {
    /// When `attribute` is present (and not `false`), every attribute in
    /// `requires` must be present and not `false`.
    Requires {
        attribute: String,
        requires: Vec<String>,
    },
    /// When both are present, `lower` must not exceed `upper`.
    Ordered { lower: String, upper: String },
    /// When `when` equals `equals`, `attribute` must lie within the range.
    RangeWhen {
        attribute: String,
        when: String,
        equals: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
}

/// How an attribute contributes to a create statement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Rendering {
    /// `KEYWORD = value` after the object name.
    #[default]
    Property,
    /// The object's own name.
    Identity,
    /// Boolean word placed before the object keyword (e.g. `TRANSIENT`).
    Modifier,
    /// Boolean selecting `CREATE OR REPLACE`.
    OrReplace,
    /// Consumed by a specialized manager.
    Managed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let seed = RegistrySeed::builtin().unwrap();
        let names: Vec<&str> = seed.resource_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "database",
                "schema",
                "warehouse",
                "role",
                "database_role",
                "table",
                "view",
                "function",
                "procedure"
            ]
        );
    }

    #[test]
    fn test_builtin_catalog_declares_name_for_every_type() {
        let seed = RegistrySeed::builtin().unwrap();
        for def in &seed.resource_types {
            let name = def.attributes.iter().find(|a| a.name == "name");
            assert!(name.is_some(), "{} has no name attribute", def.name);
            assert!(name.unwrap().required, "{} name is optional", def.name);
        }
    }

    #[test]
    fn test_constraint_tagging() {
        let yaml = r#"
name: size
type: enum
constraints:
  - kind: one_of
    values: [SMALL, LARGE]
"#;
        let attr: AttributeDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(attr.kind, AttributeType::Enum);
        assert_eq!(attr.render, Rendering::Property);
        assert_eq!(attr.render_keyword(), "SIZE");
        assert_eq!(
            attr.allowed_values().unwrap(),
            &["SMALL".to_string(), "LARGE".to_string()]
        );
    }

    #[test]
    fn test_plural_keyword_defaults_to_keyword_with_s() {
        let yaml = r#"
name: warehouse
keyword: WAREHOUSE
"#;
        let def: ResourceTypeDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.plural_keyword(), "WAREHOUSES");
        assert_eq!(def.scope, Scope::Standalone);
        assert_eq!(def.manager, ManagerKind::Generic);
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let yaml = r#"
name: thing
keyword: THING
scope: nested-in-table
"#;
        assert!(serde_yaml::from_str::<ResourceTypeDefinition>(yaml).is_err());
    }

    #[test]
    fn test_scope_ancestors() {
        assert!(Scope::Standalone.ancestors().is_empty());
        assert_eq!(Scope::NestedInSchema.ancestors(), &["database", "schema"]);
    }
}
