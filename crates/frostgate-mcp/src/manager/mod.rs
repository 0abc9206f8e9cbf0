//! Statement builders for resource types.
//!
//! Every resource type names a [`ManagerKind`]. The matching
//! [`ObjectManager`] turns validated requests into statement text. The
//! default methods of the trait implement the generic templates:
//!
//! | Operation | Template |
//! |-----------|----------|
//! | create | `CREATE [OR REPLACE] [modifiers] KEYWORD name [PROPERTY = value ...]` |
//! | list | `SHOW PLURAL [LIKE ..] [IN DATABASE ..\|IN SCHEMA ..] [STARTS WITH ..] [LIMIT n]` |
//! | drop | `DROP KEYWORD [IF EXISTS] name [CASCADE]` |
//!
//! Types with bespoke construction (tables, views, routines) override only
//! what differs.

mod routine;
mod table;
mod view;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use frostgate_core::{ManagerKind, Rendering};
use frostgate_policy::{
    AttributeMap, AttributeValue, DropRequest, ListFilter, ResourceRegistry, ResourceSpec,
    ValidationError,
};
use frostgate_sql::StatementClassifier;
use frostgate_sql::render::{qualified_name, quote_identifier, string_list_literal, string_literal};

use crate::error::ObjectError;

pub use routine::RoutineManager;
pub use table::TableManager;
pub use view::ViewManager;

/// Builds create, list and drop statements for one family of types.
///
/// Inputs are already validated against the type's spec. Managers add the
/// checks that only make sense for their family.
pub trait ObjectManager: Send + Sync {
    /// The manager identifier this implementation answers to.
    fn kind(&self) -> ManagerKind;

    fn build_create(
        &self,
        spec: &ResourceSpec,
        attrs: &AttributeMap,
    ) -> Result<String, ValidationError> {
        let mut sql = create_head(spec, attrs);
        for property in render_properties(spec, attrs) {
            sql.push(' ');
            sql.push_str(&property);
        }
        Ok(sql)
    }

    fn build_list(&self, spec: &ResourceSpec, filter: &ListFilter) -> Result<String, ValidationError> {
        Ok(list_statement(spec, filter))
    }

    fn build_drop(
        &self,
        spec: &ResourceSpec,
        request: &DropRequest,
    ) -> Result<String, ValidationError> {
        Ok(drop_statement(spec, request, &drop_target(spec, request)))
    }
}

/// Manager for types with no special construction needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericManager;

impl ObjectManager for GenericManager {
    fn kind(&self) -> ManagerKind {
        ManagerKind::Generic
    }
}

// =============================================================================
// Template pieces
// =============================================================================

/// Qualified name of the object described by `attrs`.
pub fn object_name(spec: &ResourceSpec, attrs: &AttributeMap) -> String {
    let mut parts: Vec<&str> = spec
        .ancestors()
        .iter()
        .filter_map(|a| attrs.get_str(a))
        .collect();
    parts.push(attrs.get_str("name").unwrap_or_default());
    qualified_name(&parts)
}

/// `CREATE [OR REPLACE] [modifiers] KEYWORD name`.
pub fn create_head(spec: &ResourceSpec, attrs: &AttributeMap) -> String {
    let mut words = vec!["CREATE".to_string()];
    let or_replace = spec
        .attributes
        .iter()
        .any(|a| a.render == Rendering::OrReplace && attrs.flag(&a.name));
    if or_replace {
        words.push("OR REPLACE".to_string());
    }
    for attr in &spec.attributes {
        if attr.render == Rendering::Modifier && attrs.flag(&attr.name) {
            words.push(attr.keyword.clone());
        }
    }
    words.push(spec.keyword.clone());
    words.push(object_name(spec, attrs));
    words.join(" ")
}

/// `KEYWORD = value` for every set `property` attribute, in declaration order.
pub fn render_properties(spec: &ResourceSpec, attrs: &AttributeMap) -> Vec<String> {
    spec.attributes
        .iter()
        .filter(|a| a.render == Rendering::Property)
        .filter_map(|a| {
            let value = render_value(attrs.get(&a.name)?)?;
            Some(format!("{} = {}", a.keyword, value))
        })
        .collect()
}

/// Literal form of a scalar or list value. Column lists have no literal form.
pub fn render_value(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Text(s) => Some(string_literal(s)),
        AttributeValue::Integer(n) => Some(n.to_string()),
        AttributeValue::Boolean(b) => Some(if *b { "TRUE" } else { "FALSE" }.to_string()),
        AttributeValue::List(items) => Some(string_list_literal(items)),
        AttributeValue::Columns(_) => None,
    }
}

/// `SHOW` statement for a validated filter. `LIMIT` is always last.
pub fn list_statement(spec: &ResourceSpec, filter: &ListFilter) -> String {
    let mut sql = format!("SHOW {}", spec.plural);
    if let Some(like) = &filter.like {
        sql.push_str(&format!(" LIKE {}", string_literal(like)));
    }
    match (&filter.database, &filter.schema) {
        (Some(database), Some(schema)) => {
            sql.push_str(&format!(" IN SCHEMA {}", qualified_name(&[database, schema])));
        }
        (Some(database), None) => {
            sql.push_str(&format!(" IN DATABASE {}", quote_identifier(database)));
        }
        _ => {}
    }
    if let Some(prefix) = &filter.starts_with {
        sql.push_str(&format!(" STARTS WITH {}", string_literal(prefix)));
    }
    if let Some(limit) = filter.limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    sql
}

/// Qualified name targeted by a drop request.
pub fn drop_target(spec: &ResourceSpec, request: &DropRequest) -> String {
    let mut parts: Vec<&str> = spec
        .ancestors()
        .iter()
        .filter_map(|a| match *a {
            "database" => request.database.as_deref(),
            _ => request.schema.as_deref(),
        })
        .map(str::trim)
        .collect();
    parts.push(request.name.trim());
    qualified_name(&parts)
}

/// `DROP KEYWORD [IF EXISTS] target [CASCADE]`.
pub fn drop_statement(spec: &ResourceSpec, request: &DropRequest, target: &str) -> String {
    let mut sql = format!("DROP {}", spec.keyword);
    if request.if_exists {
        sql.push_str(" IF EXISTS");
    }
    sql.push(' ');
    sql.push_str(target);
    if request.cascade {
        sql.push_str(" CASCADE");
    }
    sql
}

// =============================================================================
// Manager set
// =============================================================================

/// Managers keyed by identifier, shared read-only after construction.
#[derive(Clone, Default)]
pub struct ManagerSet {
    managers: HashMap<ManagerKind, Arc<dyn ObjectManager>>,
}

impl ManagerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The managers for every built-in identifier.
    ///
    /// `classifier` checks view queries.
    pub fn standard(classifier: StatementClassifier) -> Self {
        let mut set = Self::new();
        set.register(Arc::new(GenericManager));
        set.register(Arc::new(TableManager));
        set.register(Arc::new(ViewManager::new(classifier)));
        set.register(Arc::new(RoutineManager::function()));
        set.register(Arc::new(RoutineManager::procedure()));
        set
    }

    /// Add a manager, replacing any earlier one for the same identifier.
    pub fn register(&mut self, manager: Arc<dyn ObjectManager>) -> Option<Arc<dyn ObjectManager>> {
        self.managers.insert(manager.kind(), manager)
    }

    pub fn get(&self, kind: ManagerKind) -> Option<&dyn ObjectManager> {
        self.managers.get(&kind).map(|m| m.as_ref())
    }

    /// Every registered type must have a manager.
    pub fn check_coverage(&self, registry: &ResourceRegistry) -> Result<(), ObjectError> {
        for spec in registry.iter() {
            if !self.managers.contains_key(&spec.manager) {
                return Err(ObjectError::ConfigurationFault(format!(
                    "resource type '{}' uses manager '{}', which is not registered",
                    spec.name,
                    spec.manager.as_str()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ManagerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.managers.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("ManagerSet").field("managers", &kinds).finish()
    }
}
