//! Attribute validation.
//!
//! The `AttributeValidator` checks a caller's raw attribute map against a
//! [`ResourceSpec`] and produces a typed [`AttributeMap`]. Checks run in this
//! order and stop at the first violation:
//!
//! 1. **Unknown attributes** - names the spec does not declare
//! 2. **Ancestors** - `database` / `schema` identifiers required by the scope
//! 3. **Required attributes**
//! 4. **Coercion and constraints** - per attribute, in declaration order
//! 5. **Cross-field rules**
//!
//! JSON `null` counts as omitted. Declared defaults fill omitted attributes only.

use std::collections::HashSet;
use std::sync::LazyLock;

use frostgate_core::ListingConfig;
use frostgate_core::config::registry::{AttributeType, CrossFieldRule, ManagerKind};
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::request::{DropRequest, ListFilter};
use crate::spec::{ANCESTOR_ATTRIBUTES, AttributeSpec, Constraint, ResourceSpec};
use crate::value::{AttributeMap, AttributeValue, ColumnSpec};

/// Longest identifier accepted anywhere.
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Conservative data-type grammar: a type name with optional precision/scale.
pub const DATA_TYPE_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*(\s*\(\s*\d+(\s*,\s*\d+)?\s*\))?$";

static DATA_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATA_TYPE_PATTERN).expect("data type pattern compiles"));

/// Whether `s` is an acceptable column or argument data type.
pub fn is_valid_data_type(s: &str) -> bool {
    DATA_TYPE_RE.is_match(s.trim())
}

/// Check that `value` can be used as an object identifier.
///
/// Identifiers that are not plain words are quoted when rendered, so this only
/// rejects what cannot be quoted safely.
pub fn check_identifier(attribute: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid_identifier(
            attribute,
            "must not be empty",
        ));
    }
    if value.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(ValidationError::invalid_identifier(
            attribute,
            &format!("longer than {} characters", MAX_IDENTIFIER_LENGTH),
        ));
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::invalid_identifier(
            attribute,
            "contains control characters",
        ));
    }
    Ok(())
}

/// Coerce a raw JSON value to the attribute's declared type.
pub fn coerce_value(attr: &AttributeSpec, raw: &Value) -> Result<AttributeValue, ValidationError> {
    let name = attr.name.as_str();
    match attr.kind {
        AttributeType::String | AttributeType::Enum => match raw {
            Value::String(s) => Ok(AttributeValue::Text(s.trim().to_string())),
            other => Err(ValidationError::type_mismatch(name, "a string", other)),
        },
        AttributeType::Body => match raw {
            Value::String(s) if !s.trim().is_empty() => Ok(AttributeValue::Text(s.clone())),
            Value::String(_) => Err(ValidationError::type_mismatch(
                name,
                "a non-empty body",
                raw,
            )),
            other => Err(ValidationError::type_mismatch(name, "a string body", other)),
        },
        AttributeType::Integer => coerce_integer(name, raw).map(AttributeValue::Integer),
        AttributeType::Boolean => coerce_bool(name, raw).map(AttributeValue::Boolean),
        AttributeType::ColumnList => coerce_columns(name, raw).map(AttributeValue::Columns),
        AttributeType::StringList => coerce_string_list(name, raw).map(AttributeValue::List),
    }
}

/// Apply the attribute's constraints, returning the canonical value.
pub fn check_constraints(
    attr: &AttributeSpec,
    value: AttributeValue,
) -> Result<AttributeValue, ValidationError> {
    let name = attr.name.as_str();
    let mut value = value;

    for constraint in &attr.constraints {
        value = match (constraint, value) {
            (Constraint::OneOf(allowed), AttributeValue::Text(s)) => {
                match allowed.iter().find(|a| a.eq_ignore_ascii_case(&s)) {
                    Some(canonical) => AttributeValue::Text(canonical.clone()),
                    None => return Err(ValidationError::value_not_allowed(name, &s, allowed)),
                }
            }
            (Constraint::Range { min, max }, AttributeValue::Integer(n)) => {
                let below = min.is_some_and(|lo| n < lo);
                let above = max.is_some_and(|hi| n > hi);
                if below || above {
                    return Err(ValidationError::out_of_range(name, n, *min, *max));
                }
                AttributeValue::Integer(n)
            }
            (Constraint::Pattern { source, regex }, v) => {
                let ok = match &v {
                    AttributeValue::Text(s) => regex.is_match(s),
                    AttributeValue::List(items) => items.iter().all(|i| regex.is_match(i)),
                    _ => true,
                };
                if !ok {
                    return Err(ValidationError::pattern_mismatch(name, source));
                }
                v
            }
            (Constraint::MaxLength(max), v) => {
                let ok = match &v {
                    AttributeValue::Text(s) => s.chars().count() <= *max,
                    AttributeValue::List(items) => {
                        items.iter().all(|i| i.chars().count() <= *max)
                    }
                    _ => true,
                };
                if !ok {
                    return Err(ValidationError::too_long(name, *max));
                }
                v
            }
            (Constraint::MinItems(min), v) => {
                let len = match &v {
                    AttributeValue::Columns(c) => c.len(),
                    AttributeValue::List(l) => l.len(),
                    _ => *min,
                };
                if len < *min {
                    return Err(ValidationError::too_few_items(name, *min, len));
                }
                v
            }
            (_, v) => v,
        };
    }

    Ok(value)
}

fn coerce_integer(name: &str, raw: &Value) -> Result<i64, ValidationError> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| ValidationError::type_mismatch(name, "an integer", raw)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::type_mismatch(name, "an integer", raw)),
        other => Err(ValidationError::type_mismatch(name, "an integer", other)),
    }
}

fn coerce_bool(name: &str, raw: &Value) -> Result<bool, ValidationError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(false),
        other => Err(ValidationError::type_mismatch(name, "a boolean", other)),
    }
}

/// Lists may arrive as JSON arrays or as strings holding a JSON array.
fn list_items(name: &str, raw: &Value, expected: &str) -> Result<Vec<Value>, ValidationError> {
    match raw {
        Value::Array(items) => Ok(items.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => Ok(items),
            _ => Err(ValidationError::type_mismatch(name, expected, raw)),
        },
        other => Err(ValidationError::type_mismatch(name, expected, other)),
    }
}

fn coerce_columns(name: &str, raw: &Value) -> Result<Vec<ColumnSpec>, ValidationError> {
    let items = list_items(name, raw, "a list of column definitions")?;
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(items.len());

    for (idx, item) in items.iter().enumerate() {
        let Value::Object(obj) = item else {
            return Err(ValidationError::invalid_column(
                name,
                idx,
                "each column must be an object with 'name' and 'type'",
            ));
        };

        if let Some(key) = obj
            .keys()
            .find(|k| !matches!(k.as_str(), "name" | "type" | "nullable" | "comment"))
        {
            return Err(ValidationError::invalid_column(
                name,
                idx,
                &format!("unknown column field '{}'", key),
            ));
        }

        let column_name = match obj.get("name") {
            Some(Value::String(s)) => s.trim().to_string(),
            _ => {
                return Err(ValidationError::invalid_column(
                    name,
                    idx,
                    "'name' is required and must be a string",
                ));
            }
        };
        check_identifier(name, &column_name)
            .map_err(|e| ValidationError::invalid_column(name, idx, &e.message))?;

        if !seen.insert(column_name.to_ascii_uppercase()) {
            return Err(ValidationError::invalid_column(
                name,
                idx,
                &format!("column '{}' is declared more than once", column_name),
            ));
        }

        let data_type = match obj.get("type") {
            Some(Value::String(s)) if is_valid_data_type(s) => s.trim().to_string(),
            Some(Value::String(s)) => {
                return Err(ValidationError::invalid_column(
                    name,
                    idx,
                    &format!("'{}' is not a valid data type", s),
                ));
            }
            _ => {
                return Err(ValidationError::invalid_column(
                    name,
                    idx,
                    "'type' is required and must be a string",
                ));
            }
        };

        let nullable = match obj.get("nullable") {
            None | Some(Value::Null) => true,
            Some(v) => coerce_bool(name, v)
                .map_err(|_| ValidationError::invalid_column(name, idx, "'nullable' must be a boolean"))?,
        };

        let comment = match obj.get("comment") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(ValidationError::invalid_column(
                    name,
                    idx,
                    "'comment' must be a string",
                ));
            }
        };

        columns.push(ColumnSpec {
            name: column_name,
            data_type,
            nullable,
            comment,
        });
    }

    Ok(columns)
}

fn coerce_string_list(name: &str, raw: &Value) -> Result<Vec<String>, ValidationError> {
    let items = list_items(name, raw, "a list of strings")?;
    items
        .iter()
        .map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            other => Err(ValidationError::type_mismatch(
                name,
                "a list of non-empty strings",
                other,
            )),
        })
        .collect()
}

/// Validates requests for one resource type.
pub struct AttributeValidator<'a> {
    spec: &'a ResourceSpec,
}

impl<'a> AttributeValidator<'a> {
    /// Create a new validator for a spec.
    pub fn new(spec: &'a ResourceSpec) -> Self {
        Self { spec }
    }

    /// Validate create attributes.
    pub fn validate(&self, raw: &Value) -> Result<AttributeMap, ValidationError> {
        let spec = self.spec;
        let Value::Object(obj) = raw else {
            return Err(ValidationError::not_an_object(&spec.name));
        };

        // 1. Unknown attributes
        self.check_unknown(obj)?;

        let mut attrs = AttributeMap::new();

        // 2. Ancestor identifiers
        for ancestor in spec.ancestors() {
            match present(obj, ancestor) {
                Some(Value::String(s)) => {
                    check_identifier(ancestor, s)?;
                    attrs.insert(*ancestor, AttributeValue::Text(s.trim().to_string()));
                }
                Some(other) => {
                    return Err(ValidationError::type_mismatch(ancestor, "a string", other));
                }
                None => return Err(ValidationError::missing_ancestor(&spec.name, ancestor)),
            }
        }

        // 3. Required attributes
        for attr in &spec.attributes {
            if attr.required && attr.default.is_none() && present(obj, &attr.name).is_none() {
                return Err(ValidationError::required_attribute_missing(
                    &spec.name, &attr.name,
                ));
            }
        }

        // 4. Coercion and constraints
        for attr in &spec.attributes {
            let value = match present(obj, &attr.name) {
                Some(raw) => check_constraints(attr, coerce_value(attr, raw)?)?,
                None => match &attr.default {
                    Some(default) => default.clone(),
                    None => continue,
                },
            };
            if attr.name == "name" {
                if let AttributeValue::Text(s) = &value {
                    check_identifier("name", s)?;
                }
            }
            attrs.insert(attr.name.clone(), value);
        }

        // 5. Cross-field rules
        for rule in &spec.rules {
            check_rule(rule, &attrs)?;
        }

        tracing::debug!(
            object_type = %spec.name,
            attributes = attrs.len(),
            "Attributes validated"
        );

        Ok(attrs)
    }

    /// Validate a list filter, resolving the limit against `listing`.
    pub fn validate_list(
        &self,
        filter: &ListFilter,
        listing: &ListingConfig,
    ) -> Result<ListFilter, ValidationError> {
        let database = non_empty(&filter.database);
        let schema = non_empty(&filter.schema);

        if let Some(db) = &database {
            self.check_scope_identifier("database", db)?;
        }
        if let Some(s) = &schema {
            self.check_scope_identifier("schema", s)?;
            if database.is_none() {
                return Err(ValidationError::invalid_request(
                    "schema",
                    "a schema filter also needs 'database'",
                ));
            }
        }

        let limit = filter.limit.unwrap_or(listing.default_limit);
        if limit == 0 || limit > listing.max_limit {
            return Err(ValidationError::out_of_range(
                "limit",
                i64::try_from(limit).unwrap_or(i64::MAX),
                Some(1),
                i64::try_from(listing.max_limit).ok(),
            ));
        }

        Ok(ListFilter {
            like: non_empty(&filter.like),
            starts_with: non_empty(&filter.starts_with),
            database,
            schema,
            limit: Some(limit),
        })
    }

    /// Validate a drop request.
    ///
    /// Protection of system-critical names is not checked here; it is a
    /// refusal, not a validation failure, and callers check it first.
    pub fn validate_drop(&self, request: &DropRequest) -> Result<(), ValidationError> {
        let spec = self.spec;
        check_identifier("name", &request.name)?;

        for (key, value) in [("database", &request.database), ("schema", &request.schema)] {
            if let Some(v) = non_empty(value) {
                self.check_scope_identifier(key, &v)?;
            }
        }
        for ancestor in spec.ancestors() {
            let given = match *ancestor {
                "database" => &request.database,
                _ => &request.schema,
            };
            if non_empty(given).is_none() {
                return Err(ValidationError::missing_ancestor(&spec.name, ancestor));
            }
        }

        if request.cascade && !spec.supports_cascade {
            return Err(ValidationError::cascade_unsupported(&spec.name));
        }

        if let Some(signature) = &request.signature {
            if !matches!(spec.manager, ManagerKind::Function | ManagerKind::Procedure) {
                return Err(ValidationError::invalid_request(
                    "signature",
                    format!("'{}' does not take an argument signature", spec.name),
                ));
            }
            if let Some(bad) = signature.iter().find(|t| !is_valid_data_type(t)) {
                return Err(ValidationError::invalid_request(
                    "signature",
                    format!("'{}' is not a valid data type", bad),
                ));
            }
        }

        Ok(())
    }

    fn check_unknown(&self, obj: &Map<String, Value>) -> Result<(), ValidationError> {
        let spec = self.spec;
        for key in obj.keys() {
            if spec.attribute(key).is_some() || spec.ancestors().contains(&key.as_str()) {
                continue;
            }
            if ANCESTOR_ATTRIBUTES.contains(&key.as_str()) {
                return Err(ValidationError::unexpected_scope(
                    &spec.name,
                    key,
                    spec.scope.as_str(),
                ));
            }
            return Err(ValidationError::unknown_attribute(
                &spec.name,
                key,
                &spec.attribute_names(),
            ));
        }
        Ok(())
    }

    fn check_scope_identifier(&self, key: &str, value: &str) -> Result<(), ValidationError> {
        if !self.spec.ancestors().contains(&key) {
            return Err(ValidationError::unexpected_scope(
                &self.spec.name,
                key,
                self.spec.scope.as_str(),
            ));
        }
        check_identifier(key, value)
    }
}

/// Value of `key` unless absent or `null`.
fn present<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn check_rule(rule: &CrossFieldRule, attrs: &AttributeMap) -> Result<(), ValidationError> {
    match rule {
        CrossFieldRule::Requires {
            attribute,
            requires,
        } => {
            let active = attrs.get(attribute).is_some_and(AttributeValue::is_set);
            if active {
                if let Some(missing) = requires
                    .iter()
                    .find(|r| !attrs.get(r).is_some_and(AttributeValue::is_set))
                {
                    return Err(ValidationError::rule_violation(
                        attribute,
                        format!(
                            "Attribute '{}' requires '{}' to be set",
                            attribute, missing
                        ),
                    ));
                }
            }
        }
        CrossFieldRule::Ordered { lower, upper } => {
            if let (Some(lo), Some(hi)) = (attrs.get_i64(lower), attrs.get_i64(upper)) {
                if lo > hi {
                    return Err(ValidationError::rule_violation(
                        lower,
                        format!(
                            "Attribute '{}' ({}) must not exceed '{}' ({})",
                            lower, lo, upper, hi
                        ),
                    ));
                }
            }
        }
        CrossFieldRule::RangeWhen {
            attribute,
            when,
            equals,
            min,
            max,
        } => {
            let condition = attrs.get(when).is_some_and(|v| &v.to_json() == equals);
            if let (true, Some(n)) = (condition, attrs.get_i64(attribute)) {
                let below = min.is_some_and(|lo| n < lo);
                let above = max.is_some_and(|hi| n > hi);
                if below || above {
                    let bound = match (min, max) {
                        (Some(lo), Some(hi)) => format!("between {} and {}", lo, hi),
                        (Some(lo), None) => format!("at least {}", lo),
                        (None, Some(hi)) => format!("at most {}", hi),
                        (None, None) => String::new(),
                    };
                    return Err(ValidationError::rule_violation(
                        attribute,
                        format!(
                            "Attribute '{}' must be {} when '{}' is {}",
                            attribute, bound, when, equals
                        ),
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrorKind;
    use crate::registry::RegistryBuilder;
    use frostgate_core::config::registry::ResourceTypeDefinition;
    use serde_json::json;

    fn spec(yaml: &str) -> ResourceSpec {
        let def: ResourceTypeDefinition = serde_yaml::from_str(yaml).unwrap();
        ResourceSpec::from_definition(&def).unwrap()
    }

    fn builtin(name: &str) -> ResourceSpec {
        RegistryBuilder::with_builtin()
            .unwrap()
            .build()
            .lookup(name)
            .unwrap()
            .clone()
    }

    fn small_warehouse() -> ResourceSpec {
        spec(
            r#"
name: warehouse
keyword: WAREHOUSE
attributes:
  - name: name
    type: string
    required: true
    render: identity
  - name: size
    type: enum
    required: true
    constraints:
      - kind: one_of
        values: [XS, S, M, L]
"#,
        )
    }

    #[test]
    fn test_missing_required_attribute_is_named() {
        let spec = small_warehouse();
        let err = AttributeValidator::new(&spec)
            .validate(&json!({"name": "wh1"}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::RequiredAttributeMissing);
        assert_eq!(err.attribute.as_deref(), Some("size"));
    }

    #[test]
    fn test_enum_is_case_insensitive_and_canonicalized() {
        let spec = small_warehouse();
        let attrs = AttributeValidator::new(&spec)
            .validate(&json!({"name": "wh1", "size": "m"}))
            .unwrap();
        assert_eq!(attrs.get_str("size"), Some("M"));
    }

    #[test]
    fn test_enum_rejects_value_outside_set() {
        let spec = small_warehouse();
        let err = AttributeValidator::new(&spec)
            .validate(&json!({"name": "wh1", "size": "XXL"}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::ValueNotAllowed);
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let spec = small_warehouse();
        let err = AttributeValidator::new(&spec)
            .validate(&json!({"name": "wh1", "size": "S", "grant_to": "PUBLIC"}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownAttribute);
        assert_eq!(err.attribute.as_deref(), Some("grant_to"));
    }

    #[test]
    fn test_unknown_attribute_rejected_before_missing_required() {
        let spec = small_warehouse();
        let err = AttributeValidator::new(&spec)
            .validate(&json!({"bogus": 1}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownAttribute);
    }

    #[test]
    fn test_null_counts_as_omitted() {
        let spec = small_warehouse();
        let err = AttributeValidator::new(&spec)
            .validate(&json!({"name": "wh1", "size": null}))
            .unwrap_err();
        assert_eq!(err.attribute.as_deref(), Some("size"));
    }

    #[test]
    fn test_every_builtin_type_accepts_its_required_attributes() {
        let registry = RegistryBuilder::with_builtin().unwrap().build();
        for spec in registry.iter() {
            let mut raw = Map::new();
            for ancestor in spec.ancestors() {
                raw.insert(ancestor.to_string(), json!("PARENT"));
            }
            for attr in spec.attributes.iter().filter(|a| a.required) {
                let value = match attr.kind {
                    AttributeType::ColumnList => json!([{"name": "ID", "type": "NUMBER"}]),
                    AttributeType::Body => json!("SELECT 1"),
                    AttributeType::Integer => json!(1),
                    AttributeType::Boolean => json!(true),
                    AttributeType::StringList => json!(["A"]),
                    AttributeType::Enum => json!(attr.allowed_values().unwrap()[0]),
                    AttributeType::String => json!("OBJ"),
                };
                raw.insert(attr.name.clone(), value);
            }
            let raw = Value::Object(raw);
            let validator = AttributeValidator::new(spec);
            assert!(validator.validate(&raw).is_ok(), "{} rejected", spec.name);

            for attr in spec.attributes.iter().filter(|a| a.required) {
                let mut partial = raw.clone();
                partial.as_object_mut().unwrap().remove(&attr.name);
                let err = validator.validate(&partial).unwrap_err();
                assert_eq!(err.attribute.as_deref(), Some(attr.name.as_str()));
            }
        }
    }

    #[test]
    fn test_missing_ancestor_is_reported() {
        let spec = builtin("table");
        let err = AttributeValidator::new(&spec)
            .validate(&json!({
                "name": "orders",
                "database": "SALES",
                "columns": [{"name": "id", "type": "NUMBER"}]
            }))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingAncestor);
        assert_eq!(err.attribute.as_deref(), Some("schema"));
    }

    #[test]
    fn test_ancestor_not_accepted_for_standalone_type() {
        let spec = builtin("warehouse");
        let err = AttributeValidator::new(&spec)
            .validate(&json!({"name": "wh1", "database": "SALES"}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownAttribute);
    }

    #[test]
    fn test_integer_accepts_numeric_strings_and_checks_range() {
        let spec = builtin("warehouse");
        let validator = AttributeValidator::new(&spec);
        let attrs = validator
            .validate(&json!({"name": "wh1", "auto_suspend": "120"}))
            .unwrap();
        assert_eq!(attrs.get_i64("auto_suspend"), Some(120));

        let err = validator
            .validate(&json!({"name": "wh1", "auto_suspend": 5}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
        assert_eq!(err.attribute.as_deref(), Some("auto_suspend"));
    }

    #[test]
    fn test_defaults_fill_omitted_only() {
        let spec = builtin("database");
        let validator = AttributeValidator::new(&spec);
        let attrs = validator.validate(&json!({"name": "DB1"})).unwrap();
        assert!(!attrs.flag("transient"));
        assert!(attrs.contains("transient"));

        let attrs = validator
            .validate(&json!({"name": "DB1", "transient": "true"}))
            .unwrap();
        assert!(attrs.flag("transient"));
    }

    #[test]
    fn test_transient_retention_rule() {
        let spec = builtin("database");
        let validator = AttributeValidator::new(&spec);
        let err = validator
            .validate(&json!({"name": "DB1", "transient": true, "data_retention_time_in_days": 7}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::RuleViolation);
        assert_eq!(err.attribute.as_deref(), Some("data_retention_time_in_days"));

        assert!(
            validator
                .validate(&json!({"name": "DB1", "data_retention_time_in_days": 7}))
                .is_ok()
        );
    }

    #[test]
    fn test_cluster_counts_must_be_ordered() {
        let spec = builtin("warehouse");
        let err = AttributeValidator::new(&spec)
            .validate(&json!({"name": "wh1", "min_cluster_count": 4, "max_cluster_count": 2}))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::RuleViolation);
    }

    #[test]
    fn test_scale_factor_requires_acceleration() {
        let spec = builtin("warehouse");
        let validator = AttributeValidator::new(&spec);
        let err = validator
            .validate(&json!({"name": "wh1", "query_acceleration_max_scale_factor": 8}))
            .unwrap_err();
        assert_eq!(err.attribute.as_deref(), Some("query_acceleration_max_scale_factor"));

        assert!(
            validator
                .validate(&json!({
                    "name": "wh1",
                    "enable_query_acceleration": true,
                    "query_acceleration_max_scale_factor": 8
                }))
                .is_ok()
        );
    }

    #[test]
    fn test_columns_accept_json_string() {
        let spec = builtin("table");
        let attrs = AttributeValidator::new(&spec)
            .validate(&json!({
                "name": "orders",
                "database": "SALES",
                "schema": "PUBLIC",
                "columns": "[{\"name\": \"id\", \"type\": \"NUMBER(38,0)\", \"nullable\": false}]"
            }))
            .unwrap();
        let columns = attrs.columns("columns").unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].data_type, "NUMBER(38,0)");
        assert!(!columns[0].nullable);
    }

    #[test]
    fn test_columns_reject_bad_types_and_empty_lists() {
        let spec = builtin("table");
        let validator = AttributeValidator::new(&spec);
        let base = json!({"name": "orders", "database": "SALES", "schema": "PUBLIC"});

        let mut bad_type = base.clone();
        bad_type["columns"] = json!([{"name": "id", "type": "NUMBER); DROP TABLE x; --"}]);
        let err = validator.validate(&bad_type).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidColumn);

        let mut empty = base.clone();
        empty["columns"] = json!([]);
        let err = validator.validate(&empty).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::TooFewItems);

        let mut dup = base;
        dup["columns"] = json!([{"name": "id", "type": "NUMBER"}, {"name": "ID", "type": "TEXT"}]);
        let err = validator.validate(&dup).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidColumn);
    }

    #[test]
    fn test_list_limit_defaults_and_caps() {
        let spec = builtin("warehouse");
        let validator = AttributeValidator::new(&spec);
        let listing = ListingConfig::default();

        let filter = validator.validate_list(&ListFilter::default(), &listing).unwrap();
        assert_eq!(filter.limit, Some(100));

        let too_many = ListFilter {
            limit: Some(10_001),
            ..Default::default()
        };
        let err = validator.validate_list(&too_many, &listing).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::OutOfRange);
    }

    #[test]
    fn test_list_schema_filter_rules() {
        let listing = ListingConfig::default();
        let warehouse = builtin("warehouse");
        let err = AttributeValidator::new(&warehouse)
            .validate_list(
                &ListFilter {
                    database: Some("SALES".into()),
                    ..Default::default()
                },
                &listing,
            )
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::UnknownAttribute);

        let table = builtin("table");
        let err = AttributeValidator::new(&table)
            .validate_list(
                &ListFilter {
                    schema: Some("PUBLIC".into()),
                    ..Default::default()
                },
                &listing,
            )
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidRequest);
    }

    #[test]
    fn test_drop_rules() {
        let warehouse = builtin("warehouse");
        let validator = AttributeValidator::new(&warehouse);
        let err = validator
            .validate_drop(&DropRequest::new("wh1").cascade(true))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidRequest);
        assert_eq!(err.attribute.as_deref(), Some("cascade"));

        let schema = builtin("schema");
        let err = AttributeValidator::new(&schema)
            .validate_drop(&DropRequest::new("S1"))
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::MissingAncestor);

        assert!(
            AttributeValidator::new(&schema)
                .validate_drop(&DropRequest::new("S1").in_database("DB").cascade(true))
                .is_ok()
        );
    }

    #[test]
    fn test_data_type_grammar() {
        assert!(is_valid_data_type("VARCHAR"));
        assert!(is_valid_data_type("NUMBER(10, 2)"));
        assert!(is_valid_data_type("timestamp_ntz"));
        assert!(!is_valid_data_type("VARCHAR(10) NOT NULL"));
        assert!(!is_valid_data_type("1NUMBER"));
        assert!(!is_valid_data_type(""));
    }
}
