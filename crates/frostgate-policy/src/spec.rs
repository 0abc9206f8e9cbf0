//! Compiled resource specifications.
//!
//! A [`ResourceSpec`] is built once from a [`ResourceTypeDefinition`] seed
//! entry. Building checks the definition's own consistency (unique attribute
//! names, a required `name`, constraints that fit their attribute type, rules
//! that reference declared attributes) and types every declared default, so a
//! malformed seed fails at startup rather than on the first request.

use std::collections::HashSet;

use frostgate_core::config::registry::{
    AttributeConstraint, AttributeType, CrossFieldRule, ManagerKind, Rendering,
    ResourceTypeDefinition, Scope,
};
use regex::Regex;
use serde_json::{Value, json};

use crate::error::RegistryError;
use crate::validator::{check_constraints, coerce_value};
use crate::value::AttributeValue;

/// Attribute names reserved for scope identifiers.
pub const ANCESTOR_ATTRIBUTES: [&str; 2] = ["database", "schema"];

/// A constraint with its pattern compiled.
#[derive(Debug, Clone)]
pub enum Constraint {
    OneOf(Vec<String>),
    Range { min: Option<i64>, max: Option<i64> },
    Pattern { source: String, regex: Regex },
    MaxLength(usize),
    MinItems(usize),
}

/// One attribute of a compiled spec.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub name: String,
    pub kind: AttributeType,
    pub required: bool,
    pub default: Option<AttributeValue>,
    pub description: Option<String>,
    pub constraints: Vec<Constraint>,
    pub render: Rendering,
    /// Statement keyword for `property` and `modifier` rendering.
    pub keyword: String,
}

impl AttributeSpec {
    /// Allowed values of an enum attribute.
    pub fn allowed_values(&self) -> Option<&[String]> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::OneOf(values) => Some(values.as_slice()),
            _ => None,
        })
    }
}

/// Immutable description of one resource type.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub name: String,
    pub description: Option<String>,
    pub keyword: String,
    pub plural: String,
    pub scope: Scope,
    pub manager: ManagerKind,
    pub supports_cascade: bool,
    pub protected_names: Vec<String>,
    pub attributes: Vec<AttributeSpec>,
    pub rules: Vec<CrossFieldRule>,
}

impl ResourceSpec {
    /// Compile a seed definition.
    pub fn from_definition(def: &ResourceTypeDefinition) -> Result<Self, RegistryError> {
        let type_name = def.name.trim().to_ascii_lowercase();
        if type_name.is_empty()
            || !type_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(RegistryError::invalid(
                &def.name,
                "type names must be non-empty and use only letters, digits and '_'",
            ));
        }

        let keyword = normalize_keyword(&type_name, &def.keyword)?;
        let plural = normalize_keyword(&type_name, &def.plural_keyword())?;

        let mut seen = HashSet::new();
        let mut attributes = Vec::with_capacity(def.attributes.len());
        for attr in &def.attributes {
            if !seen.insert(attr.name.as_str()) {
                return Err(RegistryError::invalid(
                    &type_name,
                    format!("attribute '{}' is declared more than once", attr.name),
                ));
            }
            if ANCESTOR_ATTRIBUTES.contains(&attr.name.as_str()) {
                return Err(RegistryError::invalid(
                    &type_name,
                    format!(
                        "attribute '{}' is implied by the scope and may not be declared",
                        attr.name
                    ),
                ));
            }

            let constraints = attr
                .constraints
                .iter()
                .map(|c| compile_constraint(&type_name, &attr.name, attr.kind, c))
                .collect::<Result<Vec<_>, _>>()?;

            check_rendering(&type_name, def.manager, &attr.name, attr.kind, attr.render)?;

            let mut spec = AttributeSpec {
                name: attr.name.clone(),
                kind: attr.kind,
                required: attr.required,
                default: None,
                description: attr.description.clone(),
                constraints,
                render: attr.render,
                keyword: attr.render_keyword(),
            };

            if attr.kind == AttributeType::Enum && spec.allowed_values().is_none() {
                return Err(RegistryError::invalid(
                    &type_name,
                    format!("enum attribute '{}' needs a one_of constraint", attr.name),
                ));
            }

            if let Some(raw) = &attr.default {
                let value = coerce_value(&spec, raw)
                    .and_then(|v| check_constraints(&spec, v))
                    .map_err(|e| {
                        RegistryError::invalid(
                            &type_name,
                            format!("default for '{}' is invalid: {}", attr.name, e),
                        )
                    })?;
                spec.default = Some(value);
            }

            attributes.push(spec);
        }

        let identity: Vec<&AttributeSpec> = attributes
            .iter()
            .filter(|a| a.render == Rendering::Identity)
            .collect();
        match identity.as_slice() {
            [name] if name.name == "name" && name.required && name.kind == AttributeType::String => {}
            _ => {
                return Err(RegistryError::invalid(
                    &type_name,
                    "exactly one identity attribute is required: a required string named 'name'",
                ));
            }
        }

        for rule in &def.rules {
            check_rule(&type_name, &attributes, rule)?;
        }

        Ok(Self {
            name: type_name,
            description: def.description.clone(),
            keyword,
            plural,
            scope: def.scope,
            manager: def.manager,
            supports_cascade: def.supports_cascade,
            protected_names: def.protected_names.clone(),
            attributes,
            rules: def.rules.clone(),
        })
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Ancestor identifiers required by the scope, outermost first.
    pub fn ancestors(&self) -> &'static [&'static str] {
        self.scope.ancestors()
    }

    /// Whether `name` is a protected object of this type.
    ///
    /// Names are raw identifiers: double quotes a caller includes are part
    /// of the name and are escaped when rendered, so `"PUBLIC"` names a
    /// different object than `PUBLIC`. Surrounding whitespace is dropped
    /// before rendering, and the comparison ignores case.
    pub fn is_protected(&self, name: &str) -> bool {
        let name = name.trim();
        self.protected_names
            .iter()
            .any(|p| p.eq_ignore_ascii_case(name))
    }

    /// JSON summary used for introspection.
    pub fn summary(&self) -> Value {
        let attributes: Vec<Value> = self
            .attributes
            .iter()
            .map(|a| {
                let mut entry = json!({
                    "name": a.name,
                    "type": a.kind.as_str(),
                    "required": a.required,
                });
                if let Some(default) = &a.default {
                    entry["default"] = default.to_json();
                }
                if let Some(values) = a.allowed_values() {
                    entry["one_of"] = json!(values);
                }
                for c in &a.constraints {
                    match c {
                        Constraint::Range { min, max } => {
                            entry["range"] = json!({ "min": min, "max": max });
                        }
                        Constraint::Pattern { source, .. } => entry["pattern"] = json!(source),
                        Constraint::MaxLength(max) => entry["max_length"] = json!(max),
                        Constraint::MinItems(min) => entry["min_items"] = json!(min),
                        Constraint::OneOf(_) => {}
                    }
                }
                if let Some(description) = &a.description {
                    entry["description"] = json!(description);
                }
                entry
            })
            .collect();

        json!({
            "name": self.name,
            "description": self.description,
            "scope": self.scope.as_str(),
            "requires": self.ancestors(),
            "manager": self.manager.as_str(),
            "supports_cascade": self.supports_cascade,
            "protected_names": self.protected_names,
            "attributes": attributes,
        })
    }
}

fn normalize_keyword(type_name: &str, keyword: &str) -> Result<String, RegistryError> {
    let words: Vec<&str> = keyword.split_whitespace().collect();
    let valid = !words.is_empty()
        && words
            .iter()
            .all(|w| w.chars().all(|c| c.is_ascii_alphabetic() || c == '_'));
    if !valid {
        return Err(RegistryError::invalid(
            type_name,
            format!("'{}' is not a valid object keyword", keyword),
        ));
    }
    Ok(words.join(" ").to_ascii_uppercase())
}

fn compile_constraint(
    type_name: &str,
    attribute: &str,
    kind: AttributeType,
    constraint: &AttributeConstraint,
) -> Result<Constraint, RegistryError> {
    let mismatch = |what: &str| {
        RegistryError::invalid(
            type_name,
            format!(
                "{} constraint does not apply to {} attribute '{}'",
                what,
                kind.as_str(),
                attribute
            ),
        )
    };

    match constraint {
        AttributeConstraint::OneOf { values } => {
            if !matches!(kind, AttributeType::Enum | AttributeType::String) {
                return Err(mismatch("one_of"));
            }
            if values.is_empty() {
                return Err(RegistryError::invalid(
                    type_name,
                    format!("one_of for '{}' lists no values", attribute),
                ));
            }
            Ok(Constraint::OneOf(values.clone()))
        }
        AttributeConstraint::Range { min, max } => {
            if kind != AttributeType::Integer {
                return Err(mismatch("range"));
            }
            if let (Some(lo), Some(hi)) = (min, max) {
                if lo > hi {
                    return Err(RegistryError::invalid(
                        type_name,
                        format!("range for '{}' has min {} above max {}", attribute, lo, hi),
                    ));
                }
            }
            Ok(Constraint::Range {
                min: *min,
                max: *max,
            })
        }
        AttributeConstraint::Pattern { regex } => {
            if !matches!(
                kind,
                AttributeType::String | AttributeType::Body | AttributeType::StringList
            ) {
                return Err(mismatch("pattern"));
            }
            let anchored = format!("^(?:{})$", regex);
            let compiled = Regex::new(&anchored).map_err(|e| {
                RegistryError::invalid(
                    type_name,
                    format!("pattern for '{}' does not compile: {}", attribute, e),
                )
            })?;
            Ok(Constraint::Pattern {
                source: regex.clone(),
                regex: compiled,
            })
        }
        AttributeConstraint::MaxLength { max } => {
            if !matches!(
                kind,
                AttributeType::String | AttributeType::Body | AttributeType::StringList
            ) {
                return Err(mismatch("max_length"));
            }
            Ok(Constraint::MaxLength(*max))
        }
        AttributeConstraint::MinItems { min } => {
            if !matches!(kind, AttributeType::ColumnList | AttributeType::StringList) {
                return Err(mismatch("min_items"));
            }
            Ok(Constraint::MinItems(*min))
        }
    }
}

fn check_rendering(
    type_name: &str,
    manager: ManagerKind,
    attribute: &str,
    kind: AttributeType,
    render: Rendering,
) -> Result<(), RegistryError> {
    let ok = match render {
        Rendering::Identity => true,
        Rendering::Modifier | Rendering::OrReplace => kind == AttributeType::Boolean,
        Rendering::Property => !matches!(kind, AttributeType::ColumnList | AttributeType::Body),
        Rendering::Managed => manager != ManagerKind::Generic,
    };
    if ok {
        Ok(())
    } else {
        Err(RegistryError::invalid(
            type_name,
            format!(
                "{} attribute '{}' cannot use {:?} rendering with the {} manager",
                kind.as_str(),
                attribute,
                render,
                manager.as_str()
            ),
        ))
    }
}

fn check_rule(
    type_name: &str,
    attributes: &[AttributeSpec],
    rule: &CrossFieldRule,
) -> Result<(), RegistryError> {
    let lookup = |name: &str| {
        attributes.iter().find(|a| a.name == name).ok_or_else(|| {
            RegistryError::invalid(
                type_name,
                format!("rule references undeclared attribute '{}'", name),
            )
        })
    };
    let integer = |name: &str| {
        let attr = lookup(name)?;
        if attr.kind == AttributeType::Integer {
            Ok(())
        } else {
            Err(RegistryError::invalid(
                type_name,
                format!("rule needs integer attribute, '{}' is {}", name, attr.kind.as_str()),
            ))
        }
    };

    match rule {
        CrossFieldRule::Requires {
            attribute,
            requires,
        } => {
            lookup(attribute)?;
            for r in requires {
                lookup(r)?;
            }
        }
        CrossFieldRule::Ordered { lower, upper } => {
            integer(lower)?;
            integer(upper)?;
        }
        CrossFieldRule::RangeWhen {
            attribute, when, ..
        } => {
            integer(attribute)?;
            lookup(when)?;
        }
    }
    Ok(())
}
