//! Error types for the registry and attribute validation.
//!
//! `ValidationError` is returned for caller mistakes and is always resolved
//! before any statement reaches the execution channel. `RegistryError` covers
//! lookups of unknown types and faults in the registry seed itself.

use std::fmt;

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The kind of validation error.
    pub kind: ValidationErrorKind,
    /// The offending attribute, when there is one.
    pub attribute: Option<String>,
    /// Human-readable error message.
    pub message: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            attribute: None,
            message: message.into(),
        }
    }

    /// Create a validation error about one attribute.
    pub fn for_attribute(
        kind: ValidationErrorKind,
        attribute: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            attribute: Some(attribute.to_string()),
            message: message.into(),
        }
    }

    // =========================================================================
    // REQUEST SHAPE ERRORS
    // =========================================================================

    /// The attributes were not a JSON object.
    pub fn not_an_object(object_type: &str) -> Self {
        Self::new(
            ValidationErrorKind::InvalidRequest,
            format!("Attributes for '{}' must be a JSON object", object_type),
        )
    }

    /// Create an unknown attribute error.
    pub fn unknown_attribute(object_type: &str, attribute: &str, known: &[&str]) -> Self {
        Self::for_attribute(
            ValidationErrorKind::UnknownAttribute,
            attribute,
            format!(
                "Unknown attribute '{}' for '{}'. Known attributes: {}",
                attribute,
                object_type,
                known.join(", ")
            ),
        )
    }

    /// A scope identifier was given to a type that does not live there.
    pub fn unexpected_scope(object_type: &str, attribute: &str, scope: &str) -> Self {
        Self::for_attribute(
            ValidationErrorKind::UnknownAttribute,
            attribute,
            format!(
                "'{}' is {} and does not accept '{}'",
                object_type, scope, attribute
            ),
        )
    }

    /// Create a missing ancestor identifier error.
    pub fn missing_ancestor(object_type: &str, ancestor: &str) -> Self {
        Self::for_attribute(
            ValidationErrorKind::MissingAncestor,
            ancestor,
            format!(
                "'{}' is nested in a {}; the '{}' identifier is required",
                object_type, ancestor, ancestor
            ),
        )
    }

    // =========================================================================
    // ATTRIBUTE ERRORS
    // =========================================================================

    /// Create a required attribute missing error.
    pub fn required_attribute_missing(object_type: &str, attribute: &str) -> Self {
        Self::for_attribute(
            ValidationErrorKind::RequiredAttributeMissing,
            attribute,
            format!(
                "Required attribute '{}' is missing for '{}'",
                attribute, object_type
            ),
        )
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(attribute: &str, expected: &str, found: &serde_json::Value) -> Self {
        Self::for_attribute(
            ValidationErrorKind::TypeMismatch,
            attribute,
            format!(
                "Attribute '{}' must be {}, got {}",
                attribute, expected, found
            ),
        )
    }

    /// Create a value not allowed error (enum membership).
    pub fn value_not_allowed(attribute: &str, value: &str, allowed: &[String]) -> Self {
        Self::for_attribute(
            ValidationErrorKind::ValueNotAllowed,
            attribute,
            format!(
                "Value '{}' for attribute '{}' is not one of: {}",
                value,
                attribute,
                allowed.join(", ")
            ),
        )
    }

    /// Create an out of range error.
    pub fn out_of_range(attribute: &str, value: i64, min: Option<i64>, max: Option<i64>) -> Self {
        let bounds = match (min, max) {
            (Some(min), Some(max)) => format!("between {} and {}", min, max),
            (Some(min), None) => format!("at least {}", min),
            (None, Some(max)) => format!("at most {}", max),
            (None, None) => "within range".to_string(),
        };
        Self::for_attribute(
            ValidationErrorKind::OutOfRange,
            attribute,
            format!(
                "Value {} for attribute '{}' must be {}",
                value, attribute, bounds
            ),
        )
    }

    /// Create a pattern mismatch error.
    pub fn pattern_mismatch(attribute: &str, pattern: &str) -> Self {
        Self::for_attribute(
            ValidationErrorKind::PatternMismatch,
            attribute,
            format!(
                "Value for attribute '{}' does not match required pattern: {}",
                attribute, pattern
            ),
        )
    }

    /// Create a too long error.
    pub fn too_long(attribute: &str, max: usize) -> Self {
        Self::for_attribute(
            ValidationErrorKind::TooLong,
            attribute,
            format!(
                "Value for attribute '{}' exceeds {} characters",
                attribute, max
            ),
        )
    }

    /// Create a too few items error.
    pub fn too_few_items(attribute: &str, min: usize, found: usize) -> Self {
        Self::for_attribute(
            ValidationErrorKind::TooFewItems,
            attribute,
            format!(
                "Attribute '{}' needs at least {} item(s), got {}",
                attribute, min, found
            ),
        )
    }

    /// Create an invalid identifier error.
    pub fn invalid_identifier(attribute: &str, reason: &str) -> Self {
        Self::for_attribute(
            ValidationErrorKind::InvalidIdentifier,
            attribute,
            format!("Invalid identifier in '{}': {}", attribute, reason),
        )
    }

    /// Create an invalid column definition error.
    pub fn invalid_column(attribute: &str, index: usize, reason: &str) -> Self {
        Self::for_attribute(
            ValidationErrorKind::InvalidColumn,
            attribute,
            format!("{}[{}]: {}", attribute, index, reason),
        )
    }

    // =========================================================================
    // CROSS-FIELD ERRORS
    // =========================================================================

    /// Create a cross-field rule violation error.
    pub fn rule_violation(attribute: &str, message: impl Into<String>) -> Self {
        Self::for_attribute(ValidationErrorKind::RuleViolation, attribute, message)
    }

    // =========================================================================
    // OPERATION ERRORS
    // =========================================================================

    /// Create a cascade unsupported error.
    pub fn cascade_unsupported(object_type: &str) -> Self {
        Self::for_attribute(
            ValidationErrorKind::InvalidRequest,
            "cascade",
            format!("'{}' does not support CASCADE", object_type),
        )
    }

    /// Create an invalid request error.
    pub fn invalid_request(attribute: &str, message: impl Into<String>) -> Self {
        Self::for_attribute(ValidationErrorKind::InvalidRequest, attribute, message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    // =========================================================================
    // Request shape errors
    // =========================================================================
    /// Attribute name not declared by the resource type.
    UnknownAttribute,
    /// Ancestor identifier required by the scope is missing.
    MissingAncestor,
    /// Malformed list/drop request or unsupported flag.
    InvalidRequest,

    // =========================================================================
    // Attribute errors
    // =========================================================================
    /// Required attribute is missing.
    RequiredAttributeMissing,
    /// Value cannot be coerced to the declared type.
    TypeMismatch,
    /// Value is not in the declared set.
    ValueNotAllowed,
    /// Integer is outside the declared range.
    OutOfRange,
    /// Value does not match the declared pattern.
    PatternMismatch,
    /// Value exceeds the declared length.
    TooLong,
    /// List has fewer items than declared.
    TooFewItems,
    /// Name cannot be used as an identifier.
    InvalidIdentifier,
    /// Column definition is malformed.
    InvalidColumn,

    // =========================================================================
    // Cross-field errors
    // =========================================================================
    /// A rule relating several attributes failed.
    RuleViolation,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::UnknownAttribute => "unknown_attribute",
            ValidationErrorKind::MissingAncestor => "missing_ancestor",
            ValidationErrorKind::InvalidRequest => "invalid_request",
            ValidationErrorKind::RequiredAttributeMissing => "required_attribute_missing",
            ValidationErrorKind::TypeMismatch => "type_mismatch",
            ValidationErrorKind::ValueNotAllowed => "value_not_allowed",
            ValidationErrorKind::OutOfRange => "out_of_range",
            ValidationErrorKind::PatternMismatch => "pattern_mismatch",
            ValidationErrorKind::TooLong => "too_long",
            ValidationErrorKind::TooFewItems => "too_few_items",
            ValidationErrorKind::InvalidIdentifier => "invalid_identifier",
            ValidationErrorKind::InvalidColumn => "invalid_column",
            ValidationErrorKind::RuleViolation => "rule_violation",
        }
    }
}

/// Error type for registry construction and lookup.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Resource type '{0}' is registered more than once")]
    DuplicateType(String),

    #[error("Invalid definition for resource type '{object_type}': {reason}")]
    InvalidDefinition { object_type: String, reason: String },

    #[error("Unknown resource type '{object_type}'. Available types: {}", available.join(", "))]
    UnknownType {
        object_type: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    Config(#[from] frostgate_core::ConfigError),
}

impl RegistryError {
    pub(crate) fn invalid(object_type: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            object_type: object_type.to_string(),
            reason: reason.into(),
        }
    }
}
