//! Error types for the object tools.

use frostgate_core::StatementKind;
use frostgate_policy::{RegistryError, ValidationError};
use frostgate_sql::GateError;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::channel::RemoteExecutionError;
use crate::descriptor::Operation;

/// Machine-checkable error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationFault,
    NotFound,
    Validation,
    PermissionDenied,
    Refused,
    RemoteExecution,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConfigurationFault => "configuration_fault",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Refused => "refused",
            ErrorKind::RemoteExecution => "remote_execution",
        }
    }
}

/// Errors returned by the object tools and the statement tool.
#[derive(Debug, Error)]
pub enum ObjectError {
    /// Bad registry seed, missing manager or bad permission table. Fatal.
    #[error("configuration fault: {0}")]
    ConfigurationFault(String),

    /// The resource type is not registered.
    #[error("unknown resource type '{object_type}'. Available types: {}", available.join(", "))]
    NotFound {
        object_type: String,
        available: Vec<String>,
    },

    /// The request failed validation.
    #[error("invalid {operation} request: {source}")]
    Validation {
        object_type: String,
        operation: Operation,
        #[source]
        source: ValidationError,
    },

    /// The statement kind is disallowed by the permission table.
    #[error("statement kind '{kind}' is not permitted (statement {statement_index})")]
    PermissionDenied {
        kind: StatementKind,
        statement_index: usize,
    },

    /// The request crosses the safety boundary and was not forwarded.
    #[error("refused to {operation} {object_type} '{name}': {reason}")]
    Refused {
        object_type: String,
        operation: Operation,
        name: String,
        reason: String,
    },

    /// The execution channel failed.
    #[error("{operation} failed on the remote side: {source}")]
    RemoteExecution {
        object_type: Option<String>,
        operation: Operation,
        statement: String,
        #[source]
        source: RemoteExecutionError,
    },
}

impl ObjectError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ObjectError::ConfigurationFault(_) => ErrorKind::ConfigurationFault,
            ObjectError::NotFound { .. } => ErrorKind::NotFound,
            ObjectError::Validation { .. } => ErrorKind::Validation,
            ObjectError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            ObjectError::Refused { .. } => ErrorKind::Refused,
            ObjectError::RemoteExecution { .. } => ErrorKind::RemoteExecution,
        }
    }

    pub fn validation(object_type: &str, operation: Operation, source: ValidationError) -> Self {
        ObjectError::Validation {
            object_type: object_type.to_string(),
            operation,
            source,
        }
    }

    /// Map a registry lookup failure.
    pub fn from_registry(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownType {
                object_type,
                available,
            } => ObjectError::NotFound {
                object_type,
                available,
            },
            other => ObjectError::ConfigurationFault(other.to_string()),
        }
    }

    /// JSON body for tool results.
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "kind": self.kind().as_str(),
            "message": self.to_string(),
        });
        match self {
            ObjectError::ConfigurationFault(_) => {}
            ObjectError::NotFound {
                object_type,
                available,
            } => {
                body["object_type"] = json!(object_type);
                body["available"] = json!(available);
            }
            ObjectError::Validation {
                object_type,
                operation,
                source,
            } => {
                if !object_type.is_empty() {
                    body["object_type"] = json!(object_type);
                }
                body["operation"] = json!(operation);
                body["reason"] = json!(source.kind.as_str());
                if let Some(attribute) = &source.attribute {
                    body["attribute"] = json!(attribute);
                }
            }
            ObjectError::PermissionDenied {
                kind,
                statement_index,
            } => {
                body["statement_kind"] = json!(kind);
                body["statement_index"] = json!(statement_index);
            }
            ObjectError::Refused {
                object_type,
                operation,
                name,
                ..
            } => {
                body["object_type"] = json!(object_type);
                body["operation"] = json!(operation);
                body["name"] = json!(name);
            }
            ObjectError::RemoteExecution {
                object_type,
                operation,
                source,
                ..
            } => {
                if let Some(object_type) = object_type {
                    body["object_type"] = json!(object_type);
                }
                body["operation"] = json!(operation);
                body["remote"] = json!(source);
            }
        }
        body
    }
}

/// Errors that stop the MCP server loop.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error on the transport.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<GateError> for ObjectError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::PermissionDenied {
                kind,
                statement_index,
            } => ObjectError::PermissionDenied {
                kind,
                statement_index,
            },
            GateError::InvalidPermissions(e) => ObjectError::ConfigurationFault(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_maps_to_not_found() {
        let err = ObjectError::from_registry(RegistryError::UnknownType {
            object_type: "stage".into(),
            available: vec!["database".into(), "warehouse".into()],
        });
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "unknown resource type 'stage'. Available types: database, warehouse"
        );
    }

    #[test]
    fn test_duplicate_type_is_configuration_fault() {
        let err = ObjectError::from_registry(RegistryError::DuplicateType("warehouse".into()));
        assert_eq!(err.kind(), ErrorKind::ConfigurationFault);
    }

    #[test]
    fn test_validation_json_names_attribute() {
        let err = ObjectError::validation(
            "warehouse",
            Operation::Create,
            ValidationError::required_attribute_missing("warehouse", "size"),
        );
        let body = err.to_json();
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["attribute"], "size");
        assert_eq!(body["reason"], "required_attribute_missing");
        assert_eq!(body["operation"], "create");
    }

    #[test]
    fn test_remote_error_passes_code_through() {
        let err = ObjectError::RemoteExecution {
            object_type: Some("warehouse".into()),
            operation: Operation::Create,
            statement: "CREATE WAREHOUSE wh1".into(),
            source: RemoteExecutionError::rejected("002002", "Object 'WH1' already exists.")
                .with_sql_state("42710"),
        };
        let body = err.to_json();
        assert_eq!(body["kind"], "remote_execution");
        assert_eq!(body["remote"]["code"], "002002");
        assert_eq!(body["remote"]["sql_state"], "42710");
        assert_eq!(body["remote"]["message"], "Object 'WH1' already exists.");
    }

    #[test]
    fn test_gate_denial_keeps_kind() {
        let err: ObjectError = GateError::PermissionDenied {
            kind: StatementKind::MutationDelete,
            statement_index: 0,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(err.to_json()["statement_kind"], "mutation-delete");
    }
}
