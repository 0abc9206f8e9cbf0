//! The gated free-form statement tool.
//!
//! Text passes through the [`PermissionGate`] before it can reach the
//! execution channel. Dry runs report the per-statement decisions instead.

use std::sync::Arc;

use chrono::Utc;
use frostgate_policy::ValidationError;
use frostgate_sql::PermissionGate;
use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

use crate::channel::ExecutionChannel;
use crate::descriptor::Operation;
use crate::error::ObjectError;
use crate::protocol::{CallToolOptions, CallToolResponse, ToolAnnotations, ToolDefinition};

pub const EXECUTE_STATEMENT: &str = "execute_statement";

/// Runs caller-supplied statements that the permission table allows.
#[derive(Clone)]
pub struct StatementTool {
    gate: PermissionGate,
    channel: Arc<dyn ExecutionChannel>,
    max_rows: u64,
}

impl StatementTool {
    pub fn new(gate: PermissionGate, channel: Arc<dyn ExecutionChannel>, max_rows: u64) -> Self {
        Self {
            gate,
            channel,
            max_rows,
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: EXECUTE_STATEMENT.to_string(),
            description: Some(
                "Run a SQL statement. Statements are classified and checked against the \
                 configured permission table before execution"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "statement": {"type": "string", "description": "SQL text"}
                },
                "required": ["statement"],
                "additionalProperties": false
            }),
            annotations: Some(ToolAnnotations {
                read_only: Some(false),
                destructive: Some(true),
                dry_run_supported: Some(true),
            }),
        }
    }

    /// Gate and execute `statement`, returning its rows.
    pub async fn execute(&self, statement: &str) -> Result<Value, ObjectError> {
        let text = self.gate.check(statement)?;
        let rows = self.channel.execute(text).await.map_err(|source| {
            tracing::warn!(code = %source.code, failure = source.failure.as_str(), "Remote execution failed");
            ObjectError::RemoteExecution {
                object_type: None,
                operation: Operation::Execute,
                statement: text.to_string(),
                source,
            }
        })?;

        let total = rows.len();
        let limit = usize::try_from(self.max_rows).unwrap_or(usize::MAX);
        let rows: Vec<Value> = rows.into_iter().take(limit).map(Value::Object).collect();
        tracing::info!(operation = "execute", rows = total, "Statement executed");
        Ok(json!({
            "executed_at": Utc::now().to_rfc3339(),
            "row_count": total,
            "truncated": total > rows.len(),
            "rows": rows,
        }))
    }

    /// Decisions for each statement in `statement`, without executing.
    pub fn explain(&self, statement: &str) -> Value {
        let decisions = self.gate.explain(statement);
        let allowed = decisions.iter().all(|d| d.allowed);
        json!({
            "dry_run": true,
            "allowed": allowed,
            "statements": decisions,
        })
    }

    pub async fn call(&self, arguments: &Value, options: &CallToolOptions) -> CallToolResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("statement_tool", request_id = %request_id);

        async move {
            let result = match statement_argument(arguments) {
                Ok(statement) if options.dry_run => Ok(self.explain(statement)),
                Ok(statement) => self.execute(statement).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(mut body) => {
                    body["request_id"] = json!(request_id.to_string());
                    CallToolResponse::json(body)
                }
                Err(e) => {
                    let mut body = e.to_json();
                    body["request_id"] = json!(request_id.to_string());
                    CallToolResponse::error(e.to_string(), body)
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn statement_argument(arguments: &Value) -> Result<&str, ObjectError> {
    let invalid = |attribute: &str, message: &str| {
        ObjectError::validation(
            "",
            Operation::Execute,
            ValidationError::invalid_request(attribute, message),
        )
    };
    let Value::Object(args) = arguments else {
        return Err(invalid("arguments", "Tool arguments must be an object"));
    };
    if let Some(key) = args.keys().find(|k| k.as_str() != "statement") {
        return Err(invalid(key.as_str(), "Only 'statement' is accepted"));
    }
    match args.get("statement") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        _ => Err(invalid(
            "statement",
            "'statement' is required and must be a non-empty string",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::DisconnectedChannel;
    use frostgate_core::StatementKind;
    use frostgate_sql::{PermissionTable, StatementClassifier};

    fn tool() -> StatementTool {
        StatementTool::new(
            PermissionGate::new(
                StatementClassifier::default(),
                PermissionTable::new(false).with(StatementKind::Query, true),
            ),
            Arc::new(DisconnectedChannel),
            100,
        )
    }

    #[tokio::test]
    async fn test_denied_statement_never_reaches_channel() {
        let response = tool()
            .call(
                &json!({"statement": "DELETE FROM t WHERE id=1"}),
                &CallToolOptions::default(),
            )
            .await;
        assert!(response.is_error);
        let body = response.json_content().unwrap();
        assert_eq!(body["kind"], "permission_denied");
        assert_eq!(body["statement_kind"], "mutation-delete");
    }

    #[tokio::test]
    async fn test_allowed_statement_reaches_channel() {
        let response = tool()
            .call(&json!({"statement": "SELECT 1"}), &CallToolOptions::default())
            .await;
        // The disconnected channel fails, which proves the gate let it through.
        let body = response.json_content().unwrap();
        assert_eq!(body["kind"], "remote_execution");
    }

    #[tokio::test]
    async fn test_dry_run_explains_each_statement() {
        let response = tool()
            .call(
                &json!({"statement": "SELECT 1; DROP TABLE t"}),
                &CallToolOptions { dry_run: true },
            )
            .await;
        assert!(!response.is_error);
        let body = response.json_content().unwrap();
        assert_eq!(body["allowed"], false);
        assert_eq!(body["statements"][1]["kind"], "schema-drop");
        assert_eq!(body["statements"][1]["source"], "catch_all");
    }

    #[test]
    fn test_statement_argument_is_required() {
        assert!(statement_argument(&json!({})).is_err());
        assert!(statement_argument(&json!({"statement": "  "})).is_err());
        assert!(statement_argument(&json!({"statement": "SELECT 1", "x": 1})).is_err());
    }
}
