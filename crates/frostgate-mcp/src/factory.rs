//! The three object tools.
//!
//! `create_object`, `list_objects` and `drop_object` are the whole object
//! surface. Each takes the resource type as its first argument and runs the
//! same pipeline for every type:
//!
//! ```text
//! registry lookup -> validation -> manager -> execution channel -> descriptor
//! ```
//!
//! Adding a resource type is a registry change; nothing here is per type.

use std::sync::Arc;

use chrono::Utc;
use frostgate_core::{FrostgateConfig, ListingConfig};
use frostgate_policy::{
    AttributeMap, AttributeValidator, DropRequest, ListFilter, RegistryBuilder, ResourceRegistry,
    ResourceSpec, ValidationError,
};
use frostgate_sql::StatementClassifier;
use serde_json::{Map, Value, json};
use tracing::Instrument;
use uuid::Uuid;

use crate::channel::{ExecutionChannel, Row};
use crate::descriptor::{DropConfirmation, ObjectDescriptor, Operation, PlannedStatement};
use crate::error::ObjectError;
use crate::manager::{ManagerSet, ObjectManager, drop_target};
use crate::protocol::{CallToolOptions, CallToolResponse, ToolAnnotations, ToolDefinition};

pub const CREATE_OBJECT: &str = "create_object";
pub const LIST_OBJECTS: &str = "list_objects";
pub const DROP_OBJECT: &str = "drop_object";

/// Names of the object tools, in the order they are listed.
pub const TOOL_NAMES: [&str; 3] = [CREATE_OBJECT, LIST_OBJECTS, DROP_OBJECT];

const LIST_ARGUMENTS: [&str; 6] = ["object_type", "like", "starts_with", "database", "schema", "limit"];
const DROP_ARGUMENTS: [&str; 7] = [
    "object_type",
    "name",
    "database",
    "schema",
    "signature",
    "if_exists",
    "cascade",
];
const CREATE_ARGUMENTS: [&str; 2] = ["object_type", "attributes"];

/// Registry, managers and channel, shared read-only by every call.
#[derive(Clone)]
pub struct ObjectTools {
    registry: Arc<ResourceRegistry>,
    managers: Arc<ManagerSet>,
    channel: Arc<dyn ExecutionChannel>,
    listing: ListingConfig,
}

impl ObjectTools {
    /// Assemble the tools. Fails if a registered type has no manager.
    pub fn new(
        registry: Arc<ResourceRegistry>,
        managers: Arc<ManagerSet>,
        channel: Arc<dyn ExecutionChannel>,
        listing: ListingConfig,
    ) -> Result<Self, ObjectError> {
        managers.check_coverage(&registry)?;
        tracing::info!(
            types = registry.len(),
            "Object tools ready for {}",
            registry.list_types().join(", ")
        );
        Ok(Self {
            registry,
            managers,
            channel,
            listing,
        })
    }

    /// Build the registry and standard managers from configuration.
    pub fn from_config(
        config: &FrostgateConfig,
        channel: Arc<dyn ExecutionChannel>,
    ) -> Result<Self, ObjectError> {
        let registry = RegistryBuilder::from_config(&config.registry)
            .map_err(ObjectError::from_registry)?
            .build();
        let managers = ManagerSet::standard(StatementClassifier::new(config.sql.dialect));
        Self::new(
            Arc::new(registry),
            Arc::new(managers),
            channel,
            config.listing.clone(),
        )
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn listing(&self) -> &ListingConfig {
        &self.listing
    }

    fn resolve(&self, object_type: &str) -> Result<(&ResourceSpec, &dyn ObjectManager), ObjectError> {
        let spec = self
            .registry
            .lookup(object_type)
            .map_err(ObjectError::from_registry)?;
        let manager = self.managers.get(spec.manager).ok_or_else(|| {
            ObjectError::ConfigurationFault(format!(
                "no manager '{}' for resource type '{}'",
                spec.manager.as_str(),
                spec.name
            ))
        })?;
        Ok((spec, manager))
    }

    // =========================================================================
    // Statement construction
    // =========================================================================

    fn build_create(
        &self,
        object_type: &str,
        attributes: &Value,
    ) -> Result<(&ResourceSpec, AttributeMap, String), ObjectError> {
        let (spec, manager) = self.resolve(object_type)?;
        let attrs = AttributeValidator::new(spec)
            .validate(attributes)
            .map_err(|e| ObjectError::validation(&spec.name, Operation::Create, e))?;
        let statement = manager
            .build_create(spec, &attrs)
            .map_err(|e| ObjectError::validation(&spec.name, Operation::Create, e))?;
        tracing::debug!(object_type = %spec.name, statement = %statement, "Built create statement");
        Ok((spec, attrs, statement))
    }

    fn build_list(
        &self,
        object_type: &str,
        filter: &ListFilter,
    ) -> Result<(&ResourceSpec, ListFilter, String), ObjectError> {
        let (spec, manager) = self.resolve(object_type)?;
        let filter = AttributeValidator::new(spec)
            .validate_list(filter, &self.listing)
            .map_err(|e| ObjectError::validation(&spec.name, Operation::List, e))?;
        let statement = manager
            .build_list(spec, &filter)
            .map_err(|e| ObjectError::validation(&spec.name, Operation::List, e))?;
        tracing::debug!(object_type = %spec.name, statement = %statement, "Built list statement");
        Ok((spec, filter, statement))
    }

    fn build_drop(
        &self,
        object_type: &str,
        request: &DropRequest,
    ) -> Result<(&ResourceSpec, String), ObjectError> {
        let (spec, manager) = self.resolve(object_type)?;

        if spec.is_protected(&request.name) {
            tracing::warn!(
                object_type = %spec.name,
                name = %request.name,
                cascade = request.cascade,
                "Refusing to drop protected object"
            );
            return Err(ObjectError::Refused {
                object_type: spec.name.clone(),
                operation: Operation::Drop,
                name: request.name.clone(),
                reason: format!("'{}' is a protected {}", request.name.trim(), spec.name),
            });
        }

        AttributeValidator::new(spec)
            .validate_drop(request)
            .map_err(|e| ObjectError::validation(&spec.name, Operation::Drop, e))?;
        let statement = manager
            .build_drop(spec, request)
            .map_err(|e| ObjectError::validation(&spec.name, Operation::Drop, e))?;
        tracing::debug!(object_type = %spec.name, statement = %statement, "Built drop statement");
        Ok((spec, statement))
    }

    /// The create statement for `attributes`, without executing it.
    pub fn plan_create(
        &self,
        object_type: &str,
        attributes: &Value,
    ) -> Result<PlannedStatement, ObjectError> {
        let (spec, _, statement) = self.build_create(object_type, attributes)?;
        Ok(planned(spec, Operation::Create, statement))
    }

    /// The list statement for `filter`, without executing it.
    pub fn plan_list(
        &self,
        object_type: &str,
        filter: &ListFilter,
    ) -> Result<PlannedStatement, ObjectError> {
        let (spec, _, statement) = self.build_list(object_type, filter)?;
        Ok(planned(spec, Operation::List, statement))
    }

    /// The drop statement for `request`, without executing it. Protected
    /// names are refused here too.
    pub fn plan_drop(
        &self,
        object_type: &str,
        request: &DropRequest,
    ) -> Result<PlannedStatement, ObjectError> {
        let (spec, statement) = self.build_drop(object_type, request)?;
        Ok(planned(spec, Operation::Drop, statement))
    }

    // =========================================================================
    // Execution
    // =========================================================================

    async fn execute(
        &self,
        object_type: &str,
        operation: Operation,
        statement: &str,
    ) -> Result<Vec<Row>, ObjectError> {
        self.channel.execute(statement).await.map_err(|source| {
            tracing::warn!(
                object_type = %object_type,
                operation = %operation,
                code = %source.code,
                failure = source.failure.as_str(),
                "Remote execution failed"
            );
            ObjectError::RemoteExecution {
                object_type: Some(object_type.to_string()),
                operation,
                statement: statement.to_string(),
                source,
            }
        })
    }

    /// Validate, build and execute a create statement.
    pub async fn create_object(
        &self,
        object_type: &str,
        attributes: &Value,
    ) -> Result<ObjectDescriptor, ObjectError> {
        let (spec, attrs, statement) = self.build_create(object_type, attributes)?;
        self.execute(&spec.name, Operation::Create, &statement).await?;

        let descriptor = ObjectDescriptor::created(&spec.name, attrs.to_json());
        tracing::info!(
            object_type = %spec.name,
            operation = "create",
            name = %descriptor.name,
            "Object created"
        );
        Ok(descriptor)
    }

    /// Enumerate objects. No matches is an empty list, not an error.
    pub async fn list_objects(
        &self,
        object_type: &str,
        filter: &ListFilter,
    ) -> Result<Vec<ObjectDescriptor>, ObjectError> {
        let (spec, filter, statement) = self.build_list(object_type, filter)?;
        let rows = self.execute(&spec.name, Operation::List, &statement).await?;

        let limit = filter
            .limit
            .and_then(|l| usize::try_from(l).ok())
            .unwrap_or(usize::MAX);
        let objects: Vec<ObjectDescriptor> = rows
            .into_iter()
            .take(limit)
            .map(|row| ObjectDescriptor::from_row(&spec.name, row))
            .collect();
        tracing::info!(
            object_type = %spec.name,
            operation = "list",
            count = objects.len(),
            "Objects listed"
        );
        Ok(objects)
    }

    /// Drop an object. With `if_exists`, a missing object is a no-op.
    pub async fn drop_object(
        &self,
        object_type: &str,
        request: &DropRequest,
    ) -> Result<DropConfirmation, ObjectError> {
        let (spec, statement) = self.build_drop(object_type, request)?;

        let existed = match self.channel.execute(&statement).await {
            Ok(rows) => !reports_already_dropped(&rows),
            Err(e) if request.if_exists && e.is_object_missing() => false,
            Err(source) => {
                tracing::warn!(
                    object_type = %spec.name,
                    operation = "drop",
                    code = %source.code,
                    failure = source.failure.as_str(),
                    "Remote execution failed"
                );
                return Err(ObjectError::RemoteExecution {
                    object_type: Some(spec.name.clone()),
                    operation: Operation::Drop,
                    statement,
                    source,
                });
            }
        };

        let confirmation = DropConfirmation {
            object_type: spec.name.clone(),
            name: drop_target(spec, request),
            existed,
            cascade: request.cascade,
            statement,
        };
        tracing::info!(
            object_type = %spec.name,
            operation = "drop",
            name = %confirmation.name,
            existed,
            "Object dropped"
        );
        Ok(confirmation)
    }

    // =========================================================================
    // MCP surface
    // =========================================================================

    /// Exactly three tool definitions. `object_type` enumerates the registry.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let types = self.registry.list_types();
        let object_type = json!({
            "type": "string",
            "enum": types,
            "description": "Resource type"
        });

        let create = ToolDefinition {
            name: CREATE_OBJECT.to_string(),
            description: Some(format!(
                "Create an object. Attributes by type (* = required):\n{}",
                self.attribute_help()
            )),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "object_type": object_type,
                    "attributes": {
                        "type": "object",
                        "description": "Attributes of the new object, including parent database/schema for nested types"
                    }
                },
                "required": ["object_type", "attributes"],
                "additionalProperties": false
            }),
            annotations: Some(ToolAnnotations {
                read_only: Some(false),
                destructive: Some(false),
                dry_run_supported: Some(true),
            }),
        };

        let list = ToolDefinition {
            name: LIST_OBJECTS.to_string(),
            description: Some("List objects of a type with optional filters".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "object_type": object_type,
                    "like": {"type": "string", "description": "Case-preserving LIKE pattern (% and _ wildcards)"},
                    "starts_with": {"type": "string", "description": "Name prefix"},
                    "database": {"type": "string", "description": "Parent database"},
                    "schema": {"type": "string", "description": "Parent schema (requires database)"},
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": self.listing.max_limit,
                        "default": self.listing.default_limit,
                        "description": "Maximum number of results"
                    }
                },
                "required": ["object_type"],
                "additionalProperties": false
            }),
            annotations: Some(ToolAnnotations {
                read_only: Some(true),
                destructive: Some(false),
                dry_run_supported: Some(true),
            }),
        };

        let drop = ToolDefinition {
            name: DROP_OBJECT.to_string(),
            description: Some(
                "Drop an object. Protected system objects are always refused".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "object_type": object_type,
                    "name": {"type": "string"},
                    "database": {"type": "string", "description": "Parent database for nested types"},
                    "schema": {"type": "string", "description": "Parent schema for schema-level types"},
                    "signature": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Argument types of a function or procedure"
                    },
                    "if_exists": {"type": "boolean", "default": true},
                    "cascade": {"type": "boolean", "default": false}
                },
                "required": ["object_type", "name"],
                "additionalProperties": false
            }),
            annotations: Some(ToolAnnotations {
                read_only: Some(false),
                destructive: Some(true),
                dry_run_supported: Some(true),
            }),
        };

        vec![create, list, drop]
    }

    fn attribute_help(&self) -> String {
        self.registry
            .iter()
            .map(|spec| {
                let mut names: Vec<String> =
                    spec.ancestors().iter().map(|a| format!("{}*", a)).collect();
                names.extend(spec.attributes.iter().map(|a| {
                    if a.required && a.default.is_none() {
                        format!("{}*", a.name)
                    } else {
                        a.name.clone()
                    }
                }));
                format!("- {}: {}", spec.name, names.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Dispatch a tool call. Every call gets its own request id.
    pub async fn call(
        &self,
        name: &str,
        arguments: &Value,
        options: &CallToolOptions,
    ) -> CallToolResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("object_tool", tool = name, request_id = %request_id);

        async move {
            let result = match name {
                CREATE_OBJECT => self.call_create(arguments, options).await,
                LIST_OBJECTS => self.call_list(arguments, options).await,
                DROP_OBJECT => self.call_drop(arguments, options).await,
                other => Err(ObjectError::ConfigurationFault(format!(
                    "'{}' is not an object tool",
                    other
                ))),
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

    async fn call_create(&self, arguments: &Value, options: &CallToolOptions) -> Result<Value, ObjectError> {
        let (object_type, args) = split_arguments(arguments, Operation::Create, &CREATE_ARGUMENTS)?;
        let attributes = match args.get("attributes") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(v) => v.clone(),
        };
        if options.dry_run {
            return Ok(dry_run_body(self.plan_create(&object_type, &attributes)?));
        }
        let descriptor = self.create_object(&object_type, &attributes).await?;
        Ok(json!({
            "executed_at": Utc::now().to_rfc3339(),
            "object": descriptor,
        }))
    }

    async fn call_list(&self, arguments: &Value, options: &CallToolOptions) -> Result<Value, ObjectError> {
        let (object_type, args) = split_arguments(arguments, Operation::List, &LIST_ARGUMENTS)?;
        let filter: ListFilter = from_arguments(&object_type, Operation::List, args)?;
        if options.dry_run {
            return Ok(dry_run_body(self.plan_list(&object_type, &filter)?));
        }
        let objects = self.list_objects(&object_type, &filter).await?;
        Ok(json!({
            "executed_at": Utc::now().to_rfc3339(),
            "object_type": object_type,
            "count": objects.len(),
            "objects": objects,
        }))
    }

    async fn call_drop(&self, arguments: &Value, options: &CallToolOptions) -> Result<Value, ObjectError> {
        let (object_type, args) = split_arguments(arguments, Operation::Drop, &DROP_ARGUMENTS)?;
        let request: DropRequest = from_arguments(&object_type, Operation::Drop, args)?;
        if options.dry_run {
            return Ok(dry_run_body(self.plan_drop(&object_type, &request)?));
        }
        let confirmation = self.drop_object(&object_type, &request).await?;
        Ok(json!({
            "executed_at": Utc::now().to_rfc3339(),
            "drop": confirmation,
        }))
    }
}

fn planned(spec: &ResourceSpec, operation: Operation, statement: String) -> PlannedStatement {
    PlannedStatement {
        object_type: spec.name.clone(),
        operation,
        statement,
    }
}

fn dry_run_body(plan: PlannedStatement) -> Value {
    json!({
        "dry_run": true,
        "object_type": plan.object_type,
        "operation": plan.operation,
        "statement": plan.statement,
    })
}

/// Split tool arguments into the resource type and the remaining fields,
/// rejecting fields the tool does not declare.
fn split_arguments(
    arguments: &Value,
    operation: Operation,
    allowed: &[&str],
) -> Result<(String, Map<String, Value>), ObjectError> {
    let invalid = |e: ValidationError| ObjectError::validation("", operation, e);
    let mut args = match arguments {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => {
            return Err(invalid(ValidationError::invalid_request(
                "arguments",
                "Tool arguments must be an object",
            )));
        }
    };

    if let Some(key) = args.keys().find(|k| !allowed.contains(&k.as_str())) {
        return Err(invalid(ValidationError::invalid_request(
            key,
            format!("'{}' is not an argument of this tool", key),
        )));
    }

    match args.remove("object_type") {
        Some(Value::String(object_type)) if !object_type.trim().is_empty() => {
            Ok((object_type.trim().to_string(), args))
        }
        _ => Err(invalid(ValidationError::invalid_request(
            "object_type",
            "'object_type' is required and must be a string",
        ))),
    }
}

fn from_arguments<T: serde::de::DeserializeOwned>(
    object_type: &str,
    operation: Operation,
    args: Map<String, Value>,
) -> Result<T, ObjectError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| {
        ObjectError::validation(
            object_type,
            operation,
            ValidationError::invalid_request("arguments", e.to_string()),
        )
    })
}

/// `DROP ... IF EXISTS` on a missing object succeeds with a status row
/// saying so. Only the `status` column is read; other columns may echo
/// object names.
fn reports_already_dropped(rows: &[Row]) -> bool {
    rows.iter()
        .flat_map(|row| {
            row.iter()
                .filter(|(column, _)| column.eq_ignore_ascii_case("status"))
                .map(|(_, value)| value)
        })
        .any(|v| {
            v.as_str().is_some_and(|s| {
                let s = s.to_ascii_lowercase();
                s.contains("already dropped") || s.contains("does not exist")
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::DisconnectedChannel;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn tools() -> ObjectTools {
        ObjectTools::from_config(&FrostgateConfig::default(), Arc::new(DisconnectedChannel)).unwrap()
    }

    #[test]
    fn test_exactly_three_tools() {
        let definitions = tools().tool_definitions();
        let names: Vec<&str> = definitions.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, TOOL_NAMES.to_vec());
        for tool in &definitions {
            assert_eq!(tool.input_schema["properties"]["object_type"]["enum"][0], "database");
        }
    }

    #[test]
    fn test_plan_create() {
        let plan = tools()
            .plan_create("WAREHOUSE", &json!({"name": "wh1", "warehouse_size": "small"}))
            .unwrap();
        assert_eq!(plan.object_type, "warehouse");
        assert_eq!(plan.statement, "CREATE WAREHOUSE wh1 WAREHOUSE_SIZE = 'SMALL'");
    }

    #[test]
    fn test_unknown_type_is_not_found() {
        let err = tools().plan_create("stage", &json!({"name": "s"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_protected_drop_is_refused_before_validation() {
        let request = DropRequest::new("snowflake").cascade(true);
        let err = tools().plan_drop("database", &request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Refused);

        let request = DropRequest::new("\"ACCOUNTADMIN\"").cascade(true);
        let err = tools().plan_drop("role", &request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Refused);
    }

    #[test]
    fn test_cascade_on_unsupported_type_is_validation() {
        let err = tools()
            .plan_drop("warehouse", &DropRequest::new("wh1").cascade(true))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_split_arguments_rejects_unknown_fields() {
        let err = split_arguments(
            &json!({"object_type": "warehouse", "pattern": "x"}),
            Operation::List,
            &LIST_ARGUMENTS,
        )
        .unwrap_err();
        assert_eq!(err.to_json()["attribute"], "pattern");

        let err = split_arguments(&json!({}), Operation::List, &LIST_ARGUMENTS).unwrap_err();
        assert_eq!(err.to_json()["attribute"], "object_type");
    }

    #[test]
    fn test_already_dropped_status_row() {
        let Value::Object(row) =
            json!({"status": "Drop statement executed successfully (WH1 already dropped)."})
        else {
            unreachable!()
        };
        assert!(reports_already_dropped(&[row]));

        let Value::Object(row) = json!({"status": "WH1 successfully dropped."}) else {
            unreachable!()
        };
        assert!(!reports_already_dropped(&[row]));

        let Value::Object(row) = json!({"STATUS": "Schema S does not exist."}) else {
            unreachable!()
        };
        assert!(reports_already_dropped(&[row]));
    }

    #[test]
    fn test_already_dropped_ignores_other_columns() {
        let Value::Object(row) = json!({
            "status": "LEGACY successfully dropped.",
            "comment": "table does not exist upstream anymore"
        }) else {
            unreachable!()
        };
        assert!(!reports_already_dropped(&[row]));
    }

    #[tokio::test]
    async fn test_dry_run_call_does_not_touch_channel() {
        let response = tools()
            .call(
                DROP_OBJECT,
                &json!({"object_type": "schema", "database": "analytics", "name": "raw"}),
                &CallToolOptions { dry_run: true },
            )
            .await;
        assert!(!response.is_error);
        let body = response.json_content().unwrap();
        assert_eq!(body["statement"], "DROP SCHEMA IF EXISTS analytics.raw");
        assert_eq!(body["dry_run"], true);
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_channel_failure_is_remote_execution() {
        let response = tools()
            .call(
                LIST_OBJECTS,
                &json!({"object_type": "warehouse"}),
                &CallToolOptions::default(),
            )
            .await;
        assert!(response.is_error);
        let body = response.json_content().unwrap();
        assert_eq!(body["kind"], "remote_execution");
        assert_eq!(body["remote"]["failure"], "unavailable");
    }
}
