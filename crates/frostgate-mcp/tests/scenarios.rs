//! End-to-end behavior of the object tools against a scripted channel.

mod common;

use std::sync::Arc;

use common::{ScriptedChannel, WAREHOUSE_SEED, builtin_tools, tools_from_seed};
use frostgate_core::ManagerKind;
use frostgate_mcp::{CallToolOptions, ErrorKind, ObjectError, RemoteExecutionError};
use frostgate_policy::{DropRequest, ListFilter, ValidationErrorKind};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_missing_required_attribute_is_rejected_before_execution() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let err = tools
        .create_object("warehouse", &json!({"name": "wh1"}))
        .await
        .unwrap_err();

    match &err {
        ObjectError::Validation { source, .. } => {
            assert_eq!(source.kind, ValidationErrorKind::RequiredAttributeMissing);
            assert_eq!(source.attribute.as_deref(), Some("size"));
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(err.to_string().contains("size"));
    assert!(channel.statements().is_empty());
}

#[tokio::test]
async fn test_create_sends_statement_and_describes_object() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let descriptor = tools
        .create_object("warehouse", &json!({"name": "wh1", "size": "M"}))
        .await
        .unwrap();

    assert_eq!(channel.statements(), vec!["CREATE WAREHOUSE wh1 SIZE = 'M'"]);
    assert_eq!(descriptor.object_type, "warehouse");
    assert_eq!(descriptor.name, "wh1");
    assert_eq!(
        serde_json::Value::Object(descriptor.attributes),
        json!({"name": "wh1", "size": "M"})
    );
}

#[tokio::test]
async fn test_enum_value_outside_allowed_set() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let err = tools
        .create_object("warehouse", &json!({"name": "wh2", "size": "XXL"}))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.to_json()["reason"], "value_not_allowed");
    assert!(channel.statements().is_empty());
}

#[tokio::test]
async fn test_protected_drop_is_refused_without_contacting_remote() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let mut request = DropRequest::new("wh1");
    request.cascade = true;
    let err = tools.drop_object("warehouse", &request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Refused);
    assert!(channel.statements().is_empty());

    // Protection is case-insensitive.
    let err = tools
        .drop_object("warehouse", &DropRequest::new("WH1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Refused);
    assert!(channel.statements().is_empty());
}

#[tokio::test]
async fn test_quoted_name_is_a_different_object() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    // The quotes are part of the name, both for protection and rendering.
    tools
        .drop_object("warehouse", &DropRequest::new("\"wh1\""))
        .await
        .unwrap();
    assert_eq!(
        channel.statements(),
        vec!["DROP WAREHOUSE IF EXISTS \"\"\"wh1\"\"\""]
    );
}

#[tokio::test]
async fn test_drop_reports_existing_object() {
    let channel = Arc::new(
        ScriptedChannel::new().then_rows(vec![json!({"status": "WH2 successfully dropped."})]),
    );
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let confirmation = tools
        .drop_object("warehouse", &DropRequest::new("wh2"))
        .await
        .unwrap();
    assert!(confirmation.existed);
    assert!(!confirmation.cascade);
    assert_eq!(channel.statements(), vec!["DROP WAREHOUSE IF EXISTS wh2"]);
}

#[tokio::test]
async fn test_drop_if_exists_of_missing_object_succeeds() {
    let channel = Arc::new(ScriptedChannel::new().then_rows(vec![json!({
        "status": "Drop statement executed successfully (WH9 already dropped)."
    })]));
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let confirmation = tools
        .drop_object("warehouse", &DropRequest::new("wh9"))
        .await
        .unwrap();
    assert!(!confirmation.existed);
}

#[tokio::test]
async fn test_drop_if_exists_tolerates_not_found_error() {
    let channel = Arc::new(ScriptedChannel::new().then_error(RemoteExecutionError::rejected(
        "002003",
        "Warehouse 'WH9' does not exist or not authorized.",
    )));
    let tools = tools_from_seed(WAREHOUSE_SEED, channel);

    let confirmation = tools
        .drop_object("warehouse", &DropRequest::new("wh9"))
        .await
        .unwrap();
    assert!(!confirmation.existed);
}

/// A drop request for a missing object of the given type, with whatever
/// parents and signature the type needs.
fn missing_object_request(spec: &frostgate_policy::ResourceSpec) -> DropRequest {
    let mut request = DropRequest::new("frostgate_missing");
    if spec.ancestors().contains(&"schema") {
        request = request.in_schema("analytics", "public");
    } else if spec.ancestors().contains(&"database") {
        request = request.in_database("analytics");
    }
    if matches!(spec.manager, ManagerKind::Function | ManagerKind::Procedure) {
        request = request.with_signature(vec!["NUMBER".into()]);
    }
    request
}

#[tokio::test]
async fn test_drop_if_exists_of_missing_object_succeeds_for_every_type() {
    let types: Vec<String> = builtin_tools(Arc::new(ScriptedChannel::new()))
        .registry()
        .list_types()
        .into_iter()
        .map(String::from)
        .collect();
    assert!(!types.is_empty());

    for object_type in &types {
        let status_row = Arc::new(ScriptedChannel::new().then_rows(vec![json!({
            "status": "Drop statement executed successfully (FROSTGATE_MISSING already dropped)."
        })]));
        let tools = builtin_tools(status_row.clone());
        let request = missing_object_request(tools.registry().lookup(object_type).unwrap());
        let confirmation = tools.drop_object(object_type, &request).await.unwrap();
        assert!(!confirmation.existed, "{object_type}");
        assert_eq!(status_row.statements().len(), 1, "{object_type}");

        let rejection = Arc::new(ScriptedChannel::new().then_error(
            RemoteExecutionError::rejected(
                "002003",
                "SQL compilation error: Object does not exist or not authorized.",
            ),
        ));
        let tools = builtin_tools(rejection);
        let confirmation = tools.drop_object(object_type, &request).await.unwrap();
        assert!(!confirmation.existed, "{object_type}");
    }
}

#[tokio::test]
async fn test_drop_if_exists_surfaces_privilege_failure() {
    let channel = Arc::new(ScriptedChannel::new().then_error(RemoteExecutionError::rejected(
        "003001",
        "SQL access control error: Insufficient privileges to operate on warehouse 'WH9'",
    )));
    let tools = tools_from_seed(WAREHOUSE_SEED, channel);

    let err = tools
        .drop_object("warehouse", &DropRequest::new("wh9"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteExecution);
    assert_eq!(err.to_json()["remote"]["code"], "003001");
}

#[tokio::test]
async fn test_drop_without_if_exists_surfaces_remote_error() {
    let channel = Arc::new(ScriptedChannel::new().then_error(RemoteExecutionError::rejected(
        "002003",
        "Warehouse 'WH9' does not exist or not authorized.",
    )));
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let mut request = DropRequest::new("wh9");
    request.if_exists = false;
    let err = tools.drop_object("warehouse", &request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteExecution);
    assert_eq!(channel.statements(), vec!["DROP WAREHOUSE wh9"]);
    let body = err.to_json();
    assert_eq!(body["remote"]["code"], "002003");
    assert_eq!(
        body["remote"]["message"],
        "Warehouse 'WH9' does not exist or not authorized."
    );
}

#[tokio::test]
async fn test_remote_rejection_passes_through_unchanged() {
    let channel = Arc::new(ScriptedChannel::new().then_error(
        RemoteExecutionError::rejected("002002", "Object 'WH3' already exists.")
            .with_sql_state("42710"),
    ));
    let tools = tools_from_seed(WAREHOUSE_SEED, channel);

    let err = tools
        .create_object("warehouse", &json!({"name": "wh3", "size": "S"}))
        .await
        .unwrap_err();
    match err {
        ObjectError::RemoteExecution { source, statement, .. } => {
            assert_eq!(source.code, "002002");
            assert_eq!(source.sql_state.as_deref(), Some("42710"));
            assert_eq!(source.message, "Object 'WH3' already exists.");
            assert_eq!(statement, "CREATE WAREHOUSE wh3 SIZE = 'S'");
        }
        other => panic!("expected a remote execution error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_and_cancellation_are_remote_failures() {
    let channel = Arc::new(
        ScriptedChannel::new()
            .then_error(RemoteExecutionError::timeout("statement timed out after 30s"))
            .then_error(RemoteExecutionError::cancelled("statement cancelled by caller")),
    );
    let tools = builtin_tools(channel);

    let err = tools
        .list_objects("warehouse", &ListFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RemoteExecution);
    assert_eq!(err.to_json()["remote"]["failure"], "timeout");

    let err = tools
        .list_objects("role", &ListFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_json()["remote"]["failure"], "cancelled");
    assert_eq!(err.to_json()["object_type"], "role");
}

#[tokio::test]
async fn test_empty_listing_is_not_an_error() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = builtin_tools(channel.clone());

    let objects = tools
        .list_objects("warehouse", &ListFilter::default())
        .await
        .unwrap();
    assert!(objects.is_empty());
    assert_eq!(channel.statements(), vec!["SHOW WAREHOUSES LIMIT 100"]);
}

#[tokio::test]
async fn test_listing_maps_rows_and_applies_limit() {
    let channel = Arc::new(ScriptedChannel::new().then_rows(vec![
        json!({"name": "SALES", "database_name": "ANALYTICS", "schema_name": "PUBLIC", "kind": "TABLE"}),
        json!({"name": "SALES_2024", "database_name": "ANALYTICS", "schema_name": "PUBLIC", "kind": "TABLE"}),
        json!({"name": "SALES_2025", "database_name": "ANALYTICS", "schema_name": "PUBLIC", "kind": "TABLE"}),
    ]));
    let tools = builtin_tools(channel);

    let filter = ListFilter {
        database: Some("analytics".into()),
        schema: Some("public".into()),
        limit: Some(2),
        ..Default::default()
    };
    let objects = tools.list_objects("table", &filter).await.unwrap();

    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].name, "SALES");
    assert_eq!(objects[0].database.as_deref(), Some("ANALYTICS"));
    assert_eq!(objects[1].schema.as_deref(), Some("PUBLIC"));
}

#[tokio::test]
async fn test_unknown_type_lists_available_types() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel);

    let err = tools
        .list_objects("stage", &ListFilter::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_json()["available"], json!(["warehouse"]));
}

#[tokio::test]
async fn test_tool_call_dry_run_never_executes() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let response = tools
        .call(
            "create_object",
            &json!({"object_type": "warehouse", "attributes": {"name": "wh4", "size": "L"}}),
            &CallToolOptions { dry_run: true },
        )
        .await;

    assert!(!response.is_error);
    let body = response.json_content().unwrap();
    assert_eq!(body["dry_run"], true);
    assert_eq!(body["statement"], "CREATE WAREHOUSE wh4 SIZE = 'L'");
    assert!(channel.statements().is_empty());
}

#[tokio::test]
async fn test_tool_call_refusal_is_structured() {
    let channel = Arc::new(ScriptedChannel::new());
    let tools = tools_from_seed(WAREHOUSE_SEED, channel.clone());

    let response = tools
        .call(
            "drop_object",
            &json!({"object_type": "warehouse", "name": "wh1", "if_exists": true, "cascade": true}),
            &CallToolOptions::default(),
        )
        .await;

    assert!(response.is_error);
    let body = response.json_content().unwrap();
    assert_eq!(body["kind"], "refused");
    assert_eq!(body["name"], "wh1");
    assert!(body["request_id"].is_string());
    assert!(channel.statements().is_empty());
}
