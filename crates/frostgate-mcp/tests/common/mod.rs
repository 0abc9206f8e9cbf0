//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use frostgate_core::{ListingConfig, RegistrySeed};
use frostgate_mcp::{ExecutionChannel, ManagerSet, ObjectTools, RemoteExecutionError, Row};
use frostgate_policy::RegistryBuilder;
use frostgate_sql::StatementClassifier;
use serde_json::Value;

/// A warehouse type with a required size and one protected name.
pub const WAREHOUSE_SEED: &str = r#"
version: "1"
resource_types:
  - name: warehouse
    keyword: WAREHOUSE
    scope: standalone
    protected_names: [wh1]
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
"#;

/// Channel that records every statement and answers from a script.
///
/// Once the script runs out every statement succeeds with no rows.
#[derive(Default)]
pub struct ScriptedChannel {
    statements: Mutex<Vec<String>>,
    responses: Mutex<VecDeque<Result<Vec<Row>, RemoteExecutionError>>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_rows(self, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect();
        self.responses.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn then_error(self, error: RemoteExecutionError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Statements received so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionChannel for ScriptedChannel {
    async fn execute(&self, statement: &str) -> Result<Vec<Row>, RemoteExecutionError> {
        self.statements.lock().unwrap().push(statement.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Object tools over a registry built from `seed` alone.
pub fn tools_from_seed(seed: &str, channel: Arc<ScriptedChannel>) -> ObjectTools {
    let mut builder = RegistryBuilder::new();
    builder
        .register_seed(&RegistrySeed::from_yaml(seed).unwrap())
        .unwrap();
    ObjectTools::new(
        Arc::new(builder.build()),
        Arc::new(ManagerSet::standard(StatementClassifier::default())),
        channel,
        ListingConfig::default(),
    )
    .unwrap()
}

/// Object tools over the built-in catalog.
pub fn builtin_tools(channel: Arc<ScriptedChannel>) -> ObjectTools {
    let registry = RegistryBuilder::with_builtin().unwrap().build();
    ObjectTools::new(
        Arc::new(registry),
        Arc::new(ManagerSet::standard(StatementClassifier::default())),
        channel,
        ListingConfig::default(),
    )
    .unwrap()
}
