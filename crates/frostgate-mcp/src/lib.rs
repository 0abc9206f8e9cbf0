//! # frostgate-mcp
//!
//! Object tools and the MCP server for Frostgate.
//!
//! Three generic tools (`create_object`, `list_objects`, `drop_object`)
//! cover every registered resource type. An optional fourth tool,
//! `execute_statement`, runs free-form SQL through the permission gate.
//!
//! ## Architecture
//!
//! ```text
//! MCP client
//!       │  tools/call
//!       ▼
//! ┌──────────────────────┐
//! │ ObjectServer         │
//! │ 1. Registry lookup   │  ← frostgate-policy
//! │ 2. Validate          │  ← frostgate-policy
//! │ 3. Build statement   │  ← manager::ObjectManager
//! │ 4. Gate (free-form)  │  ← frostgate-sql
//! │ 5. Execute           │  ← caller's ExecutionChannel
//! │ 6. Return JSON       │
//! └──────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use frostgate_core::FrostgateConfig;
//! use frostgate_mcp::ObjectServer;
//!
//! let config = FrostgateConfig::load_with_context("frostgate.yaml")?;
//! let server = ObjectServer::from_config(&config, Arc::new(my_channel))?;
//! server.run_stdio().await?;
//! ```

pub mod channel;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod manager;
pub mod protocol;
pub mod server;
pub mod statement;

pub use channel::{
    DisconnectedChannel, ExecutionChannel, FailureMode, RemoteExecutionError, Row,
};
pub use descriptor::{DropConfirmation, ObjectDescriptor, Operation, PlannedStatement};
pub use error::{ErrorKind, ObjectError, ServerError};
pub use factory::ObjectTools;
pub use manager::{GenericManager, ManagerSet, ObjectManager, RoutineManager, TableManager, ViewManager};
pub use protocol::{
    CallToolOptions, CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse,
    ToolAnnotations, ToolContent, ToolDefinition,
};
pub use server::ObjectServer;
pub use statement::StatementTool;
