//! CLI command implementations.

pub mod check;
pub mod plan;
pub mod sql;
pub mod tools;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use frostgate_core::FrostgateConfig;
use frostgate_mcp::{DisconnectedChannel, ObjectServer};

/// Load the configuration at `path`, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FrostgateConfig> {
    match path {
        Some(path) => FrostgateConfig::load_with_context(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(FrostgateConfig::default()),
    }
}

/// A server with no remote side. Everything the CLI does is offline.
pub fn offline_server(config: &FrostgateConfig) -> Result<ObjectServer> {
    ObjectServer::from_config(config, Arc::new(DisconnectedChannel))
        .context("Failed to build the object engine")
}
