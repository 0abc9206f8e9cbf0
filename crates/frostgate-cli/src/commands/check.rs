//! `frostgate check` command implementation.
//!
//! Builds everything the server would build at startup: the registry, the
//! manager coverage check and the statement permission table.

use std::path::Path;

use anyhow::Result;
use frostgate_core::{FrostgateConfig, StatementKind};
use frostgate_sql::PermissionTable;

use super::offline_server;

pub fn run(config: &FrostgateConfig, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => println!("Checking {}", path.display()),
        None => println!("Checking built-in defaults"),
    }

    let server = offline_server(config)?;
    let registry = server.tools().registry();
    let table = PermissionTable::from_config(&config.statement_permissions)?;

    println!("\nResource types ({}):", registry.len());
    println!("   {}", registry.list_types().join(", "));

    println!("\nStatement permissions:");
    if table.allows_all() {
        println!("   allow_all: every statement kind is permitted");
    } else {
        let allowed: Vec<&str> = StatementKind::ALL
            .iter()
            .filter(|kind| table.authorize(**kind).allowed)
            .map(|kind| kind.as_str())
            .collect();
        println!("   allowed: {}", allowed.join(", "));
        println!("   catch_all: {}", table.catch_all());
    }

    println!("\nSQL dialect: {:?}", config.sql.dialect);
    println!(
        "Listing limits: default {}, max {}",
        config.listing.default_limit, config.listing.max_limit
    );
    println!(
        "Tools: {}",
        server
            .tool_definitions()
            .iter()
            .map(|t| t.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    println!("\n✅ Configuration is valid");
    Ok(())
}
