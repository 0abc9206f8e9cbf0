//! `frostgate tools`: print the tool definitions the MCP server lists.

use anyhow::Result;
use frostgate_core::FrostgateConfig;
use frostgate_mcp::ToolDefinition;

use super::offline_server;

pub fn run(config: &FrostgateConfig, verbose: bool) -> Result<()> {
    let server = offline_server(config)?;
    let tools = server.tool_definitions();

    println!("\n🔧 Available Tools ({}):", tools.len());
    for tool in &tools {
        println!("   • {} ({})", tool.name, badges(tool).join(", "));

        if let Some(desc) = &tool.description {
            for line in desc.lines() {
                println!("     {}", line);
            }
        }

        if verbose {
            println!(
                "     Schema: {}",
                serde_json::to_string_pretty(&tool.input_schema)?
            );
        }
    }
    Ok(())
}

fn badges(tool: &ToolDefinition) -> Vec<&'static str> {
    let annotations = tool.annotations.as_ref();
    let read_only = annotations.is_some_and(|a| a.read_only == Some(true));
    let destructive = annotations.is_some_and(|a| a.destructive == Some(true));
    let dry_run = annotations.is_some_and(|a| a.dry_run_supported == Some(true));

    let mut badges = vec![if read_only { "read" } else { "write" }];
    if destructive {
        badges.push("destructive");
    }
    if dry_run {
        badges.push("dry-run");
    }
    badges
}
