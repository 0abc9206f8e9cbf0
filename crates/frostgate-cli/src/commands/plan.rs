//! `frostgate plan`: build object statements through the same validation
//! and managers as the server, without a remote side.

use anyhow::{Context, Result};
use clap::Subcommand;
use frostgate_core::FrostgateConfig;
use frostgate_mcp::PlannedStatement;
use frostgate_policy::{DropRequest, ListFilter};
use serde_json::Value;

use super::offline_server;

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Plan a create statement.
    Create {
        /// Resource type (e.g. warehouse)
        object_type: String,

        /// Attributes as a JSON or YAML mapping, e.g. '{"name": "wh1"}'
        attributes: String,
    },

    /// Plan a list statement.
    List {
        object_type: String,

        /// LIKE pattern (% and _ wildcards)
        #[arg(long)]
        like: Option<String>,

        /// Name prefix
        #[arg(long)]
        starts_with: Option<String>,

        #[arg(long)]
        database: Option<String>,

        #[arg(long)]
        schema: Option<String>,

        #[arg(long)]
        limit: Option<u64>,
    },

    /// Plan a drop statement.
    Drop {
        object_type: String,

        name: String,

        #[arg(long)]
        database: Option<String>,

        #[arg(long)]
        schema: Option<String>,

        /// Argument types of a function or procedure overload, comma
        /// separated. Give the flag with no value for a routine without
        /// arguments.
        #[arg(long, num_args = 0.., value_delimiter = ',')]
        signature: Option<Vec<String>>,

        /// Fail when the object is missing instead of treating it as dropped
        #[arg(long, default_value_t = false)]
        must_exist: bool,

        #[arg(long, default_value_t = false)]
        cascade: bool,
    },
}

pub fn run(config: &FrostgateConfig, cmd: PlanCommand) -> Result<()> {
    let planned = plan(config, cmd)?;
    println!("{}", planned.statement);
    tracing::debug!(object_type = %planned.object_type, operation = %planned.operation, "Planned");
    Ok(())
}

fn plan(config: &FrostgateConfig, cmd: PlanCommand) -> Result<PlannedStatement> {
    let server = offline_server(config)?;
    let tools = server.tools();

    let planned = match cmd {
        PlanCommand::Create {
            object_type,
            attributes,
        } => {
            let attributes: Value = serde_yaml::from_str(&attributes)
                .context("Attributes must be a JSON or YAML mapping")?;
            tools.plan_create(&object_type, &attributes)?
        }
        PlanCommand::List {
            object_type,
            like,
            starts_with,
            database,
            schema,
            limit,
        } => {
            let filter = ListFilter {
                like,
                starts_with,
                database,
                schema,
                limit,
            };
            tools.plan_list(&object_type, &filter)?
        }
        PlanCommand::Drop {
            object_type,
            name,
            database,
            schema,
            signature,
            must_exist,
            cascade,
        } => {
            let request = DropRequest {
                name,
                database,
                schema,
                signature,
                if_exists: !must_exist,
                cascade,
            };
            tools.plan_drop(&object_type, &request)?
        }
    };
    Ok(planned)
}
