use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "frostgate", version, about = "Frostgate object governance engine")]
struct Cli {
    /// Configuration file. Without one the built-in catalog and default
    /// permissions are used.
    #[arg(long, short = 'c', env = "FROSTGATE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the configuration and build the engine, reporting any fault.
    Check,

    /// List registered resource types, or describe one.
    Types {
        /// Resource type to describe
        name: Option<String>,

        /// Print the description as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the MCP tool definitions the server would list.
    Tools {
        /// Include input schemas
        #[arg(long, short = 'v', default_value_t = false)]
        verbose: bool,
    },

    /// Classify each statement in SQL text.
    Classify {
        /// SQL text (one or more statements)
        sql: String,
    },

    /// Check SQL text against the statement permission table.
    Gate {
        /// SQL text (one or more statements)
        sql: String,
    },

    /// Build object statements offline without executing them.
    Plan {
        #[command(subcommand)]
        cmd: commands::plan::PlanCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.cmd {
        Command::Check => commands::check::run(&config, cli.config.as_deref())?,
        Command::Types { name, json } => commands::types::run(&config, name.as_deref(), json)?,
        Command::Tools { verbose } => commands::tools::run(&config, verbose)?,
        Command::Classify { sql } => commands::sql::classify(&config, &sql),
        Command::Gate { sql } => commands::sql::gate(&config, &sql)?,
        Command::Plan { cmd } => commands::plan::run(&config, cmd)?,
    }

    Ok(())
}
