//! mcpgate CLI, the main entry point.
//!
//! Commands:
//! - `serve`: Start the HTTP gateway
//! - `call`: Dispatch one request in-process and print the response
//! - `probe`: Check whether the remote gateway is reachable
//! - `status`: Show the effective configuration
//! - `init`: Write a default config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "mcpgate",
    about = "mcpgate: tiered request router for service actions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to ~/.mcpgate/config.toml)
    #[arg(short, long, global = true, env = "MCPGATE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Dispatch a single request and print the response
    Call {
        /// Target service (e.g. supabase)
        service: String,

        /// Action to run (e.g. list_tables)
        action: String,

        /// Parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,

        /// Also print the tier-by-tier trace
        #[arg(long)]
        trace: bool,
    },

    /// Probe the remote gateway once
    Probe,

    /// Show effective configuration
    Status,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Call {
            service,
            action,
            params,
            trace,
        } => commands::call::run(config_path, service, action, params, trace).await?,
        Commands::Probe => commands::probe::run(config_path).await?,
        Commands::Status => commands::status::run(config_path).await?,
        Commands::Init { force } => commands::init::run(config_path, force).await?,
    }

    Ok(())
}
