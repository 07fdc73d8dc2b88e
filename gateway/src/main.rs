// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # MCP Gateway CLI
//!
//! The `gateway` binary serves either role described in §6.1/§6.3:
//!
//! - `gateway serve` — the main gateway: `/adapters`, `/tools` CRUD plus the
//!   data-plane proxy entry points.
//! - `gateway serve --role toolgateway` — the fixed `toolgateway` workload
//!   the bare `/mcp` route forwards to: just the MCP list-tools/call-tool
//!   surface.
//! - `gateway config show|validate|generate` — configuration management.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gateway::config::GatewayConfig;
use tracing::info;

/// MCP Gateway - adapters/tools control plane and data-plane proxy
#[derive(Parser)]
#[command(name = "gateway")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = "GATEWAY_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "GATEWAY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Which role this process serves
        #[arg(long, value_enum, default_value = "gateway")]
        role: Role,

        /// Bind address
        #[arg(long, env = "GATEWAY_BIND_ADDRESS", default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Role {
    Gateway,
    Toolgateway,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Parse and validate a configuration file
    Validate {
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Serve { role, bind } => {
            let config = GatewayConfig::load_or_default(cli.config)?;
            match role {
                Role::Gateway => {
                    info!("starting gateway role");
                    gateway::server::run(config, &bind).await
                }
                Role::Toolgateway => {
                    info!("starting toolgateway role");
                    gateway::server::run_toolgateway(config, &bind).await
                }
            }
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => {
                let config = GatewayConfig::load_or_default(cli.config)?;
                println!("{}", serde_yaml::to_string(&config)?);
                Ok(())
            }
            ConfigCommand::Validate { file } => {
                let path = file.or(cli.config).context("no configuration file given")?;
                GatewayConfig::from_yaml_file(&path)?;
                println!("{} is valid", path.display());
                Ok(())
            }
        },
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
