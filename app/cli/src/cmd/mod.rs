//! CLI argument parsing and command dispatch.

use anyhow::Result;
use clap::{Parser, Subcommand};
use client::{ClientConfig, HeaderSet, TransportKind};
use std::path::PathBuf;

pub mod card;
pub mod chat;
pub mod config;
pub mod send;

/// Inspect and chat with A2A agents.
#[derive(Parser, Debug)]
#[command(name = "a2a-inspector", about = "Inspect and chat with A2A agents")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Config file override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Transport override: jsonrpc or websocket.
    #[arg(long, global = true)]
    pub transport: Option<TransportKind>,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and validate an agent card.
    Card(card::Card),
    /// Send a one-shot message to an agent.
    Send(send::Send),
    /// Start an interactive chat REPL.
    Chat(chat::Chat),
    /// Manage inspector configuration.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

/// Config management subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Set a configuration value.
    Set {
        /// Configuration key, e.g. `transport` or `headers.Authorization`.
        key: String,
        /// Configuration value.
        value: String,
    },
}

impl Cli {
    /// Resolve configuration and run the selected command.
    pub async fn run(self) -> Result<()> {
        let Cli {
            command,
            config: config_path,
            transport,
        } = self;
        let load = || -> Result<ClientConfig> {
            let mut config = crate::config::resolve_config(config_path.as_deref())?;
            if let Some(transport) = transport {
                config.transport = transport;
            }
            Ok(config)
        };

        match command {
            Command::Card(cmd) => cmd.run(&load()?).await,
            Command::Send(cmd) => cmd.run(&load()?).await,
            Command::Chat(cmd) => cmd.run(load()?).await,
            Command::Config { action } => config::run(&action, config_path.as_deref()),
        }
    }
}

/// Configured headers overlaid with `-H name:value` arguments.
pub fn header_set(config: &ClientConfig, pairs: &[String]) -> Result<HeaderSet> {
    let mut headers = config.header_set()?;
    for pair in pairs {
        headers.insert_pair(pair)?;
    }
    Ok(headers)
}
