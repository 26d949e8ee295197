//! Configuration resolution for the CLI.
//!
//! Resolves config.toml in priority order:
//! 1. `--config <path>` flag (explicit override)
//! 2. `{cwd}/.a2a-inspector/config.toml` (workspace config)
//! 3. `~/.config/a2a-inspector/config.toml` (global default)
//!
//! If the global default doesn't exist, it is generated automatically.

use anyhow::{Context, Result};
use client::ClientConfig;
use std::path::{Path, PathBuf};

/// Default config template generated when no config exists.
pub const DEFAULT_CONFIG: &str = r#"# Default agent URL for `a2a-inspector chat`.
# url = "http://localhost:10000"

# "jsonrpc" (HTTP POST + server-sent events) or "websocket".
transport = "jsonrpc"
request_timeout_secs = 30

# Keep at most this many debug log entries; 0 keeps everything.
debug_log_capacity = 0

# Headers sent with every request. ${VAR} reads the environment.
[headers]
# Authorization = "Bearer ${AGENT_TOKEN}"

# Metadata attached to every outbound message.
[metadata]
"#;

/// Workspace config location, relative to the working directory.
const WORKSPACE_CONFIG: &str = ".a2a-inspector/config.toml";

/// The config file the priority chain selects, whether or not it exists.
pub fn resolve_config_path(config_flag: Option<&Path>) -> PathBuf {
    if let Some(path) = config_flag {
        return path.to_owned();
    }
    let workspace_path = PathBuf::from(WORKSPACE_CONFIG);
    if workspace_path.exists() {
        return workspace_path;
    }
    global_config_path()
}

/// Resolve client config following the priority chain.
pub fn resolve_config(config_flag: Option<&Path>) -> Result<ClientConfig> {
    // 1. Explicit --config flag.
    if let Some(path) = config_flag {
        return ClientConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    // 2. Workspace config, 3. global default.
    load_or_generate(&resolve_config_path(None))
}

/// Load `path`, writing the default template there first if it is missing.
pub fn load_or_generate(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        generate_default_config(path)?;
        tracing::info!("generated default config at {}", path.display());
    }
    ClientConfig::load(path).with_context(|| format!("failed to load config from {}", path.display()))
}

/// Path to the global default config.
pub fn global_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Path to the REPL history file.
pub fn history_path() -> PathBuf {
    config_dir().join("history")
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("a2a-inspector")
}

/// Generate a default config.toml at the given path.
fn generate_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(())
}
