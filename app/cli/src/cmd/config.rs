//! Config management commands: show, set.

use crate::cmd::ConfigCommand;
use crate::config::{DEFAULT_CONFIG, resolve_config_path};
use anyhow::{Context, Result};
use client::ClientConfig;
use std::path::Path;
use toml_edit::{DocumentMut, Item};

/// Dispatch config management subcommands.
pub fn run(action: &ConfigCommand, config_flag: Option<&Path>) -> Result<()> {
    let path = resolve_config_path(config_flag);
    match action {
        ConfigCommand::Show => show(&path),
        ConfigCommand::Set { key, value } => {
            set(&path, key, value)?;
            println!("Set {key} = {value} in {}", path.display());
            Ok(())
        }
    }
}

fn show(path: &Path) -> Result<()> {
    if !path.exists() {
        println!("No config file at {}", path.display());
        return Ok(());
    }
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    print!("{contents}");
    Ok(())
}

/// Set a dotted key in the config file at `path`, creating it if needed.
///
/// Numbers and booleans are stored as such, except header values which
/// are always strings. Comments and layout of the file are kept.
/// The result must still be a valid client config.
pub fn set(path: &Path, key: &str, value: &str) -> Result<()> {
    let contents = if path.exists() {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    } else {
        DEFAULT_CONFIG.to_owned()
    };

    let mut doc: DocumentMut = contents
        .parse()
        .with_context(|| format!("parsing {}", path.display()))?;

    // Support dotted keys: "headers.Authorization" -> doc["headers"]["Authorization"].
    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        [section, field] => {
            let table = doc
                .entry(section)
                .or_insert(toml_edit::table())
                .as_table_like_mut()
                .ok_or_else(|| anyhow::anyhow!("'{section}' is not a table"))?;
            let value = if *section == "headers" {
                toml_edit::value(value)
            } else {
                typed(value)
            };
            table.insert(field, value);
        }
        [field] => {
            doc.insert(field, typed(value));
        }
        _ => anyhow::bail!("invalid key format: '{key}' (use 'section.field' or 'field')"),
    }

    let rendered = doc.to_string();
    ClientConfig::from_toml(&rendered).with_context(|| format!("invalid value for '{key}'"))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn typed(value: &str) -> Item {
    if let Ok(n) = value.parse::<i64>() {
        toml_edit::value(n)
    } else if let Ok(b) = value.parse::<bool>() {
        toml_edit::value(b)
    } else {
        toml_edit::value(value)
    }
}
