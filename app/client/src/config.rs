//! Client configuration.

use crate::{error::ConfigError, headers::HeaderSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{path::Path, str::FromStr, time::Duration};

/// Which transport carries the message channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportKind {
    /// JSON-RPC over HTTP POST, with server-sent events for streams.
    #[default]
    #[serde(rename = "jsonrpc")]
    JsonRpc,
    /// One JSON text frame per payload over a WebSocket.
    #[serde(rename = "websocket")]
    WebSocket,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jsonrpc" | "http" => Ok(Self::JsonRpc),
            "websocket" | "ws" => Ok(Self::WebSocket),
            other => Err(ConfigError::UnknownTransport(other.to_owned())),
        }
    }
}

/// Inspector client configuration, usually loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default agent URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Message channel transport.
    pub transport: TransportKind,
    /// Upper bound on the agent card fetch and non-streaming sends.
    pub request_timeout_secs: u64,
    /// Debug log ring buffer size, `0` for unbounded.
    pub debug_log_capacity: usize,
    /// Headers sent with every request, in file order. Values may
    /// reference `${VAR}`.
    pub headers: Map<String, Value>,
    /// Metadata attached to every outbound message.
    pub metadata: Map<String, Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: None,
            transport: TransportKind::default(),
            request_timeout_secs: 30,
            debug_log_capacity: 0,
            headers: Map::new(),
            metadata: Map::new(),
        }
    }
}

impl ClientConfig {
    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Debug log capacity, `None` when unbounded.
    pub fn log_capacity(&self) -> Option<usize> {
        (self.debug_log_capacity > 0).then_some(self.debug_log_capacity)
    }

    /// Configured headers with environment references expanded.
    pub fn header_set(&self) -> Result<HeaderSet, ConfigError> {
        let mut set = HeaderSet::new();
        for (name, value) in &self.headers {
            let value = match value {
                Value::String(value) => expand_env(value)?,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(ConfigError::InvalidHeaderValue(name.clone())),
            };
            set.insert(name, value);
        }
        Ok(set)
    }

    /// Message metadata, `None` when empty.
    pub fn message_metadata(&self) -> Option<Map<String, Value>> {
        (!self.metadata.is_empty()).then(|| self.metadata.clone())
    }
}

/// Expand `${VAR}` references from the process environment.
pub fn expand_env(value: &str) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated reference is kept literally.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        let var = std::env::var(name).map_err(|_| ConfigError::MissingEnv(name.to_owned()))?;
        out.push_str(&var);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
