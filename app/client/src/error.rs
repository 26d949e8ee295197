//! Error types for the inspector client.

use std::path::PathBuf;
use thiserror::Error;

/// Operator input rejected before any network attempt.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The agent URL was blank.
    #[error("agent URL is empty")]
    EmptyUrl,
    /// The agent URL could not be parsed.
    #[error("invalid agent URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Only http and https agents are supported.
    #[error("unsupported URL scheme '{0}'")]
    UnsupportedScheme(String),
    /// A header name is not a valid HTTP token.
    #[error("invalid header name '{0}'")]
    InvalidHeaderName(String),
    /// A header value contains forbidden characters.
    #[error("invalid value for header '{0}'")]
    InvalidHeaderValue(String),
    /// A `-H name:value` argument without a colon.
    #[error("malformed header '{0}', expected 'name: value'")]
    MalformedHeader(String),
    /// An `${VAR}` reference to an unset environment variable.
    #[error("environment variable '{0}' is not set")]
    MissingEnv(String),
    /// Unknown transport name.
    #[error("unknown transport '{0}', expected 'jsonrpc' or 'websocket'")]
    UnknownTransport(String),
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Agent card retrieval failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Bad URL or headers.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The request never produced a response.
    #[error("failed to connect to agent: {0}")]
    Network(String),
    /// The agent answered with a non-success status.
    #[error("agent card request failed with status {status}")]
    Status { status: u16, body: String },
    /// The body is not a JSON object.
    #[error("failed to parse agent card: {0}")]
    Parse(String),
}

/// Rejected `connect` call.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// A connect attempt is already in flight.
    #[error("already connecting")]
    AlreadyConnecting,
    /// Bad URL or headers.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Message channel failure.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The controller is not in the connected state.
    #[error("not connected")]
    NotConnected,
    /// Blank user message.
    #[error("message is empty")]
    EmptyMessage,
    /// The transport has shut down.
    #[error("channel closed")]
    Closed,
    /// The transport could not be opened.
    #[error("failed to open channel: {0}")]
    Open(String),
    /// The outbound request could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}
