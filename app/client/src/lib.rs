//! A2A inspector client library: agent card retrieval, the connection state
//! machine, message channels, the chat transcript and the debug log. Used by
//! the `a2a-inspector` CLI.

pub use card::{AgentCardFetcher, CARD_TRACE, FetchedCard, card_url, normalize_base_url};
pub use channel::{InboundMessage, MessageChannel};
pub use chat::{ChatSession, Transcript};
pub use config::{ClientConfig, TransportKind};
pub use controller::{
    Completion, ConnectAttempt, ConnectOutcome, ConnectionController, ConnectionState,
};
pub use debug_log::DebugLogStore;
pub use error::{ChannelError, ConfigError, ConnectError, FetchError};
pub use headers::HeaderSet;
pub use session::{Inspector, SessionEvent};
pub use transport::{
    AnyTransport, ChannelHandle, JsonRpcTransport, Transport, TransportEvent, WebSocketTransport,
};

pub mod card;
pub mod channel;
pub mod chat;
pub mod config;
pub mod controller;
pub mod debug_log;
pub mod error;
pub mod headers;
pub mod session;
pub mod transport;
