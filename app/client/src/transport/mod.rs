//! Transports carrying the message channel.
//!
//! Implementations use RPITIT; there is no dyn dispatch. [`AnyTransport`]
//! selects one statically from configuration.

use crate::{config::TransportKind, error::ChannelError, headers::HeaderSet};
use serde_json::Value;
use std::{future::Future, time::Duration};
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use url::Url;

pub use jsonrpc::JsonRpcTransport;
pub use sse::SseDecoder;
pub use ws::WebSocketTransport;

pub mod jsonrpc;
pub mod sse;
pub mod ws;

/// Something a transport observed on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// One inbound JSON frame.
    Frame(Value),
    /// A non-fatal failure; the channel stays open.
    Error {
        /// What went wrong.
        error: String,
        /// Raw reply text when the agent answered with something unusable.
        body: Option<String>,
    },
    /// The channel ended, with a reason when one is known.
    Closed(Option<String>),
}

impl TransportEvent {
    /// A failure with nothing received from the agent.
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            body: None,
        }
    }

    /// A reply that arrived but could not be used.
    pub fn unparsed(error: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
            body: Some(body.into()),
        }
    }
}

/// Opens message channels to an agent endpoint.
pub trait Transport: Send + Sync {
    /// Open a channel to `endpoint`, sending `headers` with the handshake or
    /// every request.
    fn open(
        &self,
        endpoint: &Url,
        headers: &HeaderSet,
    ) -> impl Future<Output = Result<ChannelHandle, ChannelError>> + Send;
}

/// Both ends of an open channel plus the task pumping it.
///
/// Dropping the handle aborts the pump.
#[derive(Debug)]
pub struct ChannelHandle {
    outbound: UnboundedSender<Value>,
    inbound: UnboundedReceiver<TransportEvent>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    /// Assemble a handle from its parts.
    pub fn new(
        outbound: UnboundedSender<Value>,
        inbound: UnboundedReceiver<TransportEvent>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            outbound,
            inbound,
            task,
        }
    }

    /// Queue a payload for delivery. Returns immediately.
    pub fn send(&self, payload: Value) -> Result<(), ChannelError> {
        self.outbound.send(payload).map_err(|_| ChannelError::Closed)
    }

    /// Next event in transport order. A vanished pump reads as closed.
    pub async fn recv(&mut self) -> TransportEvent {
        self.inbound
            .recv()
            .await
            .unwrap_or(TransportEvent::Closed(None))
    }

    /// Tear the channel down. Buffered inbound frames are dropped.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Transport chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum AnyTransport {
    /// HTTP JSON-RPC.
    JsonRpc(JsonRpcTransport),
    /// WebSocket.
    WebSocket(WebSocketTransport),
}

impl AnyTransport {
    /// Build the configured transport. `timeout` bounds each request or
    /// the WebSocket handshake.
    pub fn new(kind: TransportKind, timeout: Duration) -> Self {
        match kind {
            TransportKind::JsonRpc => Self::JsonRpc(JsonRpcTransport::new(timeout)),
            TransportKind::WebSocket => Self::WebSocket(WebSocketTransport::new(timeout)),
        }
    }
}

impl Transport for AnyTransport {
    async fn open(&self, endpoint: &Url, headers: &HeaderSet) -> Result<ChannelHandle, ChannelError> {
        match self {
            Self::JsonRpc(transport) => transport.open(endpoint, headers).await,
            Self::WebSocket(transport) => transport.open(endpoint, headers).await,
        }
    }
}
