//! Ordered message exchange with a connected agent.

use crate::{
    debug_log::DebugLogStore,
    error::ChannelError,
    transport::{ChannelHandle, TransportEvent},
};
use compact_str::CompactString;
use protocol::{AgentCard, DebugLog, Message, Reply, Request, Validators};
use serde_json::{Map, Value};

/// An inbound frame classified for the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// The frame exactly as received.
    pub frame: Value,
    /// Display text.
    pub content: String,
    /// Message-level validation findings.
    pub errors: Vec<String>,
    /// Whether the agent is done with the current turn.
    pub terminal: bool,
}

/// A2A message exchange over an open transport channel.
///
/// Every payload sent and every frame accepted is mirrored into the debug
/// log, in wire order.
#[derive(Debug)]
pub struct MessageChannel {
    handle: ChannelHandle,
    streaming: bool,
    context_id: Option<CompactString>,
    metadata: Option<Map<String, Value>>,
    validators: Validators,
}

impl MessageChannel {
    /// Wrap an open handle. Streaming follows the card's capabilities.
    pub fn new(handle: ChannelHandle, card: &AgentCard, validators: Validators) -> Self {
        Self {
            handle,
            streaming: card.supports_streaming(),
            context_id: None,
            metadata: None,
            validators,
        }
    }

    /// Metadata attached to every outbound message.
    pub fn with_metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata.filter(|m| !m.is_empty());
        self
    }

    /// Whether requests use `message/stream`.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Conversation context learned from the agent.
    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    /// Send a user text message, returning the exact request payload.
    pub fn send(&mut self, content: &str, log: &mut DebugLogStore) -> Result<Value, ChannelError> {
        let message = Message::user_text(content)
            .context_id(self.context_id.clone())
            .metadata(self.metadata.clone());
        let request = Request::send(message, self.streaming);
        let payload = serde_json::to_value(&request)?;
        self.handle.send(payload.clone())?;
        tracing::debug!("sent {} {}", request.method, request.id);
        log.append(DebugLog::request(payload.clone(), Some(request.id)));
        Ok(payload)
    }

    /// Next transport event, in the order the transport delivered it.
    pub async fn recv(&mut self) -> TransportEvent {
        self.handle.recv().await
    }

    /// Record and classify one inbound frame.
    pub fn accept(&mut self, frame: Value, log: &mut DebugLogStore) -> InboundMessage {
        let reply = Reply::parse(&frame);
        let correlation = reply.id().map(CompactString::from);
        let errors = reply
            .body()
            .map(|body| self.validators.check_message(body))
            .unwrap_or_default();
        let content = reply.text();
        let terminal = reply.is_terminal(self.streaming);
        if self.context_id.is_none()
            && let Some(context_id) = reply.context_id()
        {
            self.context_id = Some(context_id.into());
        }
        tracing::debug!(
            "received {} frame{}",
            reply.kind().unwrap_or("untyped"),
            if terminal { " (end of turn)" } else { "" }
        );

        log.append(DebugLog::response(frame.clone(), correlation));
        InboundMessage {
            frame,
            content,
            errors,
            terminal,
        }
    }

    /// Close the underlying transport channel.
    pub fn close(self) {
        self.handle.close();
    }
}
