//! Chat transcript.

use crate::{
    channel::InboundMessage, controller::ConnectionController, debug_log::DebugLogStore,
    error::ChannelError, transport::Transport,
};
use protocol::ChatMessage;

/// Read-only view of the transcript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transcript<'a> {
    /// Nothing has been exchanged yet.
    Empty,
    /// Messages in arrival order.
    Messages(&'a [ChatMessage]),
}

impl<'a> Transcript<'a> {
    /// Messages, empty for [`Transcript::Empty`].
    pub fn messages(&self) -> &'a [ChatMessage] {
        match self {
            Transcript::Empty => &[],
            Transcript::Messages(messages) => messages,
        }
    }
}

/// Ordered transcript of user and agent messages. Append-only.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// An empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `text` to the agent and record it.
    ///
    /// Fails without side effects unless the controller is connected.
    /// Returns the transcript index of the new message.
    pub fn send_user_message<T: Transport>(
        &mut self,
        text: &str,
        controller: &mut ConnectionController<T>,
        log: &mut DebugLogStore,
    ) -> Result<usize, ChannelError> {
        let channel = controller.channel_mut()?;
        if text.trim().is_empty() {
            return Err(ChannelError::EmptyMessage);
        }
        let request = channel.send(text, log)?;
        self.messages.push(ChatMessage::user(text, request));
        Ok(self.messages.len() - 1)
    }

    /// Record a message from the agent. Returns its transcript index.
    pub fn on_agent_message(&mut self, inbound: InboundMessage) -> usize {
        self.messages.push(ChatMessage::agent(
            inbound.content,
            inbound.errors,
            inbound.frame,
        ));
        self.messages.len() - 1
    }

    /// The transcript.
    pub fn transcript(&self) -> Transcript<'_> {
        if self.messages.is_empty() {
            Transcript::Empty
        } else {
            Transcript::Messages(&self.messages)
        }
    }

    /// One message, for raw payload inspection.
    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been exchanged.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
