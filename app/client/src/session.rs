//! The inspector session: controller, transcript and debug log together.

use crate::{
    card::AgentCardFetcher,
    chat::{ChatSession, Transcript},
    config::ClientConfig,
    controller::{Completion, ConnectionController, ConnectionState},
    debug_log::DebugLogStore,
    error::{ChannelError, ConnectError},
    headers::HeaderSet,
    transport::{AnyTransport, Transport, TransportEvent},
};
use protocol::{AgentCard, DebugLog, Validators};
use serde_json::{Value, json};

/// What [`Inspector::next_event`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An agent message was appended at `index`.
    Message {
        /// Transcript index.
        index: usize,
        /// Whether the agent finished its turn.
        terminal: bool,
    },
    /// A non-fatal transport failure.
    TransportError(String),
    /// The channel ended; the controller is now failed.
    Closed(Option<String>),
}

/// One inspector session.
///
/// The only mutating surface is `connect`, `disconnect`,
/// `send_user_message` and `clear_log`; inbound frames are pumped with
/// `next_event`. Disconnecting keeps the transcript and the log.
#[derive(Debug)]
pub struct Inspector<T> {
    controller: ConnectionController<T>,
    chat: ChatSession,
    log: DebugLogStore,
}

impl Inspector<AnyTransport> {
    /// Build a session from configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        let fetcher = AgentCardFetcher::new(config.request_timeout(), Validators::default());
        let transport = AnyTransport::new(config.transport, config.request_timeout());
        let controller =
            ConnectionController::new(fetcher, transport).with_metadata(config.message_metadata());
        Self::new(controller, DebugLogStore::with_capacity(config.log_capacity()))
    }
}

impl<T: Transport> Inspector<T> {
    /// Assemble a session.
    pub fn new(controller: ConnectionController<T>, log: DebugLogStore) -> Self {
        Self {
            controller,
            chat: ChatSession::new(),
            log,
        }
    }

    /// Connect to an agent.
    pub async fn connect(&mut self, url: &str, headers: &HeaderSet) -> Result<Completion, ConnectError> {
        self.controller.connect(url, headers, &mut self.log).await
    }

    /// Disconnect. Returns `false` when there was nothing to close.
    pub fn disconnect(&mut self) -> bool {
        self.controller.disconnect()
    }

    /// Send a user message. Returns its transcript index.
    pub fn send_user_message(&mut self, text: &str) -> Result<usize, ChannelError> {
        self.chat
            .send_user_message(text, &mut self.controller, &mut self.log)
    }

    /// Empty the debug log.
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Wait for the next inbound event. `None` when not connected.
    ///
    /// Every frame and every transport failure lands in the debug log as a
    /// response entry.
    ///
    /// Cancel safe.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        let channel = self.controller.channel_mut().ok()?;
        match channel.recv().await {
            TransportEvent::Frame(frame) => {
                let inbound = channel.accept(frame, &mut self.log);
                let terminal = inbound.terminal;
                let index = self.chat.on_agent_message(inbound);
                Some(SessionEvent::Message { index, terminal })
            }
            TransportEvent::Error { error, body } => {
                tracing::warn!("transport error: {error}");
                // Unusable replies are kept verbatim; failures without one are described.
                let data = match body {
                    Some(body) => Value::String(body),
                    None => json!({ "error": error }),
                };
                self.log.append(DebugLog::response(data, None));
                Some(SessionEvent::TransportError(error))
            }
            TransportEvent::Closed(reason) => {
                self.controller.channel_closed(reason.clone());
                Some(SessionEvent::Closed(reason))
            }
        }
    }

    /// Connection state.
    pub fn state(&self) -> &ConnectionState {
        self.controller.state()
    }

    /// Active card and findings.
    pub fn card(&self) -> Option<(&AgentCard, &[String])> {
        self.controller.card()
    }

    /// Active card document as served.
    pub fn raw_card(&self) -> Option<&Value> {
        self.controller.raw_card()
    }

    /// Chat transcript.
    pub fn transcript(&self) -> Transcript<'_> {
        self.chat.transcript()
    }

    /// Chat session, for raw payload lookups.
    pub fn chat(&self) -> &ChatSession {
        &self.chat
    }

    /// Debug log.
    pub fn log(&self) -> &DebugLogStore {
        &self.log
    }

    /// The connection controller.
    pub fn controller(&self) -> &ConnectionController<T> {
        &self.controller
    }

    /// Mutable controller access for split-phase connects.
    pub fn controller_mut(&mut self) -> &mut ConnectionController<T> {
        &mut self.controller
    }

    /// Controller and log together, for applying a split-phase outcome.
    pub fn parts_mut(&mut self) -> (&mut ConnectionController<T>, &mut DebugLogStore) {
        (&mut self.controller, &mut self.log)
    }
}
