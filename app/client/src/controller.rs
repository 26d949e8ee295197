//! Connection lifecycle.
//!
//! ```text
//! Idle | Failed | Disconnected | Connected --connect--> Connecting
//! Connecting --card + channel--> Connected
//! Connecting --fetch or open failure--> Failed
//! Connected --channel dropped--> Failed
//! Connecting | Connected --disconnect--> Disconnected
//! ```
//!
//! Every connect and disconnect bumps a generation counter. An attempt
//! completed under an older generation is stale and discarded.

use crate::{
    card::{AgentCardFetcher, FetchedCard, normalize_base_url},
    channel::MessageChannel,
    debug_log::DebugLogStore,
    error::{ChannelError, ConnectError},
    headers::HeaderSet,
    transport::Transport,
};
use protocol::{AgentCard, DebugLog, Validators};
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

/// Where the session stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConnectionState {
    /// Never connected.
    #[default]
    Idle,
    /// A connect attempt is in flight.
    Connecting,
    /// Card fetched and channel open.
    Connected {
        /// The agent's card.
        card: AgentCard,
        /// Card validation findings.
        errors: Vec<String>,
    },
    /// The last attempt or the live channel failed.
    Failed(String),
    /// Closed by the operator.
    Disconnected,
}

impl ConnectionState {
    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected { .. } => "connected",
            Self::Failed(_) => "failed",
            Self::Disconnected => "disconnected",
        }
    }

    /// Whether the state is `Connected`.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// What applying an attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The controller is now connected.
    Connected,
    /// The controller is now failed.
    Failed,
    /// The attempt was superseded and discarded.
    Stale,
}

/// A connect attempt detached from the controller.
///
/// Runs without borrowing the controller; hand the outcome back with
/// [`ConnectionController::complete`].
#[derive(Debug)]
pub struct ConnectAttempt<T> {
    generation: u64,
    base: Url,
    headers: HeaderSet,
    fetcher: Arc<AgentCardFetcher>,
    transport: Arc<T>,
    validators: Validators,
    metadata: Option<Map<String, Value>>,
}

/// The result of a finished attempt, tagged with its generation.
#[derive(Debug)]
pub struct ConnectOutcome {
    generation: u64,
    result: Result<Live, String>,
    trace: Vec<DebugLog>,
}

impl ConnectOutcome {
    /// Generation the attempt was started under.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the attempt succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
struct Live {
    fetched: FetchedCard,
    channel: MessageChannel,
}

impl<T: Transport> ConnectAttempt<T> {
    /// Generation this attempt belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fetch the card, then open the channel against the card's URL.
    pub async fn run(self) -> ConnectOutcome {
        let mut trace = Vec::new();
        let result = self.establish(&mut trace).await;
        ConnectOutcome {
            generation: self.generation,
            result,
            trace,
        }
    }

    async fn establish(&self, trace: &mut Vec<DebugLog>) -> Result<Live, String> {
        let fetched = self
            .fetcher
            .fetch_traced(&self.base, &self.headers, trace)
            .await
            .map_err(|e| e.to_string())?;
        let endpoint = self.endpoint(&fetched.card);
        let handle = self
            .transport
            .open(&endpoint, &self.headers)
            .await
            .map_err(|e| e.to_string())?;
        let channel = MessageChannel::new(handle, &fetched.card, self.validators.clone())
            .with_metadata(self.metadata.clone());
        Ok(Live { fetched, channel })
    }

    /// The card's URL, or the operator's URL when the card has no usable one.
    fn endpoint(&self, card: &AgentCard) -> Url {
        match Url::parse(&card.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => {
                tracing::debug!("card has no usable url, using {}", self.base);
                self.base.clone()
            }
        }
    }
}

/// Owns the connection state, the active card and the live channel.
#[derive(Debug)]
pub struct ConnectionController<T> {
    state: ConnectionState,
    generation: u64,
    fetcher: Arc<AgentCardFetcher>,
    transport: Arc<T>,
    validators: Validators,
    metadata: Option<Map<String, Value>>,
    channel: Option<MessageChannel>,
    raw_card: Option<Value>,
}

impl<T: Transport> ConnectionController<T> {
    /// A controller in `Idle`. Inbound messages are checked with the
    /// fetcher's validators.
    pub fn new(fetcher: AgentCardFetcher, transport: T) -> Self {
        let validators = fetcher.validators().clone();
        Self {
            state: ConnectionState::Idle,
            generation: 0,
            fetcher: Arc::new(fetcher),
            transport: Arc::new(transport),
            validators,
            metadata: None,
            channel: None,
            raw_card: None,
        }
    }

    /// Metadata attached to every outbound message.
    pub fn with_metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Current state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the controller is connected.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    /// The active card and its findings. Only set while connected.
    pub fn card(&self) -> Option<(&AgentCard, &[String])> {
        match &self.state {
            ConnectionState::Connected { card, errors } => Some((card, errors.as_slice())),
            _ => None,
        }
    }

    /// The active card document as served.
    pub fn raw_card(&self) -> Option<&Value> {
        self.raw_card.as_ref()
    }

    /// The live channel.
    pub fn channel_mut(&mut self) -> Result<&mut MessageChannel, ChannelError> {
        match (&self.state, self.channel.as_mut()) {
            (ConnectionState::Connected { .. }, Some(channel)) => Ok(channel),
            _ => Err(ChannelError::NotConnected),
        }
    }

    /// Enter `Connecting` and detach an attempt.
    ///
    /// Bad input is rejected without touching the state. A live channel is
    /// closed first.
    pub fn begin_connect(
        &mut self,
        url: &str,
        headers: &HeaderSet,
    ) -> Result<ConnectAttempt<T>, ConnectError> {
        if matches!(self.state, ConnectionState::Connecting) {
            return Err(ConnectError::AlreadyConnecting);
        }
        let base = normalize_base_url(url)?;
        headers.validate()?;

        self.teardown();
        self.generation += 1;
        self.state = ConnectionState::Connecting;
        tracing::info!("connecting to {base} (generation {})", self.generation);

        Ok(ConnectAttempt {
            generation: self.generation,
            base,
            headers: headers.clone(),
            fetcher: Arc::clone(&self.fetcher),
            transport: Arc::clone(&self.transport),
            validators: self.validators.clone(),
            metadata: self.metadata.clone(),
        })
    }

    /// Apply a finished attempt unless it has been superseded.
    ///
    /// The attempt's card fetch trace is appended to `log` when applied.
    pub fn complete(&mut self, outcome: ConnectOutcome, log: &mut DebugLogStore) -> Completion {
        if outcome.generation != self.generation
            || !matches!(self.state, ConnectionState::Connecting)
        {
            tracing::debug!(
                "discarding stale connect outcome (generation {}, current {})",
                outcome.generation,
                self.generation
            );
            return Completion::Stale;
        }

        log.extend(outcome.trace);
        match outcome.result {
            Ok(Live { fetched, channel }) => {
                tracing::info!(
                    "connected to '{}' with {} card findings",
                    fetched.card.name,
                    fetched.errors.len()
                );
                self.channel = Some(channel);
                self.raw_card = Some(fetched.raw);
                self.state = ConnectionState::Connected {
                    card: fetched.card,
                    errors: fetched.errors,
                };
                Completion::Connected
            }
            Err(reason) => {
                tracing::warn!("connect failed: {reason}");
                self.state = ConnectionState::Failed(reason);
                Completion::Failed
            }
        }
    }

    /// Run a full attempt: begin, run and complete.
    pub async fn connect(
        &mut self,
        url: &str,
        headers: &HeaderSet,
        log: &mut DebugLogStore,
    ) -> Result<Completion, ConnectError> {
        let attempt = self.begin_connect(url, headers)?;
        let outcome = attempt.run().await;
        Ok(self.complete(outcome, log))
    }

    /// Close the session. Returns `false` when there was nothing to close.
    ///
    /// A pending attempt becomes stale.
    pub fn disconnect(&mut self) -> bool {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Connected { .. } => {
                self.generation += 1;
                self.teardown();
                self.state = ConnectionState::Disconnected;
                tracing::info!("disconnected");
                true
            }
            _ => false,
        }
    }

    /// The live channel ended on its own.
    pub fn channel_closed(&mut self, reason: Option<String>) {
        if !self.is_connected() {
            return;
        }
        let reason = reason.unwrap_or_else(|| "connection closed by agent".to_owned());
        tracing::warn!("channel dropped: {reason}");
        self.generation += 1;
        self.teardown();
        self.state = ConnectionState::Failed(reason);
    }

    fn teardown(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.close();
        }
        self.raw_card = None;
    }
}
