//! A2A inspector wire types shared by the client library and the CLI.

pub use card::AgentCard;
pub use message::{ChatMessage, DebugLog, LogKind, Sender};
pub use rpc::{Message, Part, Reply, Request, Role};
pub use validate::{Validators, validate_agent_card, validate_message};

pub mod card;
pub mod message;
pub mod rpc;
pub mod validate;

/// A2A protocol revision the inspector speaks.
pub const PROTOCOL_VERSION: &str = "0.3.0";

/// Well-known location of the agent card relative to the agent's origin.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent-card.json";
