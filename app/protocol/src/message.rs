//! Transcript and debug-log entries.

use chrono::{DateTime, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Generate a fresh entry identifier.
///
/// ULIDs are unique within (and across) sessions and sort by creation time.
pub fn new_id() -> CompactString {
    CompactString::new(ulid::Ulid::new().to_string())
}

/// Who produced a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// The operator, via the inspector.
    User,
    /// The remote agent.
    Agent,
}

/// A single transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Session-unique identifier.
    pub id: CompactString,
    /// Originator.
    pub sender: Sender,
    /// Display text.
    pub content: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Message-level validation findings (agent messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
    /// The exact payload sent or received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<Value>,
}

impl ChatMessage {
    /// A user message carrying the request it produced.
    pub fn user(content: impl Into<String>, request: Value) -> Self {
        Self {
            id: new_id(),
            sender: Sender::User,
            content: content.into(),
            timestamp: Utc::now(),
            validation_errors: None,
            raw_payload: Some(request),
        }
    }

    /// An agent message carrying the frame it was decoded from.
    pub fn agent(content: impl Into<String>, errors: Vec<String>, frame: Value) -> Self {
        Self {
            id: new_id(),
            sender: Sender::Agent,
            content: content.into(),
            timestamp: Utc::now(),
            validation_errors: Some(errors),
            raw_payload: Some(frame),
        }
    }

    /// Whether message-level validation reported anything.
    pub fn has_validation_errors(&self) -> bool {
        self.validation_errors.as_ref().is_some_and(|e| !e.is_empty())
    }
}

/// Direction of a debug-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    /// Outbound payload.
    Request,
    /// Inbound payload.
    Response,
}

/// One observed frame. Created exactly once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugLog {
    /// Unique entry identifier.
    pub id: CompactString,
    /// Direction.
    #[serde(rename = "type")]
    pub kind: LogKind,
    /// Observation time.
    pub timestamp: DateTime<Utc>,
    /// The exact structured payload.
    pub data: Value,
    /// Request id shared by a request and its responses, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CompactString>,
}

impl DebugLog {
    /// Log an outbound payload.
    pub fn request(data: Value, correlation: Option<CompactString>) -> Self {
        Self::new(LogKind::Request, data, correlation)
    }

    /// Log an inbound payload.
    pub fn response(data: Value, correlation: Option<CompactString>) -> Self {
        Self::new(LogKind::Response, data, correlation)
    }

    fn new(kind: LogKind, data: Value, correlation: Option<CompactString>) -> Self {
        Self {
            id: new_id(),
            kind,
            timestamp: Utc::now(),
            data,
            correlation,
        }
    }
}
