//! A2A JSON-RPC framing.
//!
//! Outbound requests are typed; inbound frames stay opaque [`Value`]s and are
//! only *viewed* through [`Reply`], so the raw payload is never reshaped.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON-RPC protocol version tag.
pub const JSONRPC_VERSION: &str = "2.0";
/// Method for a single request/response exchange.
pub const METHOD_SEND: &str = "message/send";
/// Method for a server-sent-event stream of updates.
pub const METHOD_STREAM: &str = "message/stream";

/// Task states after which the agent expects no further updates for a turn.
const TURN_ENDING_STATES: &[&str] = &[
    "completed",
    "canceled",
    "failed",
    "rejected",
    "input-required",
    "auth-required",
];

/// Message author role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Client side.
    User,
    /// Agent side.
    Agent,
}

/// A message part. The inspector only sends text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text {
        /// Text content.
        text: String,
    },
}

/// An outbound protocol message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Always `"message"`.
    pub kind: CompactString,
    /// Author role.
    pub role: Role,
    /// Content parts.
    pub parts: Vec<Part>,
    /// Client-generated message id.
    pub message_id: CompactString,
    /// Conversation context, echoed back from the agent once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<CompactString>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl Message {
    /// A user text message with a fresh id.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            kind: "message".into(),
            role: Role::User,
            parts: vec![Part::Text { text: text.into() }],
            message_id: crate::message::new_id(),
            context_id: None,
            metadata: None,
        }
    }

    /// Attach a conversation context.
    pub fn context_id(mut self, context_id: Option<CompactString>) -> Self {
        self.context_id = context_id;
        self
    }

    /// Attach metadata; an empty map is treated as absent.
    pub fn metadata(mut self, metadata: Option<Map<String, Value>>) -> Self {
        self.metadata = metadata.filter(|m| !m.is_empty());
        self
    }
}

/// Parameters of `message/send` and `message/stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendParams {
    /// The message to deliver.
    pub message: Message,
}

/// A JSON-RPC request carrying a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version tag.
    pub jsonrpc: CompactString,
    /// Request id; responses carry it back.
    pub id: CompactString,
    /// `message/send` or `message/stream`.
    pub method: CompactString,
    /// Call parameters.
    pub params: SendParams,
}

impl Request {
    /// Wrap a message in a send (or stream) request with a fresh id.
    pub fn send(message: Message, streaming: bool) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: crate::message::new_id(),
            method: if streaming { METHOD_STREAM } else { METHOD_SEND }.into(),
            params: SendParams { message },
        }
    }

    /// Whether this request asks for a stream of updates.
    pub fn is_streaming(&self) -> bool {
        self.method == METHOD_STREAM
    }
}

/// Read-only view of an inbound frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reply<'a> {
    /// A JSON-RPC success response.
    Result {
        /// Correlating request id.
        id: Option<&'a str>,
        /// The `result` member.
        result: &'a Value,
    },
    /// A JSON-RPC error response.
    Error {
        /// Correlating request id.
        id: Option<&'a str>,
        /// Error code.
        code: i64,
        /// Error message.
        message: &'a str,
    },
    /// A protocol object pushed without a JSON-RPC envelope.
    Bare(&'a Value),
}

impl<'a> Reply<'a> {
    /// Classify a frame.
    pub fn parse(frame: &'a Value) -> Self {
        let id = frame.get("id").and_then(Value::as_str);
        if let Some(error) = frame.get("error").filter(|e| !e.is_null()) {
            return Reply::Error {
                id,
                code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error"),
            };
        }
        match frame.get("result") {
            Some(result) if frame.get("jsonrpc").is_some() => Reply::Result { id, result },
            _ => Reply::Bare(frame),
        }
    }

    /// Correlating request id, if the frame carries one.
    pub fn id(&self) -> Option<&'a str> {
        match self {
            Reply::Result { id, .. } | Reply::Error { id, .. } => *id,
            Reply::Bare(_) => None,
        }
    }

    /// The protocol object (task, message, update) the frame delivers.
    pub fn body(&self) -> Option<&'a Value> {
        match self {
            Reply::Result { result, .. } => Some(result),
            Reply::Bare(value) => Some(value),
            Reply::Error { .. } => None,
        }
    }

    /// The `kind` discriminator of the delivered object.
    pub fn kind(&self) -> Option<&'a str> {
        self.body()?.get("kind").and_then(Value::as_str)
    }

    /// Conversation context of the delivered object.
    pub fn context_id(&self) -> Option<&'a str> {
        self.body()?.get("contextId").and_then(Value::as_str)
    }

    /// Whether the agent is done with the current turn after this frame.
    ///
    /// A non-streaming request gets exactly one response.
    pub fn is_terminal(&self, streaming: bool) -> bool {
        let body = match self {
            Reply::Error { .. } => return true,
            Reply::Result { .. } if !streaming => return true,
            Reply::Result { result, .. } => *result,
            Reply::Bare(value) => *value,
        };
        match body.get("kind").and_then(Value::as_str) {
            Some("message") => true,
            Some("task") => task_state(body).is_some_and(|s| TURN_ENDING_STATES.contains(&s)),
            Some("status-update") => body.get("final").and_then(Value::as_bool).unwrap_or(false),
            _ => false,
        }
    }

    /// Human-readable text for the transcript.
    pub fn text(&self) -> String {
        let body = match self {
            Reply::Error { code, message, .. } => return format!("Error {code}: {message}"),
            Reply::Result { result, .. } => *result,
            Reply::Bare(value) => *value,
        };
        match body.get("kind").and_then(Value::as_str) {
            Some("message") => parts_text(body.get("parts")),
            Some("task") => {
                let mut text = body
                    .get("status")
                    .and_then(|s| s.get("message"))
                    .map(|m| parts_text(m.get("parts")))
                    .unwrap_or_default();
                for artifact in body
                    .get("artifacts")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                {
                    push_line(&mut text, &parts_text(artifact.get("parts")));
                }
                if text.is_empty() {
                    let id = body.get("id").and_then(Value::as_str).unwrap_or("?");
                    text = format!("[task {id}: {}]", task_state(body).unwrap_or("unknown"));
                }
                text
            }
            Some("status-update") => {
                let text = body
                    .get("status")
                    .and_then(|s| s.get("message"))
                    .map(|m| parts_text(m.get("parts")))
                    .unwrap_or_default();
                if text.is_empty() {
                    format!("[status: {}]", task_state(body).unwrap_or("unknown"))
                } else {
                    text
                }
            }
            Some("artifact-update") => {
                parts_text(body.get("artifact").and_then(|a| a.get("parts")))
            }
            _ => body.to_string(),
        }
    }
}

fn task_state(body: &Value) -> Option<&str> {
    body.get("status")?.get("state")?.as_str()
}

fn parts_text(parts: Option<&Value>) -> String {
    let mut text = String::new();
    for part in parts.and_then(Value::as_array).into_iter().flatten() {
        let line = if let Some(t) = part.get("text").and_then(Value::as_str) {
            t.to_owned()
        } else if let Some(file) = part.get("file") {
            let name = file.get("name").and_then(Value::as_str).unwrap_or("unnamed");
            format!("[file: {name}]")
        } else if let Some(data) = part.get("data") {
            data.to_string()
        } else {
            continue;
        };
        push_line(&mut text, &line);
    }
    text
}

fn push_line(text: &mut String, line: &str) {
    if line.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push('\n');
    }
    text.push_str(line);
}
