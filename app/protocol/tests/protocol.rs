//! Protocol type tests: card projection, request framing, reply views.

use inspector_protocol::{
    AGENT_CARD_PATH, AgentCard, ChatMessage, DebugLog, LogKind, Message, PROTOCOL_VERSION, Reply,
    Request, Sender,
};
use serde_json::json;

fn card_json() -> serde_json::Value {
    json!({
        "name": "Test Agent",
        "description": "An agent for testing.",
        "url": "http://test-agent.com/a2a",
        "version": "1.0.0",
        "capabilities": {
            "streaming": true,
            "pushNotifications": false,
            "extensions": []
        },
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain"],
        "skills": [{"id": "test-skill", "name": "Test Skill"}, "legacy-skill"],
        "provider": {"organization": "ignored"}
    })
}

#[test]
fn constants() {
    assert_eq!(PROTOCOL_VERSION, "0.3.0");
    assert_eq!(AGENT_CARD_PATH, "/.well-known/agent-card.json");
}

#[test]
fn card_projection_keeps_known_fields() {
    let card = AgentCard::from_value(&card_json()).unwrap();
    assert_eq!(card.name, "Test Agent");
    assert_eq!(card.version, "1.0.0");
    assert_eq!(card.url, "http://test-agent.com/a2a");
    assert_eq!(card.default_input_modes, vec!["text/plain"]);
    assert_eq!(card.skills, vec!["Test Skill", "legacy-skill"]);
    // Non-boolean capability entries are dropped from the typed view.
    assert_eq!(card.capabilities.len(), 2);
    assert!(card.supports_streaming());
}

#[test]
fn card_projection_tolerates_missing_fields() {
    let card = AgentCard::from_value(&json!({"name": "Incomplete"})).unwrap();
    assert_eq!(card.name, "Incomplete");
    assert!(card.url.is_empty());
    assert!(card.skills.is_empty());
    assert!(!card.supports_streaming());
}

#[test]
fn card_projection_rejects_non_objects() {
    assert!(AgentCard::from_value(&json!(["not", "a", "card"])).is_none());
}

#[test]
fn send_request_shape() {
    let message = Message::user_text("Test message");
    let request = Request::send(message, false);
    let value = serde_json::to_value(&request).unwrap();

    assert_eq!(value["jsonrpc"], "2.0");
    assert_eq!(value["method"], "message/send");
    assert_eq!(value["params"]["message"]["role"], "user");
    assert_eq!(value["params"]["message"]["kind"], "message");
    assert_eq!(value["params"]["message"]["parts"][0]["kind"], "text");
    assert_eq!(value["params"]["message"]["parts"][0]["text"], "Test message");
    assert!(value["params"]["message"]["messageId"].is_string());
    assert!(value["params"]["message"].get("contextId").is_none());
    assert!(value["params"]["message"].get("metadata").is_none());
}

#[test]
fn stream_request_carries_context_and_metadata() {
    let mut metadata = serde_json::Map::new();
    metadata.insert("priority".into(), json!("high"));
    let message = Message::user_text("hi")
        .context_id(Some("ctx-1".into()))
        .metadata(Some(metadata));
    let request = Request::send(message, true);
    assert!(request.is_streaming());

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["method"], "message/stream");
    assert_eq!(value["params"]["message"]["contextId"], "ctx-1");
    assert_eq!(value["params"]["message"]["metadata"]["priority"], "high");
}

#[test]
fn empty_metadata_is_omitted() {
    let message = Message::user_text("hi").metadata(Some(serde_json::Map::new()));
    assert!(message.metadata.is_none());
}

#[test]
fn reply_result_message_is_terminal() {
    let frame = json!({
        "jsonrpc": "2.0",
        "id": "req-1",
        "result": {
            "kind": "message",
            "role": "agent",
            "parts": [{"kind": "text", "text": "Hi there!"}],
            "messageId": "m-1",
            "contextId": "ctx-9"
        }
    });
    let reply = Reply::parse(&frame);
    assert_eq!(reply.id(), Some("req-1"));
    assert_eq!(reply.kind(), Some("message"));
    assert_eq!(reply.context_id(), Some("ctx-9"));
    assert_eq!(reply.text(), "Hi there!");
    assert!(reply.is_terminal(true));
    assert!(reply.is_terminal(false));
}

#[test]
fn reply_error() {
    let frame = json!({
        "jsonrpc": "2.0",
        "id": "req-2",
        "error": {"code": -32000, "message": "Agent failed"}
    });
    let reply = Reply::parse(&frame);
    assert!(matches!(reply, Reply::Error { code: -32000, message: "Agent failed", .. }));
    assert!(reply.body().is_none());
    assert_eq!(reply.text(), "Error -32000: Agent failed");
    assert!(reply.is_terminal(true));
}

#[test]
fn null_error_next_to_a_result_is_a_result() {
    let frame = json!({
        "jsonrpc": "2.0",
        "id": "req-3",
        "result": {"kind": "message", "role": "agent", "parts": [{"kind": "text", "text": "ok"}]},
        "error": null
    });
    let reply = Reply::parse(&frame);
    assert!(matches!(reply, Reply::Result { id: Some("req-3"), .. }));
    assert_eq!(reply.text(), "ok");
}

#[test]
fn streaming_updates_end_on_final() {
    let working = json!({
        "jsonrpc": "2.0",
        "id": "req-3",
        "result": {
            "kind": "status-update",
            "taskId": "t-1",
            "contextId": "ctx",
            "status": {"state": "working"},
            "final": false
        }
    });
    let done = json!({
        "jsonrpc": "2.0",
        "id": "req-3",
        "result": {
            "kind": "status-update",
            "taskId": "t-1",
            "contextId": "ctx",
            "status": {"state": "completed"},
            "final": true
        }
    });
    assert!(!Reply::parse(&working).is_terminal(true));
    assert_eq!(Reply::parse(&working).text(), "[status: working]");
    assert!(Reply::parse(&done).is_terminal(true));
    // Without streaming, any response ends the turn.
    assert!(Reply::parse(&working).is_terminal(false));
}

#[test]
fn task_text_collects_artifacts() {
    let frame = json!({
        "jsonrpc": "2.0",
        "id": "req-4",
        "result": {
            "kind": "task",
            "id": "t-2",
            "contextId": "ctx",
            "status": {"state": "completed"},
            "artifacts": [
                {"artifactId": "a", "parts": [{"kind": "text", "text": "first"}]},
                {"artifactId": "b", "parts": [{"kind": "data", "data": {"n": 1}}]}
            ]
        }
    });
    let reply = Reply::parse(&frame);
    assert_eq!(reply.text(), "first\n{\"n\":1}");
    assert!(reply.is_terminal(true));
}

#[test]
fn bare_frames_are_viewed_as_bodies() {
    let frame = json!({"kind": "artifact-update", "artifact": {"parts": [{"text": "chunk"}]}});
    let reply = Reply::parse(&frame);
    assert!(matches!(reply, Reply::Bare(_)));
    assert_eq!(reply.text(), "chunk");
    assert!(!reply.is_terminal(true));
}

#[test]
fn chat_message_constructors() {
    let request = json!({"id": "r"});
    let user = ChatMessage::user("Hello", request.clone());
    assert_eq!(user.sender, Sender::User);
    assert!(user.validation_errors.is_none());
    assert_eq!(user.raw_payload, Some(request));

    let agent = ChatMessage::agent("Hi", vec!["A minor warning".into()], json!({}));
    assert_eq!(agent.sender, Sender::Agent);
    assert!(agent.has_validation_errors());
    assert_ne!(user.id, agent.id);
}

#[test]
fn debug_log_serializes_type_tag() {
    let entry = DebugLog::request(json!({"url": "/test"}), Some("req-1".into()));
    assert_eq!(entry.kind, LogKind::Request);
    let value = serde_json::to_value(&entry).unwrap();
    assert_eq!(value["type"], "request");
    assert_eq!(value["data"]["url"], "/test");
    assert_eq!(value["correlation"], "req-1");
}

#[test]
fn raw_payload_roundtrips_verbatim() {
    let frame = json!({
        "jsonrpc": "2.0",
        "id": "x",
        "result": {"zeta": 1, "alpha": [true, null, 2.5], "kind": "message"}
    });
    let message = ChatMessage::agent("", vec![], frame.clone());
    let text = serde_json::to_string(message.raw_payload.as_ref().unwrap()).unwrap();
    assert_eq!(text, serde_json::to_string(&frame).unwrap());
    // Key order is preserved, not re-sorted.
    assert!(text.find("zeta").unwrap() < text.find("alpha").unwrap());
}
