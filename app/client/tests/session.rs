//! Inspector session tests: transcript, debug log and inbound pumping.

mod common;

use common::{FakeTransport, Peer, card_json, card_server};
use inspector_client::{
    AgentCardFetcher, ChannelError, ChatSession, ConnectionController, ConnectionState,
    DebugLogStore, HeaderSet, Inspector, SessionEvent, Transcript, TransportEvent,
};
use protocol::{LogKind, Sender};
use serde_json::{Value, json};

async fn connected(streaming: bool) -> (Inspector<FakeTransport>, Peer) {
    let base = card_server(|url| card_json(url, streaming)).await;
    let transport = FakeTransport::default();
    let controller = ConnectionController::new(AgentCardFetcher::default(), transport.clone());
    let mut inspector = Inspector::new(controller, DebugLogStore::new());
    inspector.connect(&base, &HeaderSet::new()).await.unwrap();
    assert!(inspector.state().is_connected());
    inspector.clear_log();
    (inspector, transport.take_peer())
}

fn agent_reply(request: &Value, text: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": request["id"],
        "result": {
            "kind": "message",
            "role": "agent",
            "parts": [{"kind": "text", "text": text}],
            "messageId": "agent-1",
            "contextId": "ctx-42"
        }
    })
}

#[tokio::test]
async fn send_records_transcript_and_log() {
    let (mut inspector, mut peer) = connected(false).await;

    let index = inspector.send_user_message("Test message").unwrap();
    let message = inspector.chat().get(index).unwrap();
    assert_eq!(message.sender, Sender::User);
    assert_eq!(message.content, "Test message");

    let wire = peer.outbound.try_recv().unwrap();
    let entry = inspector.log().last().unwrap();
    assert_eq!(entry.kind, LogKind::Request);
    assert_eq!(entry.data, wire);
    assert_eq!(message.raw_payload.as_ref(), Some(&wire));
    assert_eq!(wire["method"], "message/send");
    assert_eq!(wire["params"]["message"]["parts"][0]["text"], "Test message");
    assert_eq!(entry.correlation.as_deref(), wire["id"].as_str());
}

#[tokio::test]
async fn disconnect_keeps_transcript_and_log() {
    let (mut inspector, _peer) = connected(false).await;
    inspector.send_user_message("hello").unwrap();

    assert!(inspector.disconnect());
    assert_eq!(inspector.state(), &ConnectionState::Disconnected);
    assert!(inspector.card().is_none());
    assert!(matches!(
        inspector.send_user_message("again"),
        Err(ChannelError::NotConnected)
    ));
    assert_eq!(inspector.transcript().messages().len(), 1);
    assert_eq!(inspector.log().len(), 1);
    assert!(inspector.next_event().await.is_none());
}

#[tokio::test]
async fn sending_while_idle_touches_nothing() {
    let transport = FakeTransport::default();
    let mut controller = ConnectionController::new(AgentCardFetcher::default(), transport.clone());
    let mut chat = ChatSession::new();
    let mut log = DebugLogStore::new();

    let result = chat.send_user_message("hi", &mut controller, &mut log);
    assert!(matches!(result, Err(ChannelError::NotConnected)));
    assert_eq!(chat.transcript(), Transcript::Empty);
    assert!(log.is_empty());
    assert_eq!(transport.opened(), 0);
}

#[tokio::test]
async fn blank_messages_are_rejected() {
    let (mut inspector, mut peer) = connected(false).await;
    assert!(matches!(
        inspector.send_user_message("   "),
        Err(ChannelError::EmptyMessage)
    ));
    assert_eq!(inspector.transcript(), Transcript::Empty);
    assert!(peer.outbound.try_recv().is_err());
}

#[tokio::test]
async fn inbound_frames_keep_wire_order() {
    let (mut inspector, mut peer) = connected(true).await;
    inspector.send_user_message("count").unwrap();
    let request = peer.outbound.try_recv().unwrap();
    assert_eq!(request["method"], "message/stream");

    let frames: Vec<Value> = (1..=3)
        .map(|n| {
            let state = if n == 3 { "completed" } else { "working" };
            json!({
                "jsonrpc": "2.0",
                "id": request["id"],
                "result": {
                    "kind": "status-update",
                    "taskId": "t-1",
                    "contextId": "ctx",
                    "status": {"state": state},
                    "final": n == 3
                }
            })
        })
        .collect();
    for frame in &frames {
        peer.reply(frame.clone());
    }

    let mut terminals = Vec::new();
    for _ in 0..3 {
        match inspector.next_event().await {
            Some(SessionEvent::Message { terminal, .. }) => terminals.push(terminal),
            other => panic!("unexpected event {other:?}"),
        }
    }
    assert_eq!(terminals, vec![false, false, true]);

    let responses: Vec<_> = inspector
        .log()
        .all()
        .filter(|e| e.kind == LogKind::Response)
        .map(|e| e.data.clone())
        .collect();
    assert_eq!(responses, frames);

    let agent: Vec<_> = inspector
        .transcript()
        .messages()
        .iter()
        .filter(|m| m.sender == Sender::Agent)
        .map(|m| m.raw_payload.clone().unwrap())
        .collect();
    assert_eq!(agent, frames);
}

#[tokio::test]
async fn message_findings_are_attached_not_fatal() {
    let (mut inspector, peer) = connected(false).await;
    peer.reply(json!({
        "jsonrpc": "2.0",
        "id": "x",
        "result": {"kind": "message", "role": "user", "parts": []}
    }));

    let Some(SessionEvent::Message { index, .. }) = inspector.next_event().await else {
        panic!("expected a message");
    };
    let message = inspector.chat().get(index).unwrap();
    assert!(message.has_validation_errors());
    assert_eq!(message.validation_errors.as_ref().unwrap().len(), 2);
    assert!(inspector.state().is_connected());
}

#[tokio::test]
async fn context_id_is_echoed() {
    let (mut inspector, mut peer) = connected(false).await;
    inspector.send_user_message("first").unwrap();
    let first = peer.outbound.try_recv().unwrap();
    assert!(first["params"]["message"].get("contextId").is_none());

    peer.reply(agent_reply(&first, "hello"));
    inspector.next_event().await.unwrap();

    inspector.send_user_message("second").unwrap();
    let second = peer.outbound.try_recv().unwrap();
    assert_eq!(second["params"]["message"]["contextId"], "ctx-42");
}

#[tokio::test]
async fn error_reply_is_shown() {
    let (mut inspector, peer) = connected(false).await;
    peer.reply(json!({
        "jsonrpc": "2.0",
        "id": "req",
        "error": {"code": -32000, "message": "Agent failed"}
    }));
    let Some(SessionEvent::Message { index, terminal }) = inspector.next_event().await else {
        panic!("expected a message");
    };
    assert!(terminal);
    let message = inspector.chat().get(index).unwrap();
    assert_eq!(message.content, "Error -32000: Agent failed");
    assert!(!message.has_validation_errors());
}

#[tokio::test]
async fn transport_errors_keep_the_channel() {
    let (mut inspector, peer) = connected(false).await;
    peer.inbound
        .send(TransportEvent::unparsed("HTTP 502 Bad Gateway", "<html>bad gateway</html>"))
        .unwrap();
    assert_eq!(
        inspector.next_event().await,
        Some(SessionEvent::TransportError("HTTP 502 Bad Gateway".into()))
    );
    assert!(inspector.state().is_connected());

    let entry = inspector.log().last().unwrap();
    assert_eq!(entry.kind, LogKind::Response);
    assert_eq!(entry.data, json!("<html>bad gateway</html>"));
}

#[tokio::test]
async fn failures_without_a_reply_are_logged() {
    let (mut inspector, peer) = connected(false).await;
    peer.inbound
        .send(TransportEvent::error("connection reset"))
        .unwrap();
    inspector.next_event().await.unwrap();

    assert_eq!(inspector.log().len(), 1);
    let entry = inspector.log().last().unwrap();
    assert_eq!(entry.kind, LogKind::Response);
    assert_eq!(entry.data, json!({"error": "connection reset"}));
    assert_eq!(inspector.transcript(), Transcript::Empty);
}

#[tokio::test]
async fn dropped_channel_fails_the_session() {
    let (mut inspector, peer) = connected(false).await;
    inspector.send_user_message("hi").unwrap();
    drop(peer);

    assert_eq!(inspector.next_event().await, Some(SessionEvent::Closed(None)));
    assert!(matches!(inspector.state(), ConnectionState::Failed(_)));
    assert!(inspector.card().is_none());
    assert!(matches!(
        inspector.send_user_message("again"),
        Err(ChannelError::NotConnected)
    ));
    assert_eq!(inspector.transcript().messages().len(), 1);
}

#[tokio::test]
async fn metadata_is_attached() {
    let base = card_server(|url| card_json(url, false)).await;
    let transport = FakeTransport::default();
    let mut metadata = serde_json::Map::new();
    metadata.insert("source".into(), json!("tests"));
    let controller = ConnectionController::new(AgentCardFetcher::default(), transport.clone())
        .with_metadata(Some(metadata));
    let mut inspector = Inspector::new(controller, DebugLogStore::new());
    inspector.connect(&base, &HeaderSet::new()).await.unwrap();
    let mut peer = transport.take_peer();

    inspector.send_user_message("hi").unwrap();
    let wire = peer.outbound.try_recv().unwrap();
    assert_eq!(wire["params"]["message"]["metadata"]["source"], "tests");
}
