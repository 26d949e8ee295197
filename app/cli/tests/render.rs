//! Tests for terminal projections.

use client::ConnectionState;
use inspector_cli::render;
use protocol::{AgentCard, ChatMessage, DebugLog};
use serde_json::json;

fn card() -> AgentCard {
    AgentCard::from_value(&json!({
        "name": "Echo",
        "version": "2.1",
        "url": "http://localhost:10000/a2a",
        "capabilities": {"streaming": true},
        "defaultInputModes": ["text/plain"],
        "defaultOutputModes": ["text/plain", "application/json"],
        "skills": [{"name": "echo"}]
    }))
    .unwrap()
}

#[test]
fn card_summary_lists_findings() {
    let clean = render::card_summary(&card(), &[]);
    assert!(clean.starts_with("Echo (v2.1)"));
    assert!(clean.contains("text/plain, application/json"));
    assert!(clean.contains("streaming=true"));
    assert!(clean.ends_with("Validation: ok"));

    let errors = vec!["Required field is missing: 'description'.".to_owned()];
    let flagged = render::card_summary(&card(), &errors);
    assert!(flagged.contains("Validation: 1 finding(s)"));
    assert!(flagged.contains("  ! Required field is missing: 'description'."));
}

#[test]
fn state_lines() {
    let connected = ConnectionState::Connected {
        card: card(),
        errors: vec!["x".into()],
    };
    assert_eq!(render::state_line(&connected), "connected to Echo (1 card finding(s))");
    assert_eq!(
        render::state_line(&ConnectionState::Failed("boom".into())),
        "failed: boom"
    );
    assert_eq!(render::state_line(&ConnectionState::Idle), "idle");
}

#[test]
fn chat_lines_show_findings() {
    let user = ChatMessage::user("hi", json!({}));
    assert!(render::chat_line(1, &user).starts_with("#1 ["));
    assert!(render::chat_line(1, &user).ends_with("you: hi"));

    let agent = ChatMessage::agent("yo", vec!["bad role".into()], json!({}));
    let line = render::chat_line(2, &agent);
    assert!(line.contains("agent: yo"));
    assert!(line.ends_with("\n  ! bad role"));
}

#[test]
fn log_entries_show_direction_and_payload() {
    let entry = DebugLog::request(json!({"method": "message/send"}), Some("req-1".into()));
    let text = render::log_entry(&entry);
    assert!(text.contains("-> request (req-1)"));
    assert!(text.contains("\"method\": \"message/send\""));

    let entry = DebugLog::response(json!({}), None);
    assert!(render::log_entry(&entry).contains("<- response"));
}
