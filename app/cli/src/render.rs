//! Plain-text projections of inspector state for the terminal.

use client::ConnectionState;
use protocol::{AgentCard, ChatMessage, DebugLog, LogKind, Sender};
use serde_json::Value;
use std::fmt::Write;

/// Pretty-printed JSON.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Card summary followed by its validation findings.
pub fn card_summary(card: &AgentCard, errors: &[String]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (v{})", card.name, card.version);
    if !card.description.is_empty() {
        let _ = writeln!(out, "{}", card.description);
    }
    let _ = writeln!(out, "URL:       {}", card.url);
    let _ = writeln!(out, "Input:     {}", card.default_input_modes.join(", "));
    let _ = writeln!(out, "Output:    {}", card.default_output_modes.join(", "));
    let capabilities: Vec<String> = card
        .capabilities
        .iter()
        .map(|(name, enabled)| format!("{name}={enabled}"))
        .collect();
    let _ = writeln!(out, "Abilities: {}", capabilities.join(", "));
    let _ = writeln!(out, "Skills:    {}", card.skills.join(", "));
    if errors.is_empty() {
        out.push_str("Validation: ok");
    } else {
        let _ = write!(out, "Validation: {} finding(s)", errors.len());
        for error in errors {
            let _ = write!(out, "\n  ! {error}");
        }
    }
    out
}

/// One-line connection state.
pub fn state_line(state: &ConnectionState) -> String {
    match state {
        ConnectionState::Connected { card, errors } if errors.is_empty() => {
            format!("connected to {}", card.name)
        }
        ConnectionState::Connected { card, errors } => {
            format!("connected to {} ({} card finding(s))", card.name, errors.len())
        }
        ConnectionState::Failed(reason) => format!("failed: {reason}"),
        other => other.name().to_owned(),
    }
}

/// A transcript entry. `number` is the 1-based position shown to the user.
pub fn chat_line(number: usize, message: &ChatMessage) -> String {
    let who = match message.sender {
        Sender::User => "you",
        Sender::Agent => "agent",
    };
    let mut out = format!(
        "#{number} [{}] {who}: {}",
        message.timestamp.format("%H:%M:%S"),
        message.content
    );
    for error in message.validation_errors.iter().flatten() {
        let _ = write!(out, "\n  ! {error}");
    }
    out
}

/// A debug log entry with its payload.
pub fn log_entry(entry: &DebugLog) -> String {
    let arrow = match entry.kind {
        LogKind::Request => "-> request",
        LogKind::Response => "<- response",
    };
    let mut out = format!("[{}] {arrow}", entry.timestamp.format("%H:%M:%S%.3f"));
    if let Some(correlation) = &entry.correlation {
        let _ = write!(out, " ({correlation})");
    }
    let _ = write!(out, "\n{}", pretty(&entry.data));
    out
}
