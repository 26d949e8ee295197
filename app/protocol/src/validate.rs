//! Compliance checks for agent cards and agent messages.
//!
//! Findings are human-readable strings. An empty list means compliant; a
//! non-empty list never stops a card from being used or a message from being
//! shown.

use serde_json::Value;
use std::{fmt, sync::Arc};

/// Fields every agent card must carry.
const REQUIRED_CARD_FIELDS: &[&str] = &[
    "name",
    "description",
    "url",
    "version",
    "capabilities",
    "defaultInputModes",
    "defaultOutputModes",
    "skills",
];

/// A pure check over a raw document.
pub type ValidateFn = Arc<dyn Fn(&Value) -> Vec<String> + Send + Sync>;

/// The pair of checks applied by the inspector.
#[derive(Clone)]
pub struct Validators {
    /// Applied once to each fetched agent card.
    pub card: ValidateFn,
    /// Applied once to each inbound protocol object.
    pub message: ValidateFn,
}

impl Validators {
    /// Replace the card check.
    pub fn with_card(mut self, check: impl Fn(&Value) -> Vec<String> + Send + Sync + 'static) -> Self {
        self.card = Arc::new(check);
        self
    }

    /// Replace the message check.
    pub fn with_message(
        mut self,
        check: impl Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.message = Arc::new(check);
        self
    }

    /// Run the card check.
    pub fn check_card(&self, card: &Value) -> Vec<String> {
        (self.card)(card)
    }

    /// Run the message check.
    pub fn check_message(&self, message: &Value) -> Vec<String> {
        (self.message)(message)
    }
}

impl Default for Validators {
    fn default() -> Self {
        Self {
            card: Arc::new(validate_agent_card),
            message: Arc::new(validate_message),
        }
    }
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validators").finish_non_exhaustive()
    }
}

/// Built-in agent card rules.
pub fn validate_agent_card(card: &Value) -> Vec<String> {
    let Some(obj) = card.as_object() else {
        return vec!["Agent card must be a JSON object.".to_owned()];
    };
    let mut errors = Vec::new();

    for field in REQUIRED_CARD_FIELDS {
        if !obj.contains_key(*field) {
            errors.push(format!("Required field is missing: '{field}'."));
        }
    }

    if let Some(url) = obj.get("url") {
        let absolute = url
            .as_str()
            .and_then(|u| url::Url::parse(u).ok())
            .is_some_and(|u| matches!(u.scheme(), "http" | "https"));
        if !absolute {
            errors.push(
                "Field 'url' must be an absolute URL starting with http:// or https://.".to_owned(),
            );
        }
    }

    if let Some(caps) = obj.get("capabilities")
        && !caps.is_object()
    {
        errors.push("Field 'capabilities' must be an object.".to_owned());
    }

    for field in ["defaultInputModes", "defaultOutputModes"] {
        if let Some(modes) = obj.get(field) {
            let strings = modes
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !strings {
                errors.push(format!("Field '{field}' must be an array of strings."));
            }
        }
    }

    if let Some(skills) = obj.get("skills") {
        match skills.as_array() {
            None => errors.push("Field 'skills' must be an array of AgentSkill objects.".to_owned()),
            Some(items) if items.is_empty() => errors.push(
                "Field 'skills' array is empty. Agent must have at least one skill if it performs actions."
                    .to_owned(),
            ),
            Some(_) => {}
        }
    }

    errors
}

/// Built-in rules for objects an agent sends back (task, message, updates).
pub fn validate_message(data: &Value) -> Vec<String> {
    let Some(kind) = data.get("kind") else {
        return vec!["Response from agent is missing required 'kind' field.".to_owned()];
    };
    let has_state = |v: &Value| v.get("status").and_then(|s| s.get("state")).is_some();
    let mut errors = Vec::new();

    match kind.as_str() {
        Some("task") => {
            if data.get("id").is_none() {
                errors.push("Task object missing required field: 'id'.".to_owned());
            }
            if !has_state(data) {
                errors.push("Task object missing required field: 'status.state'.".to_owned());
            }
        }
        Some("status-update") => {
            if !has_state(data) {
                errors.push(
                    "StatusUpdate object missing required field: 'status.state'.".to_owned(),
                );
            }
        }
        Some("artifact-update") => match data.get("artifact") {
            None => errors.push("ArtifactUpdate object missing required field: 'artifact'.".to_owned()),
            Some(artifact) if !non_empty_array(artifact.get("parts")) => {
                errors.push("Artifact object must have a non-empty 'parts' array.".to_owned())
            }
            Some(_) => {}
        },
        Some("message") => {
            if !non_empty_array(data.get("parts")) {
                errors.push("Message object must have a non-empty 'parts' array.".to_owned());
            }
            if data.get("role").and_then(Value::as_str) != Some("agent") {
                errors.push("Message from agent must have 'role' set to 'agent'.".to_owned());
            }
        }
        _ => errors.push(format!("Unknown message kind received: '{}'.", display(kind))),
    }

    errors
}

fn non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

fn display(value: &Value) -> String {
    value
        .as_str()
        .map(str::to_owned)
        .unwrap_or_else(|| value.to_string())
}
