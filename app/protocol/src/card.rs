//! Agent card: the manifest an A2A agent publishes about itself.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Typed view over an agent's manifest document.
///
/// Built leniently from whatever JSON the agent served: unknown fields are
/// ignored and missing fields default to empty. Compliance problems are not
/// reported here; they are the business of the card validator, which runs on
/// the raw document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// Agent display name.
    pub name: CompactString,
    /// Agent version string.
    pub version: CompactString,
    /// Service endpoint the agent accepts protocol messages on.
    pub url: String,
    /// Human-readable description.
    pub description: String,
    /// Media types the agent accepts by default.
    pub default_input_modes: Vec<CompactString>,
    /// Media types the agent produces by default.
    pub default_output_modes: Vec<CompactString>,
    /// Boolean capability flags (e.g. `streaming`).
    pub capabilities: BTreeMap<CompactString, bool>,
    /// Skill names.
    pub skills: Vec<CompactString>,
}

impl AgentCard {
    /// Project a raw manifest document into the typed view.
    ///
    /// Returns `None` only when the document is not a JSON object at all.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        Some(Self {
            name: str_field(obj, "name").into(),
            version: str_field(obj, "version").into(),
            url: str_field(obj, "url").to_owned(),
            description: str_field(obj, "description").to_owned(),
            default_input_modes: string_list(obj.get("defaultInputModes")),
            default_output_modes: string_list(obj.get("defaultOutputModes")),
            capabilities: obj
                .get("capabilities")
                .and_then(Value::as_object)
                .map(|caps| {
                    caps.iter()
                        .filter_map(|(k, v)| v.as_bool().map(|b| (CompactString::from(k.as_str()), b)))
                        .collect()
                })
                .unwrap_or_default(),
            skills: obj
                .get("skills")
                .and_then(Value::as_array)
                .map(|skills| skills.iter().filter_map(skill_name).collect())
                .unwrap_or_default(),
        })
    }

    /// Whether the agent advertises streaming responses.
    pub fn supports_streaming(&self) -> bool {
        self.capabilities.get("streaming").copied().unwrap_or(false)
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a str {
    obj.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Vec<CompactString> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(CompactString::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Skills are objects in current agents (`{id, name, ...}`) and bare strings
/// in older ones.
fn skill_name(skill: &Value) -> Option<CompactString> {
    match skill {
        Value::String(s) => Some(s.as_str().into()),
        Value::Object(obj) => obj
            .get("name")
            .or_else(|| obj.get("id"))
            .and_then(Value::as_str)
            .map(CompactString::from),
        _ => None,
    }
}
