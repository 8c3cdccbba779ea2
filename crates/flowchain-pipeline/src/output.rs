//! Normalized per-step output.

use flowchain_client::ResultEnvelope;
use flowchain_config::FlowDefinition;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Wire name of the running trace field.
pub const TRACE_FIELD: &str = "steps";
pub const RESEARCH_FIELD: &str = "research";
pub const LINKS_FIELD: &str = "links";
pub const ANSWER_FIELD: &str = "answer";

/// Fields captured from every step regardless of its declared outputs.
pub const WELL_KNOWN_FIELDS: [&str; 4] = [TRACE_FIELD, RESEARCH_FIELD, LINKS_FIELD, ANSWER_FIELD];

/// The recorded result of one completed step.
///
/// Well-known fields get typed slots; declared output fields land in
/// `fields`. Serializes flat, using the wire names (`steps`, `research`,
/// `links`, `answer`). Deserializing applies the same typing rules as
/// [`StepOutput::from_envelope`], so a serialized output reads back equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct StepOutput {
    /// Declared output fields present in the response.
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Progress narrative.
    #[serde(rename = "steps", skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,

    /// Opaque payload forwarded to later steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<Value>,

    /// Reference URLs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,

    /// Final answer text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl StepOutput {
    /// Normalize a result envelope against a step's declared outputs.
    ///
    /// Well-known fields are copied when present and well-typed, then every
    /// declared output field present in the result. Everything else is
    /// dropped. A missing `result` yields an empty output.
    pub fn from_envelope(envelope: &ResultEnvelope, flow: &FlowDefinition) -> Self {
        let mut output = Self::default();
        for name in WELL_KNOWN_FIELDS {
            if let Some(value) = envelope.field(name)
                && !output.set_typed(name, value)
            {
                debug!(step_id = %flow.id, field = name, "well-known field has unexpected type");
            }
        }

        for name in flow.output_fields() {
            if output.has_typed(name) {
                continue;
            }
            if let Some(value) = envelope.field(name) {
                output.fields.insert(name.to_string(), value.clone());
            }
        }
        output
    }

    /// Look up a field by wire name, declared or well-known.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            TRACE_FIELD if self.trace.is_some() => self.trace.clone().map(Value::String),
            RESEARCH_FIELD if self.research.is_some() => self.research.clone(),
            LINKS_FIELD if self.links.is_some() => self
                .links
                .as_ref()
                .map(|l| Value::Array(l.iter().cloned().map(Value::String).collect())),
            ANSWER_FIELD if self.answer.is_some() => self.answer.clone().map(Value::String),
            _ => self.fields.get(name).cloned(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.has_typed(name) || self.fields.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.trace.is_none()
            && self.research.is_none()
            && self.links.is_none()
            && self.answer.is_none()
    }

    /// Store a well-known field in its typed slot. Returns false when the
    /// name is not well-known or the value has the wrong shape.
    fn set_typed(&mut self, name: &str, value: &Value) -> bool {
        match name {
            TRACE_FIELD => set_if_some(&mut self.trace, value.as_str().map(str::to_string)),
            RESEARCH_FIELD => set_if_some(&mut self.research, Some(value.clone())),
            LINKS_FIELD => set_if_some(&mut self.links, string_list(value)),
            ANSWER_FIELD => set_if_some(&mut self.answer, value.as_str().map(str::to_string)),
            _ => false,
        }
    }

    fn has_typed(&self, name: &str) -> bool {
        match name {
            TRACE_FIELD => self.trace.is_some(),
            RESEARCH_FIELD => self.research.is_some(),
            LINKS_FIELD => self.links.is_some(),
            ANSWER_FIELD => self.answer.is_some(),
            _ => false,
        }
    }
}

impl From<Map<String, Value>> for StepOutput {
    /// Read back a flat output map. `null` counts as absent, and a
    /// well-known name holding the wrong shape stays a plain field.
    fn from(map: Map<String, Value>) -> Self {
        let mut output = Self::default();
        for (name, value) in map {
            if value.is_null() || output.set_typed(&name, &value) {
                continue;
            }
            output.fields.insert(name, value);
        }
        output
    }
}

fn set_if_some<T>(slot: &mut Option<T>, value: Option<T>) -> bool {
    let typed = value.is_some();
    if typed {
        *slot = value;
    }
    typed
}

/// All-string arrays only; a mixed array is not a link list.
fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}
