//! Input binding.
//!
//! Builds the payload for a step from the run context and the outputs of
//! steps that already completed. Per declared input field, first match wins:
//!
//! 1. the reserved query field gets the user's query
//! 2. the reserved history field gets the conversation history
//! 3. an explicit [`FieldBinding`](flowchain_config::FieldBinding) reads the
//!    named field of the named step; if absent the input stays unbound
//! 4. the first entry of `depends_on` whose output has a field of that name
//! 5. otherwise the field is left out of the payload

use flowchain_config::{FlowDefinition, PipelineSettings};
use serde_json::{Map, Value};
use tracing::trace;

use crate::context::ExecutionContext;

/// Reserved input field names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingNames {
    pub query: String,
    pub history: String,
}

impl Default for BindingNames {
    fn default() -> Self {
        Self {
            query: "query".to_string(),
            history: "history".to_string(),
        }
    }
}

impl From<&PipelineSettings> for BindingNames {
    fn from(settings: &PipelineSettings) -> Self {
        Self {
            query: settings.query_field.clone(),
            history: settings.history_field.clone(),
        }
    }
}

/// Build the invocation payload for `flow`.
pub fn bind_inputs(
    flow: &FlowDefinition,
    ctx: &ExecutionContext,
    names: &BindingNames,
) -> Map<String, Value> {
    let mut payload = Map::new();
    for field in flow.input_fields() {
        if let Some(value) = bind_field(flow, field, ctx, names) {
            payload.insert(field.to_string(), value);
        } else {
            trace!(step_id = %flow.id, field, "Input left unbound");
        }
    }
    payload
}

fn bind_field(
    flow: &FlowDefinition,
    field: &str,
    ctx: &ExecutionContext,
    names: &BindingNames,
) -> Option<Value> {
    if field == names.query {
        return Some(Value::String(ctx.query().to_string()));
    }
    if field == names.history {
        return Some(Value::Array(
            ctx.history().iter().map(|turn| turn.to_value()).collect(),
        ));
    }
    if let Some(binding) = flow.binding_for(field) {
        return ctx
            .results()
            .get(&binding.step)
            .and_then(|output| output.get(&binding.field));
    }
    flow.depends_on
        .iter()
        .filter_map(|dep| ctx.results().get(dep))
        .find_map(|output| output.get(field))
}
