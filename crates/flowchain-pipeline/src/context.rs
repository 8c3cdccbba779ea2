//! Per-run execution context.

use flowchain_config::ordered::pairs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};

use crate::output::StepOutput;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub message: String,
}

impl ChatTurn {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            message: message.into(),
        }
    }

    pub fn assistant(message: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            message: message.into(),
        }
    }

    /// Wire form sent to flows: `{ "role": ..., "message": ... }`.
    pub fn to_value(&self) -> Value {
        let role = match self.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        json!({ "role": role, "message": self.message })
    }
}

/// Completed step outputs in execution order.
///
/// Serializes as a JSON object keyed by step id, preserving order, so a
/// caller can hand previously collected results back for single-step runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResults {
    entries: Vec<(String, StepOutput)>,
}

impl StepResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step's output. Re-recording a step replaces its output in place.
    pub fn insert(&mut self, step_id: impl Into<String>, output: StepOutput) {
        let step_id = step_id.into();
        match self.entries.iter_mut().find(|(id, _)| *id == step_id) {
            Some((_, existing)) => *existing = output,
            None => self.entries.push((step_id, output)),
        }
    }

    pub fn get(&self, step_id: &str) -> Option<&StepOutput> {
        self.entries
            .iter()
            .find(|(id, _)| id == step_id)
            .map(|(_, output)| output)
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.get(step_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StepOutput)> {
        self.entries.iter().map(|(id, output)| (id.as_str(), output))
    }

    /// Step ids in the order they completed.
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, StepOutput)> for StepResults {
    fn from_iter<I: IntoIterator<Item = (String, StepOutput)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (id, output) in iter {
            results.insert(id, output);
        }
        results
    }
}

impl Serialize for StepResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        pairs::serialize(&self.entries, serializer)
    }
}

impl<'de> Deserialize<'de> for StepResults {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries: Vec<(String, StepOutput)> = pairs::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

/// State of one pipeline invocation.
///
/// Query and history are fixed for the run; results grow as steps complete.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    query: String,
    history: Vec<ChatTurn>,
    results: StepResults,
}

impl ExecutionContext {
    pub fn new(query: impl Into<String>, history: Vec<ChatTurn>) -> Self {
        Self::with_results(query, history, StepResults::new())
    }

    /// Context seeded with results collected by an earlier run.
    pub fn with_results(
        query: impl Into<String>,
        history: Vec<ChatTurn>,
        results: StepResults,
    ) -> Self {
        Self {
            query: query.into(),
            history,
            results,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn results(&self) -> &StepResults {
        &self.results
    }

    pub fn record(&mut self, step_id: impl Into<String>, output: StepOutput) {
        self.results.insert(step_id, output);
    }

    pub fn into_results(self) -> StepResults {
        self.results
    }
}
