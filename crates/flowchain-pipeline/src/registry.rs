//! Immutable flow registry.

use std::collections::HashMap;
use std::sync::Arc;

use flowchain_config::{AppConfig, ConfigError, FlowDefinition};

use crate::error::Result;

/// Step definitions keyed by id, in declaration order.
///
/// Built once and shared read-only between pipeline runs. Declaration order
/// matters: it is the traversal order of the dependency resolver.
#[derive(Debug, Clone, Default)]
pub struct FlowRegistry {
    flows: Vec<FlowDefinition>,
    index: HashMap<String, usize>,
}

/// A registry shared across concurrent runs.
pub type SharedRegistry = Arc<FlowRegistry>;

impl FlowRegistry {
    /// Build a registry, rejecting duplicate ids.
    pub fn new(flows: impl IntoIterator<Item = FlowDefinition>) -> Result<Self> {
        let flows: Vec<FlowDefinition> = flows.into_iter().collect();
        let mut index = HashMap::with_capacity(flows.len());
        for (i, flow) in flows.iter().enumerate() {
            if index.insert(flow.id.clone(), i).is_some() {
                return Err(ConfigError::DuplicateFlow(flow.id.clone()).into());
            }
        }
        Ok(Self { flows, index })
    }

    /// Build a registry from the flows of an app config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.flows.iter().cloned())
    }

    pub fn get(&self, id: &str) -> Option<&FlowDefinition> {
        self.index.get(id).map(|&i| &self.flows[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &FlowDefinition> {
        self.flows.iter()
    }

    /// Ids in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.flows.iter().map(|f| f.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn test_lookup_and_order() {
        let registry = FlowRegistry::new([
            FlowDefinition::new("b", "wf-b"),
            FlowDefinition::new("a", "wf-a"),
        ])
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(registry.get("a").unwrap().workflow_id, "wf-a");
        assert!(registry.contains("b"));
        assert!(registry.get("ghost").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = FlowRegistry::new([
            FlowDefinition::new("a", "wf-1"),
            FlowDefinition::new("a", "wf-2"),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Config(ConfigError::DuplicateFlow(ref id)) if id == "a"
        ));
    }

    #[test]
    fn test_empty_registry() {
        let registry = FlowRegistry::new(Vec::new()).unwrap();
        assert!(registry.is_empty());
    }
}
