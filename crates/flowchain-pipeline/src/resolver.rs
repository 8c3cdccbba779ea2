//! Dependency resolution.
//!
//! Produces a linear execution order in which every step appears after all
//! of its dependencies. Traversal is depth-first over registry declaration
//! order, visiting each step's dependencies in their declared order before
//! appending the step. Binding sources count as extra dependency edges,
//! visited after `depends_on`.

use std::collections::HashMap;

use flowchain_config::FlowDefinition;

use crate::error::{PipelineError, Result};
use crate::registry::FlowRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Compute the execution order for every step in the registry.
pub fn resolve_order(registry: &FlowRegistry) -> Result<Vec<String>> {
    let mut resolver = Resolver {
        registry,
        marks: HashMap::with_capacity(registry.len()),
        path: Vec::new(),
        order: Vec::with_capacity(registry.len()),
    };
    for id in registry.ids() {
        resolver.visit(id)?;
    }
    Ok(resolver.order)
}

/// Ordering edges of a step: `depends_on`, then binding sources not already listed.
pub fn dependency_edges(flow: &FlowDefinition) -> Vec<&str> {
    let mut edges: Vec<&str> = Vec::with_capacity(flow.depends_on.len() + flow.bindings.len());
    for dep in flow
        .depends_on
        .iter()
        .chain(flow.bindings.iter().map(|b| &b.step))
    {
        if !edges.contains(&dep.as_str()) {
            edges.push(dep);
        }
    }
    edges
}

struct Resolver<'a> {
    registry: &'a FlowRegistry,
    marks: HashMap<&'a str, Mark>,
    path: Vec<&'a str>,
    order: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn visit(&mut self, id: &'a str) -> Result<()> {
        match self.marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => return Err(self.cycle_error(id)),
            None => {}
        }

        let Some(flow) = self.registry.get(id) else {
            return Err(PipelineError::UnknownStep(id.to_string()));
        };

        self.marks.insert(id, Mark::InProgress);
        self.path.push(id);

        for dep in dependency_edges(flow) {
            if !self.registry.contains(dep) {
                return Err(PipelineError::UnknownDependency {
                    step: id.to_string(),
                    dependency: dep.to_string(),
                });
            }
            self.visit(dep)?;
        }

        self.path.pop();
        self.marks.insert(id, Mark::Done);
        self.order.push(id.to_string());
        Ok(())
    }

    fn cycle_error(&self, id: &str) -> PipelineError {
        let start = self.path.iter().position(|p| *p == id).unwrap_or(0);
        let mut cycle: Vec<&str> = self.path[start..].to_vec();
        cycle.push(id);
        PipelineError::CyclicDependency {
            cycle: cycle.join(" -> "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowchain_config::FieldBinding;

    fn flow(id: &str, deps: &[&str]) -> FlowDefinition {
        FlowDefinition::new(id, format!("wf-{}", id)).depends_on(deps.iter().copied())
    }

    fn registry(flows: Vec<FlowDefinition>) -> FlowRegistry {
        FlowRegistry::new(flows).unwrap()
    }

    #[test]
    fn test_linear_chain() {
        let reg = registry(vec![flow("a", &[]), flow("b", &["a"]), flow("c", &["a", "b"])]);
        assert_eq!(resolve_order(&reg).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dependencies_before_declaration_order() {
        let reg = registry(vec![flow("c", &["b"]), flow("b", &["a"]), flow("a", &[])]);
        assert_eq!(resolve_order(&reg).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_diamond_visited_once() {
        let reg = registry(vec![
            flow("top", &["left", "right"]),
            flow("left", &["base"]),
            flow("right", &["base"]),
            flow("base", &[]),
        ]);
        assert_eq!(
            resolve_order(&reg).unwrap(),
            vec!["base", "left", "right", "top"]
        );
    }

    #[test]
    fn test_independent_steps_keep_declaration_order() {
        let reg = registry(vec![flow("x", &[]), flow("y", &[]), flow("z", &[])]);
        assert_eq!(resolve_order(&reg).unwrap(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let reg = registry(vec![
            flow("d", &["b", "c"]),
            flow("c", &["a"]),
            flow("b", &["a"]),
            flow("a", &[]),
        ]);
        let first = resolve_order(&reg).unwrap();
        let second = resolve_order(&reg).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_two_node_cycle() {
        let reg = registry(vec![flow("a", &["b"]), flow("b", &["a"])]);
        let err = resolve_order(&reg).unwrap_err();
        match err {
            PipelineError::CyclicDependency { cycle } => assert_eq!(cycle, "a -> b -> a"),
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_self_cycle() {
        let reg = registry(vec![flow("a", &["a"])]);
        let err = resolve_order(&reg).unwrap_err();
        assert!(matches!(err, PipelineError::CyclicDependency { ref cycle } if cycle == "a -> a"));
    }

    #[test]
    fn test_cycle_path_excludes_entry_prefix() {
        let reg = registry(vec![
            flow("entry", &["x"]),
            flow("x", &["y"]),
            flow("y", &["x"]),
        ]);
        let err = resolve_order(&reg).unwrap_err();
        assert!(matches!(err, PipelineError::CyclicDependency { ref cycle } if cycle == "x -> y -> x"));
    }

    #[test]
    fn test_unknown_dependency() {
        let reg = registry(vec![flow("a", &["ghost"])]);
        let err = resolve_order(&reg).unwrap_err();
        match err {
            PipelineError::UnknownDependency { step, dependency } => {
                assert_eq!(step, "a");
                assert_eq!(dependency, "ghost");
            }
            other => panic!("expected unknown dependency, got {other:?}"),
        }
    }

    #[test]
    fn test_binding_source_orders_before_consumer() {
        let reg = registry(vec![
            FlowDefinition::new("answer", "wf-3")
                .with_binding(FieldBinding::new("research", "research", "research")),
            flow("research", &[]),
        ]);
        assert_eq!(resolve_order(&reg).unwrap(), vec!["research", "answer"]);
    }

    #[test]
    fn test_binding_source_must_exist() {
        let reg = registry(vec![
            FlowDefinition::new("a", "wf-a").with_binding(FieldBinding::new("x", "nowhere", "x")),
        ]);
        assert!(matches!(
            resolve_order(&reg).unwrap_err(),
            PipelineError::UnknownDependency { ref dependency, .. } if dependency == "nowhere"
        ));
    }

    #[test]
    fn test_edges_deduplicated() {
        let f = flow("c", &["a", "b"]).with_binding(FieldBinding::new("x", "a", "x"));
        assert_eq!(dependency_edges(&f), vec!["a", "b"]);
    }
}
