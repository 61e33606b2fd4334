// claimstar-core/src/domain/graph/dag.rs

use crate::domain::error::DomainError;
use std::collections::{HashMap, HashSet, VecDeque};

/// Anything the solver can order: a named node with named prerequisites.
pub trait PlanNode {
    fn name(&self) -> &str;
    fn dependencies(&self) -> &[&str];
}

pub struct GraphSolver;

impl GraphSolver {
    /// Calculates the execution order of build steps (Topological Sort with Layers).
    /// Layer N depends only on layers 0..N-1. Within a layer, steps keep their
    /// declaration order, so the plan is identical on every run.
    pub fn plan_execution<N: PlanNode>(nodes: &[N]) -> Result<Vec<Vec<String>>, DomainError> {
        let index = Self::index_nodes(nodes)?;
        let mut in_degree: Vec<usize> = vec![0; nodes.len()];
        let mut adj_list: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];

        // 1. Graph construction (dependency inversion)
        for (i, node) in nodes.iter().enumerate() {
            for dep_name in node.dependencies() {
                let Some(&dep) = index.get(dep_name) else {
                    return Err(DomainError::UnknownDependency {
                        step: node.name().to_string(),
                        dependency: dep_name.to_string(),
                    });
                };
                adj_list[dep].push(i);
                in_degree[i] += 1;
            }
        }

        // 2. Kahn's algorithm (layered)
        let mut layers: Vec<Vec<String>> = Vec::new();
        let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut total_resolved = 0;

        while !queue.is_empty() {
            let mut current_layer: Vec<usize> = queue.drain(..).collect();
            current_layer.sort_unstable();
            total_resolved += current_layer.len();

            for &current in &current_layer {
                for &neighbor in &adj_list[current] {
                    in_degree[neighbor] -= 1;
                    if in_degree[neighbor] == 0 {
                        queue.push_back(neighbor);
                    }
                }
            }
            layers.push(
                current_layer
                    .into_iter()
                    .map(|i| nodes[i].name().to_string())
                    .collect(),
            );
        }

        // 3. Cycle detection
        if total_resolved != nodes.len() {
            let stuck: Vec<&str> = (0..nodes.len())
                .filter(|&i| in_degree[i] > 0)
                .map(|i| nodes[i].name())
                .collect();
            return Err(DomainError::CircularDependency(format!(
                "{} (resolved {}/{} steps)",
                stuck.join(", "),
                total_resolved,
                nodes.len()
            )));
        }

        Ok(layers)
    }

    /// The selected steps plus everything they transitively depend on.
    pub fn upstream_closure<N: PlanNode>(
        nodes: &[N],
        selected: &[String],
    ) -> Result<HashSet<String>, DomainError> {
        let index = Self::index_nodes(nodes)?;
        let mut closure = HashSet::new();
        let mut stack: Vec<&str> = Vec::new();

        for name in selected {
            if !index.contains_key(name.as_str()) {
                return Err(DomainError::StepNotFound(name.clone()));
            }
            stack.push(name.as_str());
        }

        while let Some(name) = stack.pop() {
            if !closure.insert(name.to_string()) {
                continue;
            }
            if let Some(&i) = index.get(name) {
                stack.extend(nodes[i].dependencies().iter().copied());
            }
        }
        Ok(closure)
    }

    /// Execution layers restricted to `selected` and its upstream steps.
    pub fn plan_selection<N: PlanNode>(
        nodes: &[N],
        selected: &[String],
    ) -> Result<Vec<Vec<String>>, DomainError> {
        let layers = Self::plan_execution(nodes)?;
        if selected.is_empty() {
            return Ok(layers);
        }
        let closure = Self::upstream_closure(nodes, selected)?;
        Ok(layers
            .into_iter()
            .map(|layer| {
                layer
                    .into_iter()
                    .filter(|name| closure.contains(name))
                    .collect::<Vec<_>>()
            })
            .filter(|layer| !layer.is_empty())
            .collect())
    }

    fn index_nodes<N: PlanNode>(nodes: &[N]) -> Result<HashMap<&str, usize>, DomainError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.name(), i).is_some() {
                return Err(DomainError::DuplicateStep(node.name().to_string()));
            }
        }
        Ok(index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    struct Node {
        name: &'static str,
        deps: Vec<&'static str>,
    }

    impl PlanNode for Node {
        fn name(&self) -> &str {
            self.name
        }
        fn dependencies(&self) -> &[&str] {
            &self.deps
        }
    }

    fn node(name: &'static str, deps: Vec<&'static str>) -> Node {
        Node { name, deps }
    }

    #[test]
    fn test_dag_linear() -> Result<()> {
        // A -> B -> C (C depends on B, B depends on A)
        let nodes = vec![
            node("model_c", vec!["model_b"]),
            node("model_a", vec![]),
            node("model_b", vec!["model_a"]),
        ];

        let plan = GraphSolver::plan_execution(&nodes)?;
        assert_eq!(plan, vec![vec!["model_a"], vec!["model_b"], vec!["model_c"]]);
        Ok(())
    }

    #[test]
    fn test_dag_layers_keep_declaration_order() -> Result<()> {
        let nodes = vec![
            node("dim_date", vec![]),
            node("dim_patient", vec![]),
            node("fact", vec!["dim_patient", "dim_date"]),
            node("dim_payer", vec![]),
        ];
        let plan = GraphSolver::plan_execution(&nodes)?;
        assert_eq!(
            plan,
            vec![vec!["dim_date", "dim_patient", "dim_payer"], vec!["fact"]]
        );
        Ok(())
    }

    #[test]
    fn test_dag_cycle_error() {
        // A -> B -> A (Cycle)
        let nodes = vec![
            node("model_a", vec!["model_b"]),
            node("model_b", vec!["model_a"]),
            node("model_c", vec![]),
        ];
        let result = GraphSolver::plan_execution(&nodes);
        assert!(matches!(result, Err(DomainError::CircularDependency(msg)) if msg.contains("model_a")));
    }

    #[test]
    fn test_dag_rejects_unknown_and_duplicate_steps() {
        let unknown = vec![node("a", vec!["ghost"])];
        assert!(matches!(
            GraphSolver::plan_execution(&unknown),
            Err(DomainError::UnknownDependency { dependency, .. }) if dependency == "ghost"
        ));

        let duplicate = vec![node("a", vec![]), node("a", vec![])];
        assert!(matches!(
            GraphSolver::plan_execution(&duplicate),
            Err(DomainError::DuplicateStep(name)) if name == "a"
        ));
    }

    #[test]
    fn test_selection_pulls_in_upstream_only() -> Result<()> {
        let nodes = vec![
            node("raw", vec![]),
            node("other", vec![]),
            node("silver", vec!["raw"]),
            node("gold", vec!["silver"]),
        ];
        let plan = GraphSolver::plan_selection(&nodes, &["silver".to_string()])?;
        assert_eq!(plan, vec![vec!["raw"], vec!["silver"]]);

        let missing = GraphSolver::plan_selection(&nodes, &["nope".to_string()]);
        assert!(matches!(missing, Err(DomainError::StepNotFound(_))));
        Ok(())
    }
}
