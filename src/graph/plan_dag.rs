use crate::task::{DependencyType, Task};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Dependency network over a task slice. Node weights are indices into the
/// slice the graph was built from; edges run predecessor -> successor and
/// carry the precedence type.
pub struct PlanDag {
    pub graph: DiGraph<usize, DependencyType>,
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl PlanDag {
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<usize, DependencyType> = DiGraph::new();
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::new();

        for (idx, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(idx);
            id_to_index.insert(task.id.clone(), node_ix);
        }

        for task in tasks {
            let Some(&target) = id_to_index.get(&task.id) else {
                continue;
            };
            for dependency in &task.dependencies {
                // Dangling sources are tolerated; they simply add no edge.
                if let Some(&source) = id_to_index.get(&dependency.source_id) {
                    graph.add_edge(source, target, dependency.kind);
                }
            }
        }

        Self { graph, id_to_index }
    }

    /// Task indices in precedence order, or `None` when the graph contains
    /// a cycle.
    pub fn topo_order(&self) -> Option<Vec<usize>> {
        toposort(&self.graph, None)
            .ok()
            .map(|order| order.into_iter().map(|ix| self.graph[ix]).collect())
    }

    pub fn is_cyclic(&self) -> bool {
        toposort(&self.graph, None).is_err()
    }
}
