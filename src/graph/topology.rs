//! Topological analysis of graphs.
//!
//! Provides algorithms for:
//! - Topological sorting and cycle detection
//! - Tracing the main path along primary inputs

use crate::core::error::{GraphError, GraphResult, NodeId};
use crate::core::port::{INPUT_PORT, OUTPUT_PORT};
use crate::graph::connection::Connection;
use crate::graph::structure::ProcessingGraph;
use std::collections::{HashMap, HashSet, VecDeque};

/// Analyzer for graph topology.
///
/// Works over a node list and a connection slice, so a staged connection
/// set can be analyzed before it is committed to a graph.
pub struct TopologyAnalyzer<'a> {
    nodes: Vec<NodeId>,
    connections: &'a [Connection],
}

impl<'a> TopologyAnalyzer<'a> {
    /// Create a new analyzer for the given graph.
    pub fn new(graph: &'a ProcessingGraph) -> Self {
        Self {
            nodes: graph.node_ids().collect(),
            connections: graph.connections(),
        }
    }

    /// Create an analyzer over explicit nodes and connections.
    pub fn from_parts(nodes: &[NodeId], connections: &'a [Connection]) -> Self {
        Self {
            nodes: nodes.to_vec(),
            connections,
        }
    }

    /// Get the topological sort order (Kahn's algorithm).
    ///
    /// Returns nodes in an order where dependencies come before dependents.
    pub fn topological_sort(&self) -> GraphResult<Vec<NodeId>> {
        let mut in_degree: HashMap<NodeId, usize> = HashMap::new();
        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();

        for &node_id in &self.nodes {
            in_degree.insert(node_id, 0);
            adjacency.insert(node_id, Vec::new());
        }

        for conn in self.connections {
            let (from, to) = (conn.from.node_id, conn.to.node_id);
            if !in_degree.contains_key(&to) {
                return Err(GraphError::NodeNotFound(to));
            }
            adjacency
                .get_mut(&from)
                .ok_or(GraphError::NodeNotFound(from))?
                .push(to);
            *in_degree.entry(to).or_insert(0) += 1;
        }

        // Seed in node order so the result is deterministic
        let mut queue: VecDeque<NodeId> = self
            .nodes
            .iter()
            .copied()
            .filter(|id| in_degree[id] == 0)
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());

        while let Some(node) = queue.pop_front() {
            result.push(node);

            for neighbor in &adjacency[&node] {
                if let Some(degree) = in_degree.get_mut(neighbor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*neighbor);
                    }
                }
            }
        }

        if result.len() != self.nodes.len() {
            let remaining: Vec<NodeId> = self
                .nodes
                .iter()
                .copied()
                .filter(|id| in_degree[id] > 0)
                .collect();

            return Err(GraphError::CycleDetected { nodes: remaining });
        }

        Ok(result)
    }

    /// Check if the graph has any cycles.
    pub fn has_cycle(&self) -> bool {
        self.topological_sort().is_err()
    }

    /// Follow primary `output -> input` links downstream from `start`.
    ///
    /// Side inputs are not followed. Stops at a node with no primary
    /// consumer, or when a node would repeat.
    pub fn main_path(&self, start: NodeId) -> Vec<NodeId> {
        let mut path = vec![start];
        let mut seen = HashSet::from([start]);
        let mut current = start;

        while let Some(next) = self
            .connections
            .iter()
            .find(|c| {
                c.from.node_id == current
                    && c.from.port_name == OUTPUT_PORT
                    && c.to.port_name == INPUT_PORT
            })
            .map(|c| c.to.node_id)
        {
            if !seen.insert(next) {
                break;
            }
            path.push(next);
            current = next;
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::OperationKind;
    use crate::graph::structure::GraphNode;

    fn nop() -> GraphNode {
        GraphNode::new(OperationKind::Nop)
    }

    #[test]
    fn test_topological_sort() {
        let mut graph = ProcessingGraph::new();

        let node1 = graph.add_node(nop());
        let node2 = graph.add_node(nop());
        let node3 = graph.add_node(nop());

        graph.connect(node2, "output", node3, "input").unwrap();
        graph.connect(node1, "output", node2, "input").unwrap();

        let sorted = TopologyAnalyzer::new(&graph).topological_sort().unwrap();
        assert_eq!(sorted, vec![node1, node2, node3]);
    }

    #[test]
    fn test_staged_cycle_detected() {
        let a = NodeId::new();
        let b = NodeId::new();
        let staged = vec![
            Connection::new(
                crate::graph::connection::Endpoint::output(a),
                crate::graph::connection::Endpoint::input(b),
            ),
            Connection::new(
                crate::graph::connection::Endpoint::output(b),
                crate::graph::connection::Endpoint::input(a),
            ),
        ];

        let analyzer = TopologyAnalyzer::from_parts(&[a, b], &staged);
        assert!(analyzer.has_cycle());
    }

    #[test]
    fn test_main_path_skips_side_inputs() {
        let mut graph = ProcessingGraph::new();

        let input = graph.add_node(GraphNode::new(OperationKind::InputProxy));
        let blend = graph.add_node(GraphNode::new(OperationKind::LayerMode));
        let color = graph.add_node(GraphNode::new(OperationKind::Color));
        let output = graph.add_node(GraphNode::new(OperationKind::OutputProxy));

        graph.connect(input, "output", blend, "input").unwrap();
        graph.connect(color, "output", blend, "aux").unwrap();
        graph.connect(blend, "output", output, "input").unwrap();

        let analyzer = TopologyAnalyzer::new(&graph);
        assert_eq!(analyzer.main_path(input), vec![input, blend, output]);
        assert_eq!(analyzer.main_path(color), vec![color]);
    }
}
