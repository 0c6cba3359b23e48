//! Graph structure and node management.
//!
//! The ProcessingGraph is an in-memory model of the image runtime the
//! effect drives. It holds every node the effect created and the current
//! connection set, and checks each link and property write against the
//! operation metadata.

use crate::core::error::{ConnectionId, GraphError, GraphResult, NodeId};
use crate::core::node::OperationKind;
use crate::core::types::Value;
use crate::graph::connection::{Connection, Endpoint, LinkPlan};
use crate::graph::topology::TopologyAnalyzer;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};

/// A node instance in the graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    /// Unique identifier
    pub id: NodeId,
    /// The operation this node runs
    pub kind: OperationKind,
    /// Property values (overriding defaults)
    pub properties: IndexMap<String, Value>,
    /// Optional display name override
    pub label: Option<String>,
}

impl GraphNode {
    /// Create a new graph node for an operation.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            properties: IndexMap::new(),
            label: None,
        }
    }

    /// Create with a specific ID.
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the display name (label or operation id).
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.kind.id().to_string())
    }

    /// Get a property value, falling back to the operation default.
    pub fn get_property(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.properties.get(name) {
            return Some(value.clone());
        }
        self.kind
            .metadata()
            .get_parameter(name)
            .map(|p| p.default_value.clone())
    }
}

/// The in-memory processing graph.
///
/// Uses IndexMap to keep node creation order for consistent iteration.
#[derive(Debug, Clone, Default)]
pub struct ProcessingGraph {
    /// All nodes in the graph, indexed by ID.
    nodes: IndexMap<NodeId, GraphNode>,
    /// All connections in the graph.
    connections: Vec<Connection>,
    /// Optional name for this graph.
    pub name: Option<String>,
}

impl ProcessingGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // ========================================================================
    // Node Management
    // ========================================================================

    /// Add a node to the graph.
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node from the graph.
    ///
    /// Also removes all connections involving this node.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<GraphNode> {
        self.connections
            .retain(|conn| conn.from.node_id != id && conn.to.node_id != id);

        self.nodes
            .shift_remove(&id)
            .ok_or(GraphError::NodeNotFound(id))
    }

    /// Get a reference to a node.
    pub fn get_node(&self, id: NodeId) -> GraphResult<&GraphNode> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    /// Check if a node exists.
    pub fn has_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Get all node IDs.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find the first node of a kind.
    pub fn find_kind(&self, kind: OperationKind) -> Option<NodeId> {
        self.nodes.values().find(|n| n.kind == kind).map(|n| n.id)
    }

    /// Count the nodes of a kind.
    pub fn count_kind(&self, kind: OperationKind) -> usize {
        self.nodes.values().filter(|n| n.kind == kind).count()
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Write a property, checking it against the operation's declaration.
    pub fn set_property(
        &mut self,
        id: NodeId,
        name: impl Into<String>,
        value: Value,
    ) -> GraphResult<()> {
        let name = name.into();
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        let metadata = node.kind.metadata();
        let definition = metadata
            .get_parameter(&name)
            .ok_or_else(|| GraphError::PropertyNotFound {
                node_id: id,
                property: name.clone(),
            })?;

        if !definition.param_type.matches(&value) {
            return Err(GraphError::PropertyTypeMismatch {
                node_id: id,
                property: name,
                expected: definition.param_type,
                got: value.get_type(),
            });
        }

        definition
            .validate(&value)
            .map_err(|error| GraphError::InvalidProperty {
                node_id: id,
                property: name.clone(),
                error,
            })?;

        node.properties.insert(name, value);
        Ok(())
    }

    /// Read a property, falling back to the operation default.
    pub fn get_property(&self, id: NodeId, name: &str) -> GraphResult<Value> {
        let node = self.get_node(id)?;
        node.get_property(name)
            .ok_or_else(|| GraphError::PropertyNotFound {
                node_id: id,
                property: name.to_string(),
            })
    }

    // ========================================================================
    // Connection Management
    // ========================================================================

    /// Create a connection between two ports.
    ///
    /// Fails if the input port is already fed or the link would close a cycle.
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: impl Into<String>,
        to_node: NodeId,
        to_port: impl Into<String>,
    ) -> GraphResult<ConnectionId> {
        let from = Endpoint::new(from_node, from_port);
        let to = Endpoint::new(to_node, to_port);
        self.check_link(&from, &to)?;

        if self.is_input_connected(to_node, &to.port_name) {
            return Err(GraphError::PortAlreadyConnected {
                node_id: to_node,
                port: to.port_name,
            });
        }

        if self.is_reachable(to_node, from_node) {
            return Err(GraphError::CycleDetected {
                nodes: vec![from_node, to_node],
            });
        }

        let connection = Connection::new(from, to);
        let id = connection.id;
        self.connections.push(connection);
        Ok(id)
    }

    /// Replace the whole connection set with the links of `plan`.
    ///
    /// Every link is checked and the staged set is checked for cycles
    /// before anything is swapped in; on error the graph is unchanged.
    pub fn relink(&mut self, plan: &LinkPlan) -> GraphResult<()> {
        let mut staged: Vec<Connection> = Vec::with_capacity(plan.len());

        for link in plan.links() {
            self.check_link(&link.from, &link.to)?;
            if staged.iter().any(|c| c.to == link.to) {
                return Err(GraphError::PortAlreadyConnected {
                    node_id: link.to.node_id,
                    port: link.to.port_name.clone(),
                });
            }
            staged.push(Connection::new(link.from.clone(), link.to.clone()));
        }

        let node_ids: Vec<NodeId> = self.node_ids().collect();
        TopologyAnalyzer::from_parts(&node_ids, &staged).topological_sort()?;

        self.connections = staged;
        Ok(())
    }

    /// Remove a connection by ID.
    pub fn disconnect(&mut self, id: ConnectionId) -> GraphResult<Connection> {
        let pos = self
            .connections
            .iter()
            .position(|c| c.id == id)
            .ok_or(GraphError::ConnectionNotFound(id))?;

        Ok(self.connections.remove(pos))
    }

    /// Remove all connections to a specific input port.
    pub fn disconnect_input(&mut self, node_id: NodeId, port: &str) {
        self.connections
            .retain(|conn| !(conn.to.node_id == node_id && conn.to.port_name == port));
    }

    /// Get all connections.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Get all connections from a node.
    pub fn connections_from(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.from.node_id == node_id)
    }

    /// Get all connections to a node.
    pub fn connections_to(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(move |c| c.to.node_id == node_id)
    }

    /// The node feeding a given input port, if any.
    pub fn source_of(&self, node_id: NodeId, port: &str) -> Option<NodeId> {
        self.connections
            .iter()
            .find(|c| c.to.node_id == node_id && c.to.port_name == port)
            .map(|c| c.from.node_id)
    }

    /// Check if an input port is already connected.
    pub fn is_input_connected(&self, node_id: NodeId, port: &str) -> bool {
        self.source_of(node_id, port).is_some()
    }

    /// Get the number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Check that both endpoints exist and their port types are compatible.
    fn check_link(&self, from: &Endpoint, to: &Endpoint) -> GraphResult<()> {
        let from_metadata = self.get_node(from.node_id)?.kind.metadata();
        let to_metadata = self.get_node(to.node_id)?.kind.metadata();

        let from_port = from_metadata
            .get_output(&from.port_name)
            .ok_or_else(|| GraphError::PortNotFound {
                node_id: from.node_id,
                port: from.port_name.clone(),
            })?;

        let to_port = to_metadata
            .get_input(&to.port_name)
            .ok_or_else(|| GraphError::PortNotFound {
                node_id: to.node_id,
                port: to.port_name.clone(),
            })?;

        if !from_port.port_type.compatible_with(&to_port.port_type) {
            return Err(GraphError::TypeMismatch {
                from_type: from_port.port_type,
                to_type: to_port.port_type,
            });
        }

        Ok(())
    }

    // ========================================================================
    // Graph Analysis
    // ========================================================================

    /// Check if `target` is reachable from `start` following connections.
    pub fn is_reachable(&self, start: NodeId, target: NodeId) -> bool {
        if start == target {
            return true;
        }

        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }

            if visited.insert(current) {
                for conn in self.connections_from(current) {
                    queue.push_back(conn.to.node_id);
                }
            }
        }

        false
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Color;

    fn nop() -> GraphNode {
        GraphNode::new(OperationKind::Nop)
    }

    #[test]
    fn test_add_node() {
        let mut graph = ProcessingGraph::new();

        let id = graph.add_node(nop().with_label("bypass"));
        assert_eq!(graph.node_count(), 1);
        assert!(graph.has_node(id));
        assert_eq!(graph.get_node(id).unwrap().display_name(), "bypass");
        assert_eq!(graph.find_kind(OperationKind::Nop), Some(id));
    }

    #[test]
    fn test_connect_nodes() {
        let mut graph = ProcessingGraph::new();

        let node1 = graph.add_node(nop());
        let node2 = graph.add_node(nop());

        let conn_id = graph.connect(node1, "output", node2, "input").unwrap();
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.source_of(node2, "input"), Some(node1));

        graph.disconnect(conn_id).unwrap();
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_connect_rejects_unknown_port() {
        let mut graph = ProcessingGraph::new();

        let node1 = graph.add_node(nop());
        let node2 = graph.add_node(nop());

        let result = graph.connect(node1, "output", node2, "aux");
        assert!(matches!(result, Err(GraphError::PortNotFound { .. })));
    }

    #[test]
    fn test_connect_rejects_doubly_fed_input() {
        let mut graph = ProcessingGraph::new();

        let a = graph.add_node(nop());
        let b = graph.add_node(nop());
        let c = graph.add_node(nop());

        graph.connect(a, "output", c, "input").unwrap();
        let result = graph.connect(b, "output", c, "input");
        assert!(matches!(result, Err(GraphError::PortAlreadyConnected { .. })));
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = ProcessingGraph::new();

        let node1 = graph.add_node(nop());
        let node2 = graph.add_node(nop());
        let node3 = graph.add_node(nop());

        graph.connect(node1, "output", node2, "input").unwrap();
        graph.connect(node2, "output", node3, "input").unwrap();

        let result = graph.connect(node3, "output", node1, "input");
        assert!(matches!(result, Err(GraphError::CycleDetected { .. })));
    }

    #[test]
    fn test_set_property_checks_declaration() {
        let mut graph = ProcessingGraph::new();
        let color = graph.add_node(GraphNode::new(OperationKind::Color));

        graph
            .set_property(color, "value", Value::Color(Color::WHITE))
            .unwrap();
        assert_eq!(
            graph.get_property(color, "value").unwrap(),
            Value::Color(Color::WHITE)
        );

        let unknown = graph.set_property(color, "radius", Value::Float(1.0));
        assert!(matches!(unknown, Err(GraphError::PropertyNotFound { .. })));

        let mismatch = graph.set_property(color, "value", Value::Float(1.0));
        assert!(matches!(mismatch, Err(GraphError::PropertyTypeMismatch { .. })));
    }

    #[test]
    fn test_set_property_checks_constraints() {
        let mut graph = ProcessingGraph::new();
        let softglow = graph.add_node(GraphNode::new(OperationKind::SoftGlow));

        let result = graph.set_property(softglow, "glow_radius", Value::Float(0.0));
        assert!(matches!(result, Err(GraphError::InvalidProperty { .. })));
    }

    #[test]
    fn test_get_property_falls_back_to_default() {
        let mut graph = ProcessingGraph::new();
        let nr = graph.add_node(GraphNode::new(OperationKind::NoiseReduction));

        assert_eq!(graph.get_property(nr, "iterations").unwrap(), Value::Integer(4));
    }

    #[test]
    fn test_relink_replaces_connections() {
        let mut graph = ProcessingGraph::new();

        let a = graph.add_node(nop());
        let b = graph.add_node(nop());
        let c = graph.add_node(nop());

        graph.relink(&LinkPlan::new().chain(&[a, b, c])).unwrap();
        assert_eq!(graph.connection_count(), 2);

        graph.relink(&LinkPlan::new().chain(&[a, c])).unwrap();
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.source_of(c, "input"), Some(a));
        assert!(!graph.is_input_connected(b, "input"));
    }

    #[test]
    fn test_failed_relink_leaves_graph_untouched() {
        let mut graph = ProcessingGraph::new();

        let a = graph.add_node(nop());
        let b = graph.add_node(nop());
        graph.relink(&LinkPlan::new().chain(&[a, b])).unwrap();

        let missing = NodeId::new();
        let result = graph.relink(&LinkPlan::new().chain(&[b, missing]));
        assert!(matches!(result, Err(GraphError::NodeNotFound(_))));
        assert_eq!(graph.source_of(b, "input"), Some(a));

        let cyclic = graph.relink(&LinkPlan::new().chain(&[a, b, a]));
        assert!(matches!(cyclic, Err(GraphError::CycleDetected { .. })));
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.source_of(b, "input"), Some(a));
    }

    #[test]
    fn test_relink_rejects_duplicate_input() {
        let mut graph = ProcessingGraph::new();

        let a = graph.add_node(nop());
        let b = graph.add_node(nop());
        let c = graph.add_node(nop());

        let plan = LinkPlan::new().chain(&[a, c]).chain(&[b, c]);
        let result = graph.relink(&plan);
        assert!(matches!(result, Err(GraphError::PortAlreadyConnected { .. })));
        assert_eq!(graph.connection_count(), 0);
    }
}
