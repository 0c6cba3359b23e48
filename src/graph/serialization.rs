//! Graph snapshots for inspection and debugging.

use crate::core::error::NodeId;
use crate::core::node::OperationKind;
use crate::core::types::Value;
use crate::graph::connection::Connection;
use crate::graph::structure::ProcessingGraph;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serializable representation of a graph node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Node ID
    pub id: NodeId,
    /// Operation kind
    pub kind: OperationKind,
    /// Property values written so far
    pub properties: IndexMap<String, Value>,
    /// Optional display label
    pub label: Option<String>,
}

/// Serializable representation of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedConnection {
    /// From node ID
    pub from_node: NodeId,
    /// From port name
    pub from_port: String,
    /// To node ID
    pub to_node: NodeId,
    /// To port name
    pub to_port: String,
}

impl From<&Connection> for SerializedConnection {
    fn from(conn: &Connection) -> Self {
        Self {
            from_node: conn.from.node_id,
            from_port: conn.from.port_name.clone(),
            to_node: conn.to.node_id,
            to_port: conn.to.port_name.clone(),
        }
    }
}

/// Serializable representation of a complete graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedGraph {
    /// Snapshot format version
    pub version: String,
    /// Graph name
    pub name: Option<String>,
    /// All nodes
    pub nodes: Vec<SerializedNode>,
    /// All connections
    pub connections: Vec<SerializedConnection>,
}

impl SerializedGraph {
    /// Current format version.
    pub const VERSION: &'static str = "1.0.0";

    /// Snapshot a graph.
    pub fn from_graph(graph: &ProcessingGraph) -> Self {
        Self {
            version: Self::VERSION.to_string(),
            name: graph.name.clone(),
            nodes: graph
                .nodes()
                .map(|node| SerializedNode {
                    id: node.id,
                    kind: node.kind,
                    properties: node.properties.clone(),
                    label: node.label.clone(),
                })
                .collect(),
            connections: graph.connections().iter().map(SerializedConnection::from).collect(),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Color;
    use crate::graph::structure::GraphNode;

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let mut graph = ProcessingGraph::new().with_name("Glow Stick");
        let color = graph.add_node(GraphNode::new(OperationKind::Color).with_label("fill"));
        let blend = graph.add_node(GraphNode::new(OperationKind::LayerMode));
        graph
            .set_property(color, "value", Value::Color(Color::GLOWSTICK_PINK))
            .unwrap();
        graph.connect(color, "output", blend, "aux").unwrap();

        let json = SerializedGraph::from_graph(&graph).to_json().unwrap();
        assert!(json.contains("Glow Stick"));
        assert!(json.contains("layer_mode"));

        let restored = SerializedGraph::from_json(&json).unwrap();
        assert_eq!(restored.nodes.len(), 2);
        assert_eq!(restored.nodes[0].label.as_deref(), Some("fill"));
        assert_eq!(
            restored.nodes[0].properties.get("value"),
            Some(&Value::Color(Color::GLOWSTICK_PINK))
        );
        assert_eq!(restored.connections.len(), 1);
        assert_eq!(restored.connections[0].to_port, "aux");
    }
}
