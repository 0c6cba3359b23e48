//! Connection types for the graph.

use crate::core::error::{ConnectionId, NodeId};
use crate::core::port::{AUX_PORT, INPUT_PORT, OUTPUT_PORT};
use serde::{Deserialize, Serialize};

/// An endpoint of a connection (node + port).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// The node ID.
    pub node_id: NodeId,
    /// The port name on that node.
    pub port_name: String,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(node_id: NodeId, port_name: impl Into<String>) -> Self {
        Self {
            node_id,
            port_name: port_name.into(),
        }
    }

    /// The primary output of a node.
    pub fn output(node_id: NodeId) -> Self {
        Self::new(node_id, OUTPUT_PORT)
    }

    /// The primary input of a node.
    pub fn input(node_id: NodeId) -> Self {
        Self::new(node_id, INPUT_PORT)
    }

    /// The side input of a node.
    pub fn aux(node_id: NodeId) -> Self {
        Self::new(node_id, AUX_PORT)
    }
}

/// A connection between two ports in the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Unique identifier for this connection.
    pub id: ConnectionId,
    /// Source endpoint (output port).
    pub from: Endpoint,
    /// Target endpoint (input port).
    pub to: Endpoint,
}

impl Connection {
    /// Create a new connection.
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        Self {
            id: ConnectionId::new(),
            from,
            to,
        }
    }
}

/// A requested link from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub from: Endpoint,
    pub to: Endpoint,
}

/// The complete set of links a graph should have after a rebuild.
///
/// A plan is applied as a whole: either every link in it becomes the
/// graph's connection set, or nothing changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPlan {
    links: Vec<Link>,
}

impl LinkPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link consecutive nodes output-to-input.
    pub fn chain(mut self, nodes: &[NodeId]) -> Self {
        for pair in nodes.windows(2) {
            self.links.push(Link {
                from: Endpoint::output(pair[0]),
                to: Endpoint::input(pair[1]),
            });
        }
        self
    }

    /// Feed `source`'s output into `node`'s side input.
    pub fn side_input(mut self, node: NodeId, source: NodeId) -> Self {
        self.links.push(Link {
            from: Endpoint::output(source),
            to: Endpoint::aux(node),
        });
        self
    }

    /// All links in the plan, in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the plan has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
