//! The capabilities the effect needs from the image runtime hosting it.
//!
//! [`PipelineRuntime`] is the seam between the effect's composition logic
//! and whatever actually evaluates pixels. [`ProcessingGraph`] implements it
//! in memory.

use crate::core::error::{GraphError, GraphResult, NodeId};
use crate::core::node::OperationKind;
use crate::core::types::Value;
use crate::graph::connection::LinkPlan;
use crate::graph::structure::{GraphNode, ProcessingGraph};

/// Everything needed to create one node: its kind, static configuration
/// and an optional label.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub kind: OperationKind,
    pub properties: Vec<(String, Value)>,
    pub label: Option<String>,
}

impl NodeSpec {
    /// A node of `kind` with default properties.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            label: None,
        }
    }

    /// Set a static property applied at creation.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Set the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Node creation, configuration and linking, as provided by the host.
///
/// Implementations must make [`relink`](PipelineRuntime::relink) atomic:
/// after an error the previous connection set is still in effect.
pub trait PipelineRuntime {
    /// Create a node with its static configuration.
    fn create_node(&mut self, spec: NodeSpec) -> GraphResult<NodeId>;

    /// The node through which the host feeds the input image.
    fn input_proxy(&mut self) -> GraphResult<NodeId>;

    /// The node from which the host pulls the output image.
    fn output_proxy(&mut self) -> GraphResult<NodeId>;

    /// Write one property of a node.
    fn set_property(&mut self, node: NodeId, property: &str, value: Value) -> GraphResult<()>;

    /// Replace every connection with the links of `plan`.
    fn relink(&mut self, plan: &LinkPlan) -> GraphResult<()>;
}

impl ProcessingGraph {
    fn boundary(&mut self, kind: OperationKind, label: &str) -> NodeId {
        match self.find_kind(kind) {
            Some(id) => id,
            None => self.add_node(GraphNode::new(kind).with_label(label)),
        }
    }
}

impl PipelineRuntime for ProcessingGraph {
    fn create_node(&mut self, spec: NodeSpec) -> GraphResult<NodeId> {
        if spec.kind.is_boundary() {
            return Err(GraphError::CreationFailed(format!(
                "{} is a boundary proxy; request it through the runtime",
                spec.kind
            )));
        }

        let mut node = GraphNode::new(spec.kind);
        if let Some(label) = spec.label {
            node = node.with_label(label);
        }
        let id = self.add_node(node);

        for (name, value) in spec.properties {
            if let Err(err) = self.set_property(id, name, value) {
                // No half-configured node is left behind
                let _ = self.remove_node(id);
                return Err(err);
            }
        }

        Ok(id)
    }

    fn input_proxy(&mut self) -> GraphResult<NodeId> {
        Ok(self.boundary(OperationKind::InputProxy, "input"))
    }

    fn output_proxy(&mut self) -> GraphResult<NodeId> {
        Ok(self.boundary(OperationKind::OutputProxy, "output"))
    }

    fn set_property(&mut self, node: NodeId, property: &str, value: Value) -> GraphResult<()> {
        ProcessingGraph::set_property(self, node, property, value)
    }

    fn relink(&mut self, plan: &LinkPlan) -> GraphResult<()> {
        ProcessingGraph::relink(self, plan)
    }
}
