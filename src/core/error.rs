//! Error types for Glowstick.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Name the node, port or parameter involved
//! - Distinguish fatal construction failures from recoverable reconfiguration failures
//! - Convert into the top-level error with `?`

use crate::core::types::PortType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a node in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a node ID from a UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Unique identifier for a connection in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    /// Create a new random connection ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Top-level error type for Glowstick.
#[derive(Error, Debug)]
pub enum GlowstickError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Configuration encoding error: {0}")]
    ConfigEncode(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised by the pipeline runtime while creating, linking or
/// configuring nodes.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    #[error("Port '{port}' not found on node {node_id}")]
    PortNotFound { node_id: NodeId, port: String },

    #[error("Property '{property}' not found on node {node_id}")]
    PropertyNotFound { node_id: NodeId, property: String },

    #[error("Property '{property}' on node {node_id} expects {expected}, got {got}")]
    PropertyTypeMismatch {
        node_id: NodeId,
        property: String,
        expected: PortType,
        got: PortType,
    },

    #[error("Property '{property}' on node {node_id} rejected: {error}")]
    InvalidProperty {
        node_id: NodeId,
        property: String,
        error: String,
    },

    #[error("Cycle detected in graph involving nodes: {nodes:?}")]
    CycleDetected { nodes: Vec<NodeId> },

    #[error("Cannot connect {from_type} to {to_type}")]
    TypeMismatch { from_type: PortType, to_type: PortType },

    #[error("Port '{port}' on node {node_id} is already connected")]
    PortAlreadyConnected { node_id: NodeId, port: String },

    #[error("Graph has no {0} boundary")]
    MissingBoundary(String),

    #[error("Node creation failed: {0}")]
    CreationFailed(String),
}

/// Errors from the meta-parameter store.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterError {
    #[error("Unknown parameter '{0}'")]
    Unknown(String),

    #[error("Parameter '{name}' expects {expected}, got {got}")]
    TypeMismatch {
        name: String,
        expected: PortType,
        got: PortType,
    },

    #[error("Parameter '{name}' out of range: {error}")]
    OutOfRange { name: String, error: String },

    #[error("Invalid value for '{name}': {error}")]
    InvalidValue { name: String, error: String },
}

/// Errors surfaced by the effect's attach and reconfigure entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EffectError {
    /// Construction failed; the effect instance is unusable.
    #[error("Attach failed: {0}")]
    Attach(#[source] GraphError),

    /// Relinking failed; the previous topology is still in place.
    #[error("Reconfiguration failed: {0}")]
    Reconfigure(#[source] GraphError),

    #[error("Parameter rejected: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Topology validation failed: {0}")]
    Validation(String),
}

impl EffectError {
    /// Whether the effect instance can still be used after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EffectError::Attach(_))
    }
}

impl GraphError {
    /// Get the node ID that caused this error, if applicable.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            GraphError::NodeNotFound(node_id)
            | GraphError::PortNotFound { node_id, .. }
            | GraphError::PropertyNotFound { node_id, .. }
            | GraphError::PropertyTypeMismatch { node_id, .. }
            | GraphError::InvalidProperty { node_id, .. }
            | GraphError::PortAlreadyConnected { node_id, .. } => Some(*node_id),
            _ => None,
        }
    }
}

/// Result type alias for Glowstick operations.
pub type GlowstickResult<T> = Result<T, GlowstickError>;

/// Result type alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for parameter operations.
pub type ParameterResult<T> = Result<T, ParameterError>;

/// Result type alias for effect operations.
pub type EffectResult<T> = Result<T, EffectError>;

// ============================================================================
// Validation Report
// ============================================================================

/// A topology invariant that does not hold.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Graph contains a cycle")]
    CycleDetected,

    #[error("Output boundary is not reachable from the input boundary")]
    OutputUnreachable,

    #[error("Main path {found:?} does not match the expected chain {expected:?}")]
    ChainMismatch {
        expected: Vec<NodeId>,
        found: Vec<NodeId>,
    },

    #[error("{count} blend nodes receive a side input, expected exactly one")]
    BlendSideInputCount { count: usize },

    #[error("Side input of node {node_id} is not fed by node {expected}")]
    SideInputMismatch { node_id: NodeId, expected: NodeId },

    #[error("Unexpected link from {from} to {to}")]
    StrayLink { from: NodeId, to: NodeId },

    #[error("Property '{property}' on node {node_id} violates its constraint: {error}")]
    ConstraintViolation {
        node_id: NodeId,
        property: String,
        error: String,
    },

    #[error("{0}")]
    Other(String),
}

impl ValidationError {
    /// Whether later stages can be skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ValidationError::CycleDetected | ValidationError::OutputUnreachable
        )
    }

    /// Get list of affected node IDs.
    pub fn affected_nodes(&self) -> Vec<NodeId> {
        match self {
            ValidationError::SideInputMismatch { node_id, .. }
            | ValidationError::ConstraintViolation { node_id, .. } => vec![*node_id],
            ValidationError::StrayLink { from, to } => vec![*from, *to],
            ValidationError::ChainMismatch { found, .. } => found.clone(),
            _ => vec![],
        }
    }
}

/// Non-fatal validation warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Warning message.
    pub message: String,
    /// Node that triggered the warning, if applicable.
    pub node_id: Option<NodeId>,
}

/// Result of running every validation stage over a graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed without errors.
    pub success: bool,
    /// List of errors found.
    pub errors: Vec<ValidationError>,
    /// List of warnings (non-fatal issues).
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Create a new empty report (success).
    pub fn new() -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.success = false;
        self.errors.push(error);
    }

    /// Add a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        if self.success {
            if self.warnings.is_empty() {
                "✓ Topology is valid".to_string()
            } else {
                format!("✓ Topology is valid with {} warning(s)", self.warnings.len())
            }
        } else {
            format!("✗ Validation failed with {} error(s)", self.errors.len())
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        let id = NodeId::new();
        assert_eq!(format!("{}", id).len(), 8);
    }

    #[test]
    fn test_effect_error_fatality() {
        let id = NodeId::new();
        assert!(EffectError::Attach(GraphError::NodeNotFound(id)).is_fatal());
        assert!(!EffectError::Reconfigure(GraphError::NodeNotFound(id)).is_fatal());
    }

    #[test]
    fn test_graph_error_node_id() {
        let id = NodeId::new();
        let error = GraphError::PortNotFound {
            node_id: id,
            port: "aux".to_string(),
        };
        assert_eq!(error.node_id(), Some(id));
        assert_eq!(GraphError::MissingBoundary("input".into()).node_id(), None);
    }

    #[test]
    fn test_validation_report() {
        let mut report = ValidationReport::new();
        assert!(report.success);

        report.add_error(ValidationError::CycleDetected);
        assert!(!report.success);
        assert!(report.errors[0].is_fatal());
        assert_eq!(report.errors.len(), 1);
        assert!(report.summary().contains("1 error"));
    }

    #[test]
    fn test_conversion_into_top_level() {
        fn fails() -> GlowstickResult<()> {
            Err(ParameterError::Unknown("glow".to_string()))?;
            Ok(())
        }
        assert!(matches!(fails(), Err(GlowstickError::Parameter(_))));
    }
}
