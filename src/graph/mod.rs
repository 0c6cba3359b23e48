//! Graph module: the node graph the effect is assembled in.
//!
//! Nodes are primitive operations, connections carry images from an
//! output port to an input or side-input port.

pub mod structure;
pub mod connection;
pub mod topology;
pub mod serialization;
pub mod runtime;

// Re-export commonly used types
pub use structure::{GraphNode, ProcessingGraph};
pub use connection::{Connection, Endpoint, Link, LinkPlan};
pub use topology::TopologyAnalyzer;
pub use runtime::{NodeSpec, PipelineRuntime};
