//! Core types and traits for the Glowstick effect.
//!
//! This module contains the foundational types the assembler works with:
//! - Value types written into node properties
//! - Port and parameter definitions with constraints
//! - Operation kinds and their metadata
//! - Error types

pub mod types;
pub mod port;
pub mod error;
pub mod node;

// Re-export commonly used types
pub use types::{Color, PortType, Value};
pub use port::{Constraint, ParameterDefinition, PortDefinition, PortDirection};
pub use error::{EffectError, GlowstickError, GraphError, NodeId, ParameterError};
pub use node::{Category, NodeMetadata, OperationKind};
