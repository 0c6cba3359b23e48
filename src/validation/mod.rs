//! Topology validation.
//!
//! The pipeline checks that a graph matches the chain the effect last
//! linked: no cycles, the expected main path, exactly one color side input
//! and properties within their declared ranges.

pub mod pipeline;
pub mod stages;

pub use pipeline::ValidationPipeline;
pub use stages::{
    ChainValidation, ExpectedTopology, PropertyValidation, SideInputValidation,
    StructuralValidation, ValidationStage,
};
