//! # Glowstick - a glow meta-filter
//!
//! Glowstick composes a fixed set of image operations into one effect:
//! noise reduction, a desaturating preprocess, a solid color composited with
//! one of nine blend modes, a crop back to the input bounds, a hue-chroma
//! adjustment and two optional light stages (bloom and soft glow).
//!
//! ## Quick Start
//!
//! ```rust
//! use glowstick::prelude::*;
//!
//! let mut effect = Glowstick::in_memory().unwrap();
//! assert_eq!(effect.params().blend_mode, BlendMode::SoftLight);
//!
//! effect.set_parameter("blend_mode", "multiply").unwrap();
//! effect.set_parameter("bloom_strength", 5.0).unwrap();
//!
//! assert!(effect.bypass().bloom_active);
//! assert!(effect.validate().success);
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Value types, operation metadata and error handling
//! - [`graph`]: The runtime seam and an in-memory graph implementing it
//! - [`effect`]: Node pool, blend selection, bypass policy, parameter
//!   redirection and the assembler
//! - [`validation`]: Topology checks over an assembled graph
//! - [`config`]: TOML configuration files
//!
//! ## Hosting
//!
//! Implement [`PipelineRuntime`](graph::PipelineRuntime) over the host's
//! node graph and pass it to [`Glowstick::attach`](effect::Glowstick::attach).
//! The runtime must apply link plans atomically.

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod effect;
pub mod graph;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust
/// use glowstick::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::types::{Color, PortType, Value};
    pub use crate::core::node::{Category, NodeMetadata, OperationKind};
    pub use crate::core::port::{Constraint, ParameterDefinition, PortDefinition};

    // Errors
    pub use crate::core::error::{
        EffectError, GlowstickError, GraphError, NodeId, ParameterError, ValidationError,
        ValidationReport, ValidationWarning,
    };

    // Graph
    pub use crate::graph::connection::{Connection, Endpoint, LinkPlan};
    pub use crate::graph::runtime::{NodeSpec, PipelineRuntime};
    pub use crate::graph::serialization::SerializedGraph;
    pub use crate::graph::structure::{GraphNode, ProcessingGraph};
    pub use crate::graph::topology::TopologyAnalyzer;

    // Effect
    pub use crate::effect::{
        apply_redirections, resolve_bypass, select_blend, AssemblyState, BlendMode, BypassState,
        Chain, Glowstick, MetaParams, NodePool,
    };

    // Validation
    pub use crate::validation::{ExpectedTopology, ValidationPipeline, ValidationStage};

    // Configuration
    pub use crate::config::GlowstickConfig;
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "glowstick");
    }

    #[test]
    fn test_attach_from_config() {
        let config = GlowstickConfig::from_toml_str(
            "[params]\nblend_mode = \"hard-light\"\nbloom_strength = 5.0\n",
        )
        .unwrap();

        let effect = Glowstick::attach_with(ProcessingGraph::new(), config.params).unwrap();
        let pool = effect.pool();

        assert_eq!(effect.active_blend(), pool.blend(BlendMode::HardLight));
        assert!(effect.chain().contains(pool.bloom));
        assert!(effect.chain().contains(pool.soft_glow_bypass));
    }

    #[test]
    fn test_snapshot_lists_whole_pool() {
        let effect = Glowstick::in_memory().unwrap();
        let snapshot = effect.snapshot();

        assert_eq!(snapshot.nodes.len(), effect.pool().all_nodes().len());
        assert_eq!(snapshot.connections.len(), effect.chain().len() - 1 + 2);
        assert_eq!(snapshot.name.as_deref(), Some("Glow Stick"));
    }
}
