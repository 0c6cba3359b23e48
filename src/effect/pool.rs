//! The fixed set of nodes the effect owns.
//!
//! Every node is created once, at attach time, with its static configuration.
//! Reconfiguration only relinks these nodes and writes their properties.

use crate::core::error::{GraphResult, NodeId};
use crate::core::node::OperationKind;
use crate::effect::params::BlendMode;
use crate::graph::runtime::{NodeSpec, PipelineRuntime};
use log::debug;
use serde::Serialize;

/// Pipeline description evaluated by the preprocessing node.
pub const PREPROCESS_GRAPH: &str = "gimp:desaturate invert-gamma";

/// Handles to every node of one effect instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodePool {
    pub input: NodeId,
    pub output: NodeId,
    pub color: NodeId,
    pub crop: NodeId,
    pub bloom: NodeId,
    pub soft_glow: NodeId,
    pub bloom_bypass: NodeId,
    pub soft_glow_bypass: NodeId,
    pub hue_chroma: NodeId,
    pub noise_reduction: NodeId,
    pub preprocess: NodeId,
    /// Blend variants, indexed by [`BlendMode::index`].
    pub blends: [NodeId; 9],
}

impl NodePool {
    /// Create every node of the pool and resolve the boundary proxies.
    ///
    /// Stops at the first failure.
    pub fn create<R: PipelineRuntime + ?Sized>(runtime: &mut R) -> GraphResult<Self> {
        let input = runtime.input_proxy()?;
        let output = runtime.output_proxy()?;

        let color = runtime.create_node(NodeSpec::new(OperationKind::Color).with_label("color"))?;
        let crop = runtime.create_node(NodeSpec::new(OperationKind::Crop).with_label("crop"))?;
        let bloom = runtime.create_node(NodeSpec::new(OperationKind::Bloom).with_label("bloom"))?;
        let soft_glow =
            runtime.create_node(NodeSpec::new(OperationKind::SoftGlow).with_label("softglow"))?;
        let bloom_bypass =
            runtime.create_node(NodeSpec::new(OperationKind::Nop).with_label("bloom-bypass"))?;
        let soft_glow_bypass =
            runtime.create_node(NodeSpec::new(OperationKind::Nop).with_label("softglow-bypass"))?;
        let hue_chroma =
            runtime.create_node(NodeSpec::new(OperationKind::HueChroma).with_label("hue-chroma"))?;
        let noise_reduction = runtime.create_node(
            NodeSpec::new(OperationKind::NoiseReduction).with_label("noise-reduction"),
        )?;
        let preprocess = runtime.create_node(
            NodeSpec::new(OperationKind::GraphString)
                .with_property("string", PREPROCESS_GRAPH)
                .with_label("preprocess"),
        )?;

        let mut blends = [input; 9];
        for mode in BlendMode::ALL {
            blends[mode.index()] = runtime.create_node(blend_spec(mode))?;
        }

        debug!("Created node pool with {} blend variants", blends.len());

        Ok(Self {
            input,
            output,
            color,
            crop,
            bloom,
            soft_glow,
            bloom_bypass,
            soft_glow_bypass,
            hue_chroma,
            noise_reduction,
            preprocess,
            blends,
        })
    }

    /// The blend node pre-built for `mode`.
    pub fn blend(&self, mode: BlendMode) -> NodeId {
        self.blends[mode.index()]
    }

    /// Every node in the pool, boundaries included.
    pub fn all_nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![
            self.input,
            self.output,
            self.color,
            self.crop,
            self.bloom,
            self.soft_glow,
            self.bloom_bypass,
            self.soft_glow_bypass,
            self.hue_chroma,
            self.noise_reduction,
            self.preprocess,
        ];
        nodes.extend_from_slice(&self.blends);
        nodes
    }
}

/// Layer-mode number and blend space for each variant.
///
/// Composite mode is always 0 (union).
pub fn blend_config(mode: BlendMode) -> (i64, i64) {
    match mode {
        BlendMode::GrainMerge => (47, 0),
        BlendMode::HslColor => (39, 0),
        BlendMode::SoftLight => (45, 0),
        BlendMode::Overlay => (23, 0),
        BlendMode::Burn => (43, 2),
        BlendMode::LchColor => (26, 3),
        BlendMode::Multiply => (30, 2),
        BlendMode::LinearLight => (50, 2),
        BlendMode::HardLight => (44, 0),
    }
}

fn blend_spec(mode: BlendMode) -> NodeSpec {
    let (layer_mode, blend_space) = blend_config(mode);
    NodeSpec::new(OperationKind::LayerMode)
        .with_property("layer_mode", layer_mode)
        .with_property("composite_mode", 0i64)
        .with_property("blend_space", blend_space)
        .with_label(format!("blend:{}", mode.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Value;
    use crate::graph::structure::ProcessingGraph;
    use std::collections::HashSet;

    #[test]
    fn test_pool_creates_every_node_once() {
        let mut graph = ProcessingGraph::new();
        let pool = NodePool::create(&mut graph).unwrap();

        let nodes = pool.all_nodes();
        let unique: HashSet<_> = nodes.iter().collect();
        assert_eq!(nodes.len(), 20);
        assert_eq!(unique.len(), 20);
        assert_eq!(graph.node_count(), 20);
        assert_eq!(graph.count_kind(OperationKind::LayerMode), 9);
        assert_eq!(graph.count_kind(OperationKind::Nop), 2);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_blend_static_config() {
        let mut graph = ProcessingGraph::new();
        let pool = NodePool::create(&mut graph).unwrap();

        let non_default: Vec<BlendMode> = BlendMode::ALL
            .into_iter()
            .filter(|mode| {
                graph.get_property(pool.blend(*mode), "blend_space").unwrap() != Value::Integer(0)
            })
            .collect();
        assert_eq!(
            non_default,
            vec![
                BlendMode::Burn,
                BlendMode::LchColor,
                BlendMode::Multiply,
                BlendMode::LinearLight
            ]
        );

        let soft_light = pool.blend(BlendMode::SoftLight);
        assert_eq!(graph.get_property(soft_light, "layer_mode").unwrap(), Value::Integer(45));
        assert_eq!(graph.get_property(soft_light, "composite_mode").unwrap(), Value::Integer(0));
    }

    #[test]
    fn test_preprocess_string() {
        let mut graph = ProcessingGraph::new();
        let pool = NodePool::create(&mut graph).unwrap();

        assert_eq!(
            graph.get_property(pool.preprocess, "string").unwrap(),
            Value::from(PREPROCESS_GRAPH)
        );
    }
}
