//! The processing chain for one configuration.

use crate::core::error::NodeId;
use crate::effect::bypass::BypassState;
use crate::effect::pool::NodePool;
use crate::graph::connection::LinkPlan;
use serde::Serialize;

/// Ordered main path from the input boundary to the output boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chain {
    nodes: Vec<NodeId>,
}

impl Chain {
    /// Build the chain for the given blend node and stage activity.
    pub fn build(pool: &NodePool, active_blend: NodeId, bypass: BypassState) -> Self {
        let bloom = if bypass.bloom_active {
            pool.bloom
        } else {
            pool.bloom_bypass
        };
        let soft_glow = if bypass.soft_glow_active {
            pool.soft_glow
        } else {
            pool.soft_glow_bypass
        };

        Self {
            nodes: vec![
                pool.input,
                pool.noise_reduction,
                pool.preprocess,
                active_blend,
                pool.crop,
                pool.hue_chroma,
                bloom,
                soft_glow,
                pool.output,
            ],
        }
    }

    /// All links for this chain: the main path plus both side inputs.
    ///
    /// The color feeds the blend's aux and the original input bounds the crop.
    pub fn link_plan(&self, pool: &NodePool, active_blend: NodeId) -> LinkPlan {
        LinkPlan::new()
            .chain(&self.nodes)
            .side_input(active_blend, pool.color)
            .side_input(pool.crop, pool.input)
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}
