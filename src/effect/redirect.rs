//! Forwarding of meta-parameters to the internal nodes.

use crate::core::error::{GraphError, GraphResult, NodeId};
use crate::effect::bypass::BypassState;
use crate::effect::params::{self, MetaParams};
use crate::effect::pool::NodePool;
use crate::graph::runtime::PipelineRuntime;
use log::trace;

/// Pool node that receives a redirected parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedirectTarget {
    HueChroma,
    NoiseReduction,
    SoftGlow,
    Bloom,
    Color,
}

impl RedirectTarget {
    /// Resolve to a node of `pool`.
    pub fn resolve(&self, pool: &NodePool) -> NodeId {
        match self {
            RedirectTarget::HueChroma => pool.hue_chroma,
            RedirectTarget::NoiseReduction => pool.noise_reduction,
            RedirectTarget::SoftGlow => pool.soft_glow,
            RedirectTarget::Bloom => pool.bloom,
            RedirectTarget::Color => pool.color,
        }
    }

    fn is_bypassed(&self, bypass: BypassState) -> bool {
        match self {
            RedirectTarget::Bloom => !bypass.bloom_active,
            RedirectTarget::SoftGlow => !bypass.soft_glow_active,
            _ => false,
        }
    }
}

/// One entry of the redirection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirection {
    pub parameter: &'static str,
    pub target: RedirectTarget,
    pub property: &'static str,
}

const fn entry(parameter: &'static str, target: RedirectTarget, property: &'static str) -> Redirection {
    Redirection {
        parameter,
        target,
        property,
    }
}

/// Every redirected meta-parameter. The blend mode is not redirected; it
/// selects a node instead.
pub const REDIRECTIONS: [Redirection; 9] = [
    entry(params::CHROMA, RedirectTarget::HueChroma, "chroma"),
    entry(params::LIGHTNESS, RedirectTarget::HueChroma, "lightness"),
    entry(params::NOISE_REDUCTION, RedirectTarget::NoiseReduction, "iterations"),
    entry(params::SOFT_GLOW_BRIGHTNESS, RedirectTarget::SoftGlow, "brightness"),
    entry(params::SOFT_GLOW_RADIUS, RedirectTarget::SoftGlow, "glow_radius"),
    entry(params::BLOOM_RADIUS, RedirectTarget::Bloom, "radius"),
    entry(params::BLOOM_SOFTNESS, RedirectTarget::Bloom, "softness"),
    entry(params::BLOOM_STRENGTH, RedirectTarget::Bloom, "strength"),
    entry(params::COLOR, RedirectTarget::Color, "value"),
];

/// Write every table entry into its target node.
///
/// Bypassed stages are written too, so re-enabling one picks up the
/// current values. Writing the same parameters twice is a no-op.
pub fn apply_redirections<R: PipelineRuntime + ?Sized>(
    runtime: &mut R,
    params: &MetaParams,
    pool: &NodePool,
    active_blend: NodeId,
    bypass: BypassState,
) -> GraphResult<()> {
    for redirection in &REDIRECTIONS {
        let node = redirection.target.resolve(pool);
        let value = params
            .get(redirection.parameter)
            .map_err(|_| GraphError::PropertyNotFound {
                node_id: node,
                property: redirection.parameter.to_string(),
            })?;

        trace!(
            "{} -> {}.{} = {}{}",
            redirection.parameter,
            node,
            redirection.property,
            value,
            if redirection.target.is_bypassed(bypass) { " (bypassed)" } else { "" }
        );
        runtime.set_property(node, redirection.property, value)?;
    }

    trace!("Redirections applied, active blend {active_blend}");
    Ok(())
}
