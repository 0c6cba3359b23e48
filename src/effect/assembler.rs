//! The effect instance: owns the node pool and rebuilds the chain.
//!
//! Every reconfiguration runs the same steps:
//!
//! 1. Select the blend node for the current mode
//! 2. Resolve which light stages are bypassed
//! 3. Build the chain and its side inputs as one [`LinkPlan`]
//! 4. Relink the runtime atomically
//! 5. Forward the meta-parameters to the internal nodes
//!
//! A failed relink leaves the previous topology in place.
//!
//! [`LinkPlan`]: crate::graph::connection::LinkPlan

use crate::core::error::{EffectError, EffectResult, GraphResult, NodeId};
use crate::core::error::ValidationReport;
use crate::core::types::Value;
use crate::effect::bypass::{resolve_bypass, BypassState};
use crate::effect::chain::Chain;
use crate::effect::params::{BlendMode, MetaParams};
use crate::effect::pool::NodePool;
use crate::effect::redirect::apply_redirections;
use crate::effect::selector::select_blend;
use crate::graph::runtime::PipelineRuntime;
use crate::graph::serialization::SerializedGraph;
use crate::graph::structure::ProcessingGraph;
use crate::validation::{ExpectedTopology, ValidationPipeline};
use log::{debug, error, info};
use serde::Serialize;
use std::mem;

/// What the last successful relink put in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyState {
    pub blend_mode: BlendMode,
    pub active_blend: NodeId,
    pub bypass: BypassState,
    pub chain: Chain,
    /// Number of successful relinks, attach included.
    pub generation: u64,
}

/// One attached instance of the effect.
pub struct Glowstick<R: PipelineRuntime = ProcessingGraph> {
    runtime: R,
    pool: NodePool,
    params: MetaParams,
    state: AssemblyState,
}

impl<R: PipelineRuntime> Glowstick<R> {
    /// Attach to `runtime` with default parameters.
    pub fn attach(runtime: R) -> EffectResult<Self> {
        Self::attach_with(runtime, MetaParams::default())
    }

    /// Attach to `runtime` with a parameter preset.
    ///
    /// Creates the node pool and performs the first reconfiguration.
    /// Any failure here is fatal.
    pub fn attach_with(mut runtime: R, params: MetaParams) -> EffectResult<Self> {
        params.validate()?;

        let pool = NodePool::create(&mut runtime).map_err(|err| {
            error!("Failed to create node pool: {err}");
            EffectError::Attach(err)
        })?;
        let state = relink(&mut runtime, &pool, &params, 1).map_err(EffectError::Attach)?;
        apply_redirections(&mut runtime, &params, &pool, state.active_blend, state.bypass)
            .map_err(EffectError::Attach)?;

        info!(
            "Attached with {} blend, bloom {}, soft glow {}",
            state.blend_mode,
            stage_label(state.bypass.bloom_active),
            stage_label(state.bypass.soft_glow_active)
        );

        Ok(Self {
            runtime,
            pool,
            params,
            state,
        })
    }

    /// Rebuild the chain from the current parameters.
    ///
    /// On a relink failure the previous chain stays connected and the
    /// recorded state is unchanged.
    pub fn reconfigure(&mut self) -> EffectResult<()> {
        let generation = self.state.generation + 1;
        let state = relink(&mut self.runtime, &self.pool, &self.params, generation).map_err(|err| {
            error!("Reconfiguration failed, keeping previous chain: {err}");
            EffectError::Reconfigure(err)
        })?;

        debug!(
            "Reconfigured (#{}): {} blend, bloom {}, soft glow {}",
            state.generation,
            state.blend_mode,
            stage_label(state.bypass.bloom_active),
            stage_label(state.bypass.soft_glow_active)
        );
        self.state = state;

        apply_redirections(
            &mut self.runtime,
            &self.params,
            &self.pool,
            self.state.active_blend,
            self.state.bypass,
        )
        .map_err(|err| {
            error!("Parameter redirection failed: {err}");
            EffectError::Reconfigure(err)
        })
    }

    /// Write one meta-parameter and reconfigure.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<Value>) -> EffectResult<()> {
        let mut params = self.params.clone();
        params.set(name, value.into())?;
        self.apply_params(params)
    }

    /// Modify several meta-parameters at once and reconfigure.
    pub fn update<F>(&mut self, f: F) -> EffectResult<()>
    where
        F: FnOnce(&mut MetaParams),
    {
        let mut params = self.params.clone();
        f(&mut params);
        self.set_params(params)
    }

    /// Replace every meta-parameter and reconfigure.
    pub fn set_params(&mut self, params: MetaParams) -> EffectResult<()> {
        params.validate()?;
        self.apply_params(params)
    }

    fn apply_params(&mut self, params: MetaParams) -> EffectResult<()> {
        let previous = mem::replace(&mut self.params, params);
        let generation = self.state.generation;

        let result = self.reconfigure();
        if result.is_err() && self.state.generation == generation {
            // Nothing was relinked, so the old parameters still describe the graph
            self.params = previous;
        }
        result
    }

    pub fn params(&self) -> &MetaParams {
        &self.params
    }

    pub fn state(&self) -> &AssemblyState {
        &self.state
    }

    pub fn chain(&self) -> &Chain {
        &self.state.chain
    }

    pub fn active_blend(&self) -> NodeId {
        self.state.active_blend
    }

    pub fn bypass(&self) -> BypassState {
        self.state.bypass
    }

    pub fn pool(&self) -> &NodePool {
        &self.pool
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Detach, handing the runtime back.
    pub fn into_runtime(self) -> R {
        self.runtime
    }
}

impl Glowstick<ProcessingGraph> {
    /// Attach to a fresh in-memory graph.
    pub fn in_memory() -> EffectResult<Self> {
        Self::attach(ProcessingGraph::new().with_name("Glow Stick"))
    }

    /// Check the graph against the recorded chain.
    pub fn validate(&self) -> ValidationReport {
        let expected = ExpectedTopology::new(&self.pool, &self.state);
        ValidationPipeline::default().validate(&self.runtime, &expected)
    }

    /// Like [`validate`](Self::validate), but as an error.
    pub fn ensure_valid(&self) -> EffectResult<()> {
        let report = self.validate();
        if report.success {
            Ok(())
        } else {
            let messages: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
            Err(EffectError::Validation(messages.join("; ")))
        }
    }

    /// Snapshot of the graph for inspection.
    pub fn snapshot(&self) -> SerializedGraph {
        SerializedGraph::from_graph(&self.runtime)
    }
}

fn relink<R: PipelineRuntime + ?Sized>(
    runtime: &mut R,
    pool: &NodePool,
    params: &MetaParams,
    generation: u64,
) -> GraphResult<AssemblyState> {
    let active_blend = select_blend(pool, params.blend_mode);
    let bypass = resolve_bypass(params.bloom_strength, params.soft_glow_brightness);
    let chain = Chain::build(pool, active_blend, bypass);

    runtime.relink(&chain.link_plan(pool, active_blend))?;

    Ok(AssemblyState {
        blend_mode: params.blend_mode,
        active_blend,
        bypass,
        chain,
        generation,
    })
}

fn stage_label(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "bypassed"
    }
}
