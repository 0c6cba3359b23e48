//! Individual validation stages.
//!
//! Each stage checks one category of topology invariant.

use crate::core::error::{NodeId, ValidationError, ValidationWarning};
use crate::core::port::{AUX_PORT, INPUT_PORT, OUTPUT_PORT};
use crate::effect::assembler::AssemblyState;
use crate::effect::chain::Chain;
use crate::effect::pool::NodePool;
use crate::graph::structure::ProcessingGraph;
use crate::graph::topology::TopologyAnalyzer;

/// What the graph should look like after the last relink.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedTopology<'a> {
    pub pool: &'a NodePool,
    pub chain: &'a Chain,
    pub active_blend: NodeId,
}

impl<'a> ExpectedTopology<'a> {
    pub fn new(pool: &'a NodePool, state: &'a AssemblyState) -> Self {
        Self {
            pool,
            chain: &state.chain,
            active_blend: state.active_blend,
        }
    }

    /// Whether `from -> to` is a link the effect creates.
    fn expects_link(&self, from: NodeId, from_port: &str, to: NodeId, to_port: &str) -> bool {
        if from_port != OUTPUT_PORT {
            return false;
        }
        match to_port {
            INPUT_PORT => self
                .chain
                .nodes()
                .windows(2)
                .any(|pair| pair[0] == from && pair[1] == to),
            AUX_PORT => {
                (to == self.active_blend && from == self.pool.color)
                    || (to == self.pool.crop && from == self.pool.input)
            }
            _ => false,
        }
    }
}

/// Trait for validation stages.
pub trait ValidationStage: Send + Sync {
    /// Name of this validation stage.
    fn name(&self) -> &str;

    /// Validate the graph.
    ///
    /// Returns Ok with warnings, or Err with errors.
    fn validate(
        &self,
        graph: &ProcessingGraph,
        expected: &ExpectedTopology<'_>,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>>;
}

/// Structural validation - checks graph structure.
///
/// Verifies:
/// - Graph is a DAG (no cycles)
/// - The output boundary is reached from the input boundary
/// - No link exists that the effect did not create
pub struct StructuralValidation;

impl ValidationStage for StructuralValidation {
    fn name(&self) -> &str {
        "Structural Validation"
    }

    fn validate(
        &self,
        graph: &ProcessingGraph,
        expected: &ExpectedTopology<'_>,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let analyzer = TopologyAnalyzer::new(graph);
        if analyzer.has_cycle() {
            return Err(vec![ValidationError::CycleDetected]);
        }

        let mut errors = Vec::new();

        if analyzer.main_path(expected.pool.input).last() != Some(&expected.pool.output) {
            errors.push(ValidationError::OutputUnreachable);
        }

        for conn in graph.connections() {
            let known = expected.expects_link(
                conn.from.node_id,
                &conn.from.port_name,
                conn.to.node_id,
                &conn.to.port_name,
            );
            if !known {
                errors.push(ValidationError::StrayLink {
                    from: conn.from.node_id,
                    to: conn.to.node_id,
                });
            }
        }

        if errors.is_empty() {
            Ok(Vec::new())
        } else {
            Err(errors)
        }
    }
}

/// Chain validation - the main path is exactly the recorded chain.
pub struct ChainValidation;

impl ValidationStage for ChainValidation {
    fn name(&self) -> &str {
        "Chain Validation"
    }

    fn validate(
        &self,
        graph: &ProcessingGraph,
        expected: &ExpectedTopology<'_>,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let found = TopologyAnalyzer::new(graph).main_path(expected.pool.input);

        if found == expected.chain.nodes() {
            Ok(Vec::new())
        } else {
            Err(vec![ValidationError::ChainMismatch {
                expected: expected.chain.nodes().to_vec(),
                found,
            }])
        }
    }
}

/// Side input validation.
///
/// Verifies:
/// - Exactly one blend node has its aux linked, and it is the active one
/// - The active blend's aux is fed by the color node
/// - The crop's aux is fed by the input boundary
pub struct SideInputValidation;

impl ValidationStage for SideInputValidation {
    fn name(&self) -> &str {
        "Side Input Validation"
    }

    fn validate(
        &self,
        graph: &ProcessingGraph,
        expected: &ExpectedTopology<'_>,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let pool = expected.pool;

        let linked = pool
            .blends
            .iter()
            .filter(|blend| graph.is_input_connected(**blend, AUX_PORT))
            .count();
        if linked != 1 {
            errors.push(ValidationError::BlendSideInputCount { count: linked });
        }

        if graph.source_of(expected.active_blend, AUX_PORT) != Some(pool.color) {
            errors.push(ValidationError::SideInputMismatch {
                node_id: expected.active_blend,
                expected: pool.color,
            });
        }

        if graph.source_of(pool.crop, AUX_PORT) != Some(pool.input) {
            errors.push(ValidationError::SideInputMismatch {
                node_id: pool.crop,
                expected: pool.input,
            });
        }

        if errors.is_empty() {
            Ok(Vec::new())
        } else {
            Err(errors)
        }
    }
}

/// Property validation - every written property satisfies its declaration.
///
/// Also warns about chain nodes still running on operation defaults for
/// properties the effect usually sets.
pub struct PropertyValidation;

impl ValidationStage for PropertyValidation {
    fn name(&self) -> &str {
        "Property Validation"
    }

    fn validate(
        &self,
        graph: &ProcessingGraph,
        expected: &ExpectedTopology<'_>,
    ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for node in graph.nodes() {
            let metadata = node.kind.metadata();

            for (name, value) in &node.properties {
                let result = match metadata.get_parameter(name) {
                    Some(definition) => definition.validate(value),
                    None => Err("property is not declared".to_string()),
                };
                if let Err(error) = result {
                    errors.push(ValidationError::ConstraintViolation {
                        node_id: node.id,
                        property: name.clone(),
                        error,
                    });
                }
            }

            if expected.chain.contains(node.id)
                && !metadata.parameters.is_empty()
                && node.properties.is_empty()
            {
                warnings.push(ValidationWarning {
                    message: format!("'{}' runs on default properties", node.display_name()),
                    node_id: Some(node.id),
                });
            }
        }

        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Value;
    use crate::effect::assembler::Glowstick;
    use crate::graph::connection::LinkPlan;

    #[test]
    fn test_attached_effect_passes_every_stage() {
        let effect = Glowstick::in_memory().unwrap();
        let expected = ExpectedTopology::new(effect.pool(), effect.state());
        let graph = effect.runtime();

        assert!(StructuralValidation.validate(graph, &expected).is_ok());
        assert!(ChainValidation.validate(graph, &expected).is_ok());
        assert!(SideInputValidation.validate(graph, &expected).is_ok());
        assert!(PropertyValidation.validate(graph, &expected).is_ok());
    }

    #[test]
    fn test_detects_second_blend_side_input() {
        let effect = Glowstick::in_memory().unwrap();
        let pool = effect.pool().clone();
        let state = effect.state().clone();
        let mut graph = effect.into_runtime();

        let other = pool.blends[0];
        graph.connect(pool.color, "output", other, "aux").unwrap();

        let expected = ExpectedTopology::new(&pool, &state);
        let errors = SideInputValidation.validate(&graph, &expected).unwrap_err();
        assert_eq!(errors, vec![ValidationError::BlendSideInputCount { count: 2 }]);

        let errors = StructuralValidation.validate(&graph, &expected).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::StrayLink {
                from: pool.color,
                to: other
            }]
        );
    }

    #[test]
    fn test_detects_broken_chain() {
        let effect = Glowstick::in_memory().unwrap();
        let pool = effect.pool().clone();
        let state = effect.state().clone();
        let mut graph = effect.into_runtime();

        // Skip the hue-chroma stage
        let nodes: Vec<NodeId> = state
            .chain
            .nodes()
            .iter()
            .copied()
            .filter(|id| *id != pool.hue_chroma)
            .collect();
        let plan = LinkPlan::new()
            .chain(&nodes)
            .side_input(state.active_blend, pool.color)
            .side_input(pool.crop, pool.input);
        graph.relink(&plan).unwrap();

        let expected = ExpectedTopology::new(&pool, &state);
        assert!(matches!(
            ChainValidation.validate(&graph, &expected),
            Err(errors) if matches!(errors[0], ValidationError::ChainMismatch { .. })
        ));
        assert!(StructuralValidation.validate(&graph, &expected).is_err());
    }

    #[test]
    fn test_detects_unreachable_output() {
        let effect = Glowstick::in_memory().unwrap();
        let pool = effect.pool().clone();
        let state = effect.state().clone();
        let mut graph = effect.into_runtime();

        graph.disconnect_input(pool.output, "input");

        let expected = ExpectedTopology::new(&pool, &state);
        let errors = StructuralValidation.validate(&graph, &expected).unwrap_err();
        assert!(errors.contains(&ValidationError::OutputUnreachable));
    }

    #[test]
    fn test_warns_on_default_properties() {
        let effect = Glowstick::in_memory().unwrap();
        let expected = ExpectedTopology::new(effect.pool(), effect.state());

        let warnings = PropertyValidation
            .validate(effect.runtime(), &expected)
            .unwrap();
        // The crop is only bounded by its aux input
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].node_id, Some(effect.pool().crop));
        assert_eq!(
            effect.runtime().get_property(effect.pool().crop, "width").unwrap(),
            Value::Float(0.0)
        );
    }
}
