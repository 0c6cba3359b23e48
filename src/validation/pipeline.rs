//! Validation pipeline implementation.

use crate::core::error::ValidationReport;
use crate::graph::structure::ProcessingGraph;
use crate::validation::stages::{
    ChainValidation, ExpectedTopology, PropertyValidation, SideInputValidation,
    StructuralValidation, ValidationStage,
};
use log::debug;

/// Multi-stage validation pipeline.
///
/// Runs a series of stages over a graph and collects every error and
/// warning into one report. A fatal error stops the run.
pub struct ValidationPipeline {
    stages: Vec<Box<dyn ValidationStage>>,
}

impl ValidationPipeline {
    /// Create a new pipeline with the given stages.
    pub fn new(stages: Vec<Box<dyn ValidationStage>>) -> Self {
        Self { stages }
    }

    /// Create the default validation pipeline with all standard stages.
    pub fn default_pipeline() -> Self {
        Self {
            stages: vec![
                Box::new(StructuralValidation),
                Box::new(ChainValidation),
                Box::new(SideInputValidation),
                Box::new(PropertyValidation),
            ],
        }
    }

    /// Topology checks only, without property checks.
    pub fn minimal_pipeline() -> Self {
        Self {
            stages: vec![
                Box::new(StructuralValidation),
                Box::new(ChainValidation),
                Box::new(SideInputValidation),
            ],
        }
    }

    /// Add a custom validation stage.
    pub fn add_stage(&mut self, stage: Box<dyn ValidationStage>) {
        self.stages.push(stage);
    }

    /// Validate a graph through all stages.
    pub fn validate(
        &self,
        graph: &ProcessingGraph,
        expected: &ExpectedTopology<'_>,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        for stage in &self.stages {
            match stage.validate(graph, expected) {
                Ok(warnings) => {
                    for warning in warnings {
                        report.add_warning(warning);
                    }
                }
                Err(errors) => {
                    debug!("{} found {} error(s)", stage.name(), errors.len());
                    for error in errors {
                        let is_fatal = error.is_fatal();
                        report.add_error(error);

                        if is_fatal {
                            return report;
                        }
                    }
                }
            }
        }

        report
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ValidationError, ValidationWarning};
    use crate::effect::assembler::Glowstick;
    use crate::graph::connection::LinkPlan;

    struct AlwaysWarn;

    impl ValidationStage for AlwaysWarn {
        fn name(&self) -> &str {
            "Always Warn"
        }

        fn validate(
            &self,
            _graph: &ProcessingGraph,
            _expected: &ExpectedTopology<'_>,
        ) -> Result<Vec<ValidationWarning>, Vec<ValidationError>> {
            Ok(vec![ValidationWarning {
                message: "checked".to_string(),
                node_id: None,
            }])
        }
    }

    #[test]
    fn test_valid_effect_graph() {
        let effect = Glowstick::in_memory().unwrap();
        let expected = ExpectedTopology::new(effect.pool(), effect.state());

        let report = ValidationPipeline::minimal_pipeline().validate(effect.runtime(), &expected);
        assert!(report.success);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_custom_stage_warnings_collected() {
        let effect = Glowstick::in_memory().unwrap();
        let expected = ExpectedTopology::new(effect.pool(), effect.state());

        let mut pipeline = ValidationPipeline::new(Vec::new());
        pipeline.add_stage(Box::new(AlwaysWarn));
        let report = pipeline.validate(effect.runtime(), &expected);

        assert!(report.success);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.summary().contains("1 warning"));
    }

    #[test]
    fn test_unlinked_graph_stops_at_structure() {
        let effect = Glowstick::in_memory().unwrap();
        let pool = effect.pool().clone();
        let state = effect.state().clone();
        let mut graph = effect.into_runtime();
        graph.relink(&LinkPlan::new()).unwrap();

        let expected = ExpectedTopology::new(&pool, &state);
        let report = ValidationPipeline::default().validate(&graph, &expected);

        assert!(!report.success);
        assert_eq!(report.errors, vec![ValidationError::OutputUnreachable]);
    }
}
