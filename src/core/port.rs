//! Port definitions and constraints for node inputs, outputs and parameters.
//!
//! Ports define the link interface of an operation: a primary `input`, an
//! optional side input (`aux`) and an `output`. Parameters are the
//! properties the effect writes into a node.

use crate::core::types::{PortType, Value};
use serde::{Deserialize, Serialize};

/// Name of the primary input port.
pub const INPUT_PORT: &str = "input";
/// Name of the side input port.
pub const AUX_PORT: &str = "aux";
/// Name of the output port.
pub const OUTPUT_PORT: &str = "output";

/// Direction of a port (input or output).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

/// Definition of a node port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDefinition {
    /// Unique name within the node
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Type of data this port accepts/produces
    pub port_type: PortType,
    /// Direction (input or output)
    pub direction: PortDirection,
    /// Whether the operation still produces output when this port is unlinked
    pub optional: bool,
    /// Description for documentation
    pub description: String,
}

/// Definition of a node parameter or effect meta-parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDefinition {
    /// Unique name within the node
    pub name: String,
    /// Human-readable name
    pub display_name: String,
    /// Type of the parameter
    pub param_type: PortType,
    /// Default value
    pub default_value: Value,
    /// Description for documentation
    pub description: String,
    /// Constraints for validation
    pub constraints: Vec<Constraint>,
}

/// Constraints that can be applied to parameter values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params")]
pub enum Constraint {
    /// Numeric value must be within range [min, max]
    Range { min: f64, max: f64 },
    /// Numeric value must be >= min
    MinValue(f64),
    /// Numeric value must be <= max
    MaxValue(f64),
    /// String must not be empty
    NotEmpty,
    /// Value must be one of the specified options
    OneOf(Vec<Value>),
}

// ============================================================================
// PortDefinition Builder Pattern
// ============================================================================

impl PortDefinition {
    /// Create a new input port definition.
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        let name = name.into();
        Self {
            display_name: name_to_display(&name),
            name,
            port_type,
            direction: PortDirection::Input,
            optional: false,
            description: String::new(),
        }
    }

    /// Create a new output port definition.
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        let name = name.into();
        Self {
            display_name: name_to_display(&name),
            name,
            port_type,
            direction: PortDirection::Output,
            optional: false,
            description: String::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark this port as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

// ============================================================================
// ParameterDefinition Builder Pattern
// ============================================================================

impl ParameterDefinition {
    /// Create a new parameter definition.
    pub fn new(name: impl Into<String>, param_type: PortType, default_value: Value) -> Self {
        let name = name.into();
        Self {
            display_name: name_to_display(&name),
            name,
            param_type,
            default_value,
            description: String::new(),
            constraints: Vec::new(),
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a range constraint.
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.constraints.push(Constraint::Range { min, max });
        self
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Validate a value against this parameter's type and constraints.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        if !self.param_type.matches(value) {
            return Err(format!(
                "Type mismatch for parameter '{}': expected {}, got {}",
                self.name,
                self.param_type,
                value.get_type()
            ));
        }

        for constraint in &self.constraints {
            constraint.validate(value)?;
        }

        Ok(())
    }
}

/// Convert snake_case name to Title Case display name.
fn name_to_display(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Constraint Validation
// ============================================================================

impl Constraint {
    /// Validate a value against this constraint.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            Constraint::Range { min, max } => {
                if let Some(num) = value.as_float() {
                    if num.is_nan() || num < *min || num > *max {
                        return Err(format!("Value {} is out of range [{}, {}]", num, min, max));
                    }
                }
            }

            Constraint::MinValue(min) => {
                if let Some(num) = value.as_float() {
                    if num.is_nan() || num < *min {
                        return Err(format!("Value {} is below minimum {}", num, min));
                    }
                }
            }

            Constraint::MaxValue(max) => {
                if let Some(num) = value.as_float() {
                    if num.is_nan() || num > *max {
                        return Err(format!("Value {} is above maximum {}", num, max));
                    }
                }
            }

            Constraint::NotEmpty => {
                if let Value::String(s) = value {
                    if s.is_empty() {
                        return Err("Value cannot be empty".to_string());
                    }
                }
            }

            Constraint::OneOf(options) => {
                if !options.contains(value) {
                    return Err(format!("Value {} is not one of the allowed options", value));
                }
            }
        }

        Ok(())
    }

    /// Get a human-readable description of this constraint.
    pub fn description(&self) -> String {
        match self {
            Constraint::Range { min, max } => format!("Must be between {} and {}", min, max),
            Constraint::MinValue(min) => format!("Must be at least {}", min),
            Constraint::MaxValue(max) => format!("Must be at most {}", max),
            Constraint::NotEmpty => "Cannot be empty".to_string(),
            Constraint::OneOf(options) => format!("One of {} options", options.len()),
        }
    }
}
