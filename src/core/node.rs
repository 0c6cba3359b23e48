//! Operation kinds and node metadata.
//!
//! Every sub-operation the effect can place in its pipeline is one
//! [`OperationKind`]. The pixel work of each kind lives in the external
//! image runtime; this crate only needs to know a kind's ports and
//! properties so that links and property writes can be checked.

use crate::core::port::{
    Constraint, ParameterDefinition, PortDefinition, AUX_PORT, INPUT_PORT, OUTPUT_PORT,
};
use crate::core::types::{Color, PortType, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category for organizing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Graph boundary proxies
    Boundary,
    /// Generators with no image input
    Source,
    /// Geometry operations (crop)
    Transform,
    /// Color adjustments
    Adjust,
    /// Glow and blur style effects
    Light,
    /// Noise operations
    Noise,
    /// Compositing operations
    Composite,
    /// Utility nodes
    #[default]
    Utility,
}

impl Category {
    /// Get the display name for this category.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Boundary => "Boundary",
            Category::Source => "Source",
            Category::Transform => "Transform",
            Category::Adjust => "Adjust",
            Category::Light => "Light",
            Category::Noise => "Noise",
            Category::Composite => "Composite",
            Category::Utility => "Utility",
        }
    }
}

/// The primitive operations the effect is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Where the host feeds the effect's input image.
    InputProxy,
    /// Where the host pulls the effect's output image.
    OutputProxy,
    /// Solid color fill.
    Color,
    Crop,
    /// Bloom glow.
    Bloom,
    SoftGlow,
    /// Forwards its input unchanged.
    Nop,
    HueChroma,
    NoiseReduction,
    /// Layer-mode compositing; blend variants are instances of this kind.
    LayerMode,
    /// A sub-chain described by a pipeline string.
    GraphString,
}

impl OperationKind {
    /// All kinds, in declaration order.
    pub fn all() -> &'static [OperationKind] {
        &[
            OperationKind::InputProxy,
            OperationKind::OutputProxy,
            OperationKind::Color,
            OperationKind::Crop,
            OperationKind::Bloom,
            OperationKind::SoftGlow,
            OperationKind::Nop,
            OperationKind::HueChroma,
            OperationKind::NoiseReduction,
            OperationKind::LayerMode,
            OperationKind::GraphString,
        ]
    }

    /// Stable identifier of the operation.
    pub fn id(&self) -> &'static str {
        match self {
            OperationKind::InputProxy => "input_proxy",
            OperationKind::OutputProxy => "output_proxy",
            OperationKind::Color => "color",
            OperationKind::Crop => "crop",
            OperationKind::Bloom => "bloom",
            OperationKind::SoftGlow => "softglow",
            OperationKind::Nop => "nop",
            OperationKind::HueChroma => "hue_chroma",
            OperationKind::NoiseReduction => "noise_reduction",
            OperationKind::LayerMode => "layer_mode",
            OperationKind::GraphString => "graph",
        }
    }

    /// Whether this kind is one of the host boundary proxies.
    pub fn is_boundary(&self) -> bool {
        matches!(self, OperationKind::InputProxy | OperationKind::OutputProxy)
    }

    /// Describe the ports and properties of this kind.
    pub fn metadata(&self) -> NodeMetadata {
        let image_in = || PortDefinition::input(INPUT_PORT, PortType::Image);
        let image_out = || PortDefinition::output(OUTPUT_PORT, PortType::Image);
        let aux_in = |description: &str| {
            PortDefinition::input(AUX_PORT, PortType::Image)
                .with_description(description)
                .optional()
        };

        match self {
            OperationKind::InputProxy => NodeMetadata::builder(self.id(), "Input")
                .category(Category::Boundary)
                .description("Image supplied by the host")
                .output(image_out())
                .build(),

            OperationKind::OutputProxy => NodeMetadata::builder(self.id(), "Output")
                .category(Category::Boundary)
                .description("Image pulled by the host")
                .input(image_in())
                .build(),

            OperationKind::Color => NodeMetadata::builder(self.id(), "Color")
                .category(Category::Source)
                .description("Infinite plane of a single color")
                .output(image_out())
                .parameter(ParameterDefinition::new(
                    "value",
                    PortType::Color,
                    Value::Color(Color::BLACK),
                ))
                .build(),

            OperationKind::Crop => NodeMetadata::builder(self.id(), "Crop")
                .category(Category::Transform)
                .description("Crops the input, to the aux bounding box when linked")
                .input(image_in())
                .input(aux_in("Reference image whose bounds define the crop"))
                .output(image_out())
                .parameter(ParameterDefinition::new("x", PortType::Float, Value::Float(0.0)))
                .parameter(ParameterDefinition::new("y", PortType::Float, Value::Float(0.0)))
                .parameter(
                    ParameterDefinition::new("width", PortType::Float, Value::Float(0.0))
                        .with_constraint(Constraint::MinValue(0.0)),
                )
                .parameter(
                    ParameterDefinition::new("height", PortType::Float, Value::Float(0.0))
                        .with_constraint(Constraint::MinValue(0.0)),
                )
                .build(),

            OperationKind::Bloom => NodeMetadata::builder(self.id(), "Bloom")
                .category(Category::Light)
                .description("Glow around bright areas")
                .input(image_in())
                .output(image_out())
                .parameter(
                    ParameterDefinition::new("radius", PortType::Float, Value::Float(10.0))
                        .with_range(0.0, 1500.0),
                )
                .parameter(
                    ParameterDefinition::new("softness", PortType::Float, Value::Float(25.0))
                        .with_constraint(Constraint::MinValue(0.0)),
                )
                .parameter(
                    ParameterDefinition::new("strength", PortType::Float, Value::Float(50.0))
                        .with_constraint(Constraint::MinValue(0.0)),
                )
                .build(),

            OperationKind::SoftGlow => NodeMetadata::builder(self.id(), "Softglow")
                .category(Category::Light)
                .description("Soft diffuse glow")
                .input(image_in())
                .output(image_out())
                .parameter(
                    ParameterDefinition::new("glow_radius", PortType::Float, Value::Float(10.0))
                        .with_range(1.0, 150.0),
                )
                .parameter(
                    ParameterDefinition::new("brightness", PortType::Float, Value::Float(0.3))
                        .with_range(0.0, 1.0),
                )
                .parameter(
                    ParameterDefinition::new("sharpness", PortType::Float, Value::Float(0.85))
                        .with_range(0.0, 1.0),
                )
                .build(),

            OperationKind::Nop => NodeMetadata::builder(self.id(), "Nop")
                .category(Category::Utility)
                .description("Passes the input through unchanged")
                .input(image_in())
                .output(image_out())
                .build(),

            OperationKind::HueChroma => NodeMetadata::builder(self.id(), "Hue-Chroma")
                .category(Category::Adjust)
                .description("Adjust hue, chroma and lightness")
                .input(image_in())
                .output(image_out())
                .parameter(
                    ParameterDefinition::new("hue", PortType::Float, Value::Float(0.0))
                        .with_range(-180.0, 180.0),
                )
                .parameter(
                    ParameterDefinition::new("chroma", PortType::Float, Value::Float(0.0))
                        .with_range(-100.0, 100.0),
                )
                .parameter(
                    ParameterDefinition::new("lightness", PortType::Float, Value::Float(0.0))
                        .with_range(-100.0, 100.0),
                )
                .build(),

            OperationKind::NoiseReduction => NodeMetadata::builder(self.id(), "Noise Reduction")
                .category(Category::Noise)
                .description("Edge preserving smoothing")
                .input(image_in())
                .output(image_out())
                .parameter(
                    ParameterDefinition::new("iterations", PortType::Integer, Value::Integer(4))
                        .with_range(0.0, 32.0),
                )
                .build(),

            OperationKind::LayerMode => NodeMetadata::builder(self.id(), "Layer Mode")
                .category(Category::Composite)
                .description("Composites the aux image onto the input with a layer mode")
                .input(image_in())
                .input(aux_in("Layer composited on top of the input"))
                .output(image_out())
                .parameter(
                    ParameterDefinition::new("layer_mode", PortType::Integer, Value::Integer(0))
                        .with_constraint(Constraint::MinValue(0.0)),
                )
                .parameter(
                    ParameterDefinition::new("composite_mode", PortType::Integer, Value::Integer(0))
                        .with_range(0.0, 4.0),
                )
                .parameter(
                    ParameterDefinition::new("blend_space", PortType::Integer, Value::Integer(0))
                        .with_range(0.0, 4.0),
                )
                .parameter(
                    ParameterDefinition::new("opacity", PortType::Float, Value::Float(1.0))
                        .with_range(0.0, 1.0),
                )
                .build(),

            OperationKind::GraphString => NodeMetadata::builder(self.id(), "Graph")
                .category(Category::Utility)
                .description("Sub-chain built from a pipeline description string")
                .input(image_in())
                .output(image_out())
                .parameter(
                    ParameterDefinition::new("string", PortType::String, Value::String(String::new())),
                )
                .build(),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Metadata describing an operation kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMetadata {
    /// Unique identifier for this operation (e.g., "bloom")
    pub id: String,
    /// Human-readable name (e.g., "Bloom")
    pub name: String,
    /// Category for organization
    pub category: Category,
    /// Detailed description
    pub description: String,

    /// Input port definitions
    pub inputs: Vec<PortDefinition>,
    /// Output port definitions
    pub outputs: Vec<PortDefinition>,
    /// Parameter definitions
    pub parameters: Vec<ParameterDefinition>,
}

impl NodeMetadata {
    /// Create a new metadata builder.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> NodeMetadataBuilder {
        NodeMetadataBuilder::new(id, name)
    }

    /// Find an input port by name.
    pub fn get_input(&self, name: &str) -> Option<&PortDefinition> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Find an output port by name.
    pub fn get_output(&self, name: &str) -> Option<&PortDefinition> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Find a parameter by name.
    pub fn get_parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Get all parameter names.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Builder for NodeMetadata.
pub struct NodeMetadataBuilder {
    id: String,
    name: String,
    category: Category,
    description: String,
    inputs: Vec<PortDefinition>,
    outputs: Vec<PortDefinition>,
    parameters: Vec<ParameterDefinition>,
}

impl NodeMetadataBuilder {
    /// Create a new builder with required fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: Category::default(),
            description: String::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Set the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add an input port.
    pub fn input(mut self, port: PortDefinition) -> Self {
        self.inputs.push(port);
        self
    }

    /// Add an output port.
    pub fn output(mut self, port: PortDefinition) -> Self {
        self.outputs.push(port);
        self
    }

    /// Add a parameter.
    pub fn parameter(mut self, param: ParameterDefinition) -> Self {
        self.parameters.push(param);
        self
    }

    /// Build the metadata.
    pub fn build(self) -> NodeMetadata {
        NodeMetadata {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            inputs: self.inputs,
            outputs: self.outputs,
            parameters: self.parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_builder() {
        let metadata = NodeMetadata::builder("test_op", "Test Op")
            .category(Category::Utility)
            .description("A test operation")
            .input(PortDefinition::input("input", PortType::Image))
            .output(PortDefinition::output("output", PortType::Image))
            .build();

        assert_eq!(metadata.id, "test_op");
        assert_eq!(metadata.category, Category::Utility);
        assert_eq!(metadata.inputs.len(), 1);
        assert_eq!(metadata.outputs.len(), 1);
    }

    #[test]
    fn test_boundary_ports() {
        let input = OperationKind::InputProxy.metadata();
        assert!(input.inputs.is_empty());
        assert!(input.get_output(OUTPUT_PORT).is_some());

        let output = OperationKind::OutputProxy.metadata();
        assert!(output.outputs.is_empty());
        assert!(output.get_input(INPUT_PORT).is_some());
    }

    #[test]
    fn test_side_inputs() {
        assert!(OperationKind::LayerMode.metadata().get_input(AUX_PORT).is_some());
        assert!(OperationKind::Crop.metadata().get_input(AUX_PORT).is_some());
        assert!(OperationKind::Bloom.metadata().get_input(AUX_PORT).is_none());
    }

    #[test]
    fn test_redirected_properties_are_declared() {
        let hue_chroma = OperationKind::HueChroma.metadata();
        assert!(hue_chroma.get_parameter("chroma").is_some());
        assert!(hue_chroma.get_parameter("lightness").is_some());

        let bloom = OperationKind::Bloom.metadata();
        assert_eq!(bloom.parameter_names(), vec!["radius", "softness", "strength"]);

        let softglow = OperationKind::SoftGlow.metadata();
        assert!(softglow.get_parameter("glow_radius").is_some());
        assert!(softglow.get_parameter("brightness").is_some());
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = OperationKind::all().iter().map(|k| k.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), OperationKind::all().len());
    }
}
