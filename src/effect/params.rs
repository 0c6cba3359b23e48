//! Meta-parameters exposed by the effect.
//!
//! [`MetaParams`] is the typed parameter store. Name-based access goes through
//! [`MetaParams::get`] and [`MetaParams::set`], which check every write against
//! the declarations returned by [`MetaParams::definitions`].

use crate::core::error::{ParameterError, ParameterResult};
use crate::core::port::{Constraint, ParameterDefinition};
use crate::core::types::{Color, PortType, Value};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const BLEND_MODE: &str = "blend_mode";
pub const NOISE_REDUCTION: &str = "noise_reduction";
pub const CHROMA: &str = "chroma";
pub const LIGHTNESS: &str = "lightness";
pub const BLOOM_STRENGTH: &str = "bloom_strength";
pub const BLOOM_SOFTNESS: &str = "bloom_softness";
pub const BLOOM_RADIUS: &str = "bloom_radius";
pub const SOFT_GLOW_BRIGHTNESS: &str = "soft_glow_brightness";
pub const SOFT_GLOW_RADIUS: &str = "soft_glow_radius";
pub const COLOR: &str = "color";

// ============================================================================
// Blend Mode
// ============================================================================

/// How the solid color is composited onto the preprocessed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    GrainMerge,
    HslColor,
    #[default]
    SoftLight,
    Overlay,
    Burn,
    LchColor,
    Multiply,
    LinearLight,
    HardLight,
}

impl BlendMode {
    /// Every mode, in declaration order.
    pub const ALL: [BlendMode; 9] = [
        BlendMode::GrainMerge,
        BlendMode::HslColor,
        BlendMode::SoftLight,
        BlendMode::Overlay,
        BlendMode::Burn,
        BlendMode::LchColor,
        BlendMode::Multiply,
        BlendMode::LinearLight,
        BlendMode::HardLight,
    ];

    /// Position in [`BlendMode::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Look up a mode by its raw index.
    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Resolve a raw index, falling back to soft-light when unrecognized.
    pub fn from_raw_index(index: i64) -> Self {
        Self::from_index(index).unwrap_or_else(|| {
            warn!("Unrecognized blend mode index {index}, using soft-light");
            BlendMode::SoftLight
        })
    }

    /// Resolve a raw name, falling back to soft-light when unrecognized.
    pub fn from_raw_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("Unrecognized blend mode '{name}', using soft-light");
            BlendMode::SoftLight
        })
    }

    /// Machine name, as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            BlendMode::GrainMerge => "grain-merge",
            BlendMode::HslColor => "hsl-color",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Overlay => "overlay",
            BlendMode::Burn => "burn",
            BlendMode::LchColor => "lch-color",
            BlendMode::Multiply => "multiply",
            BlendMode::LinearLight => "linear-light",
            BlendMode::HardLight => "hard-light",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            BlendMode::GrainMerge => "Grain merge",
            BlendMode::HslColor => "HSL color",
            BlendMode::SoftLight => "Soft light",
            BlendMode::Overlay => "Overlay",
            BlendMode::Burn => "Burn",
            BlendMode::LchColor => "LCh color",
            BlendMode::Multiply => "Multiply",
            BlendMode::LinearLight => "Linear light",
            BlendMode::HardLight => "Hard light",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BlendMode {
    type Err = ParameterError;

    /// Accepts machine names, display names and raw indices, ignoring case
    /// and separators.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<i64>() {
            return Self::from_index(index).ok_or_else(|| ParameterError::OutOfRange {
                name: BLEND_MODE.to_string(),
                error: format!("index {index} is not in 0..{}", Self::ALL.len()),
            });
        }

        let key = normalize(trimmed);
        Self::ALL
            .iter()
            .copied()
            .find(|mode| normalize(mode.name()) == key || normalize(mode.display_name()) == key)
            .ok_or_else(|| ParameterError::InvalidValue {
                name: BLEND_MODE.to_string(),
                error: format!("unknown blend mode '{s}'"),
            })
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ============================================================================
// Parameter Store
// ============================================================================

/// The effect's user-facing parameters.
///
/// Missing fields deserialize to their defaults, so a partial preset table
/// is valid input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaParams {
    pub blend_mode: BlendMode,
    pub noise_reduction: i64,
    pub chroma: f64,
    pub lightness: f64,
    pub bloom_strength: f64,
    pub bloom_softness: f64,
    pub bloom_radius: f64,
    pub soft_glow_brightness: f64,
    pub soft_glow_radius: f64,
    #[serde(with = "hex_color")]
    pub color: Color,
}

impl Default for MetaParams {
    fn default() -> Self {
        Self {
            blend_mode: BlendMode::SoftLight,
            noise_reduction: 2,
            chroma: 0.0,
            lightness: 0.0,
            bloom_strength: 0.0,
            bloom_softness: 7.0,
            bloom_radius: 10.0,
            soft_glow_brightness: 0.0,
            soft_glow_radius: 1.0,
            color: Color::GLOWSTICK_PINK,
        }
    }
}

impl MetaParams {
    /// Declarations of every parameter, in display order.
    pub fn definitions() -> Vec<ParameterDefinition> {
        let defaults = Self::default();
        let modes = BlendMode::ALL
            .iter()
            .map(|mode| Value::String(mode.name().to_string()))
            .collect();

        vec![
            ParameterDefinition::new(
                BLEND_MODE,
                PortType::String,
                Value::String(defaults.blend_mode.name().to_string()),
            )
            .with_description("Layer mode used to composite the color")
            .with_constraint(Constraint::OneOf(modes)),
            ParameterDefinition::new(
                NOISE_REDUCTION,
                PortType::Integer,
                Value::Integer(defaults.noise_reduction),
            )
            .with_description("Smoothing iterations before compositing")
            .with_range(0.0, 6.0),
            ParameterDefinition::new(CHROMA, PortType::Float, Value::Float(defaults.chroma))
                .with_range(0.0, 15.0),
            ParameterDefinition::new(LIGHTNESS, PortType::Float, Value::Float(defaults.lightness))
                .with_range(-24.0, 7.0),
            ParameterDefinition::new(
                BLOOM_STRENGTH,
                PortType::Float,
                Value::Float(defaults.bloom_strength),
            )
            .with_display_name("Glow Strength")
            .with_description("Bloom is bypassed at zero")
            .with_range(0.0, f64::MAX),
            ParameterDefinition::new(
                BLOOM_SOFTNESS,
                PortType::Float,
                Value::Float(defaults.bloom_softness),
            )
            .with_display_name("Glow Softness")
            .with_range(7.0, f64::MAX),
            ParameterDefinition::new(
                BLOOM_RADIUS,
                PortType::Float,
                Value::Float(defaults.bloom_radius),
            )
            .with_display_name("Glow Radius")
            .with_range(0.0, 100.0),
            ParameterDefinition::new(
                SOFT_GLOW_BRIGHTNESS,
                PortType::Float,
                Value::Float(defaults.soft_glow_brightness),
            )
            .with_description("Soft glow is bypassed at zero")
            .with_range(0.0, 0.25),
            ParameterDefinition::new(
                SOFT_GLOW_RADIUS,
                PortType::Float,
                Value::Float(defaults.soft_glow_radius),
            )
            .with_range(1.0, 150.0),
            ParameterDefinition::new(COLOR, PortType::Color, Value::Color(defaults.color))
                .with_description("Color composited over the image"),
        ]
    }

    /// Declaration of a single parameter.
    pub fn definition(name: &str) -> ParameterResult<ParameterDefinition> {
        Self::definitions()
            .into_iter()
            .find(|def| def.name == name)
            .ok_or_else(|| ParameterError::Unknown(name.to_string()))
    }

    /// Read a parameter by name.
    pub fn get(&self, name: &str) -> ParameterResult<Value> {
        let value = match name {
            BLEND_MODE => Value::String(self.blend_mode.name().to_string()),
            NOISE_REDUCTION => Value::Integer(self.noise_reduction),
            CHROMA => Value::Float(self.chroma),
            LIGHTNESS => Value::Float(self.lightness),
            BLOOM_STRENGTH => Value::Float(self.bloom_strength),
            BLOOM_SOFTNESS => Value::Float(self.bloom_softness),
            BLOOM_RADIUS => Value::Float(self.bloom_radius),
            SOFT_GLOW_BRIGHTNESS => Value::Float(self.soft_glow_brightness),
            SOFT_GLOW_RADIUS => Value::Float(self.soft_glow_radius),
            COLOR => Value::Color(self.color),
            _ => return Err(ParameterError::Unknown(name.to_string())),
        };
        Ok(value)
    }

    /// Write a parameter by name.
    ///
    /// The blend mode takes a name or an index, the color a [`Value::Color`]
    /// or a hex string. Rejected writes leave the store unchanged.
    pub fn set(&mut self, name: &str, value: Value) -> ParameterResult<()> {
        match name {
            BLEND_MODE => {
                self.blend_mode = match &value {
                    Value::String(s) => s.parse()?,
                    Value::Integer(i) => {
                        BlendMode::from_index(*i).ok_or_else(|| ParameterError::OutOfRange {
                            name: name.to_string(),
                            error: format!("index {i} is not in 0..{}", BlendMode::ALL.len()),
                        })?
                    }
                    other => return Err(mismatch(name, PortType::String, other)),
                };
                return Ok(());
            }
            COLOR => {
                self.color = match &value {
                    Value::Color(color) => *color,
                    Value::String(hex) => {
                        Color::from_hex(hex).map_err(|error| ParameterError::InvalidValue {
                            name: name.to_string(),
                            error,
                        })?
                    }
                    other => return Err(mismatch(name, PortType::Color, other)),
                };
                return Ok(());
            }
            _ => {}
        }

        let definition = Self::definition(name)?;
        if !definition.param_type.matches(&value) {
            return Err(mismatch(name, definition.param_type, &value));
        }
        check_constraints(&definition, &value)?;

        if name == NOISE_REDUCTION {
            if let Some(iterations) = value.as_integer() {
                self.noise_reduction = iterations;
            }
            return Ok(());
        }

        let Some(number) = value.as_float() else {
            return Err(mismatch(name, PortType::Float, &value));
        };
        match name {
            CHROMA => self.chroma = number,
            LIGHTNESS => self.lightness = number,
            BLOOM_STRENGTH => self.bloom_strength = number,
            BLOOM_SOFTNESS => self.bloom_softness = number,
            BLOOM_RADIUS => self.bloom_radius = number,
            SOFT_GLOW_BRIGHTNESS => self.soft_glow_brightness = number,
            SOFT_GLOW_RADIUS => self.soft_glow_radius = number,
            _ => return Err(ParameterError::Unknown(name.to_string())),
        }
        Ok(())
    }

    /// Check every field against its declared range.
    pub fn validate(&self) -> ParameterResult<()> {
        for definition in Self::definitions() {
            let value = self.get(&definition.name)?;
            check_constraints(&definition, &value)?;
        }
        Ok(())
    }
}

fn check_constraints(definition: &ParameterDefinition, value: &Value) -> ParameterResult<()> {
    for constraint in &definition.constraints {
        constraint
            .validate(value)
            .map_err(|error| ParameterError::OutOfRange {
                name: definition.name.clone(),
                error,
            })?;
    }
    Ok(())
}

fn mismatch(name: &str, expected: PortType, got: &Value) -> ParameterError {
    ParameterError::TypeMismatch {
        name: name.to_string(),
        expected,
        got: got.get_type(),
    }
}

/// Colors are stored as `#RRGGBB` or `#RRGGBBAA` strings in presets.
mod hex_color {
    use crate::core::types::Color;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Color::from_hex(&hex).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = MetaParams::default();
        assert_eq!(params.blend_mode, BlendMode::SoftLight);
        assert_eq!(params.noise_reduction, 2);
        assert_eq!(params.bloom_softness, 7.0);
        assert_eq!(params.color, Color::rgb(0xFF, 0xAC, 0xF9));
        params.validate().unwrap();
    }

    #[test]
    fn test_definitions_match_getters() {
        let params = MetaParams::default();
        let definitions = MetaParams::definitions();
        assert_eq!(definitions.len(), 10);

        for definition in definitions {
            assert_eq!(params.get(&definition.name).unwrap(), definition.default_value);
        }
    }

    #[test]
    fn test_blend_mode_parsing() {
        assert_eq!("soft-light".parse::<BlendMode>().unwrap(), BlendMode::SoftLight);
        assert_eq!("Hard light".parse::<BlendMode>().unwrap(), BlendMode::HardLight);
        assert_eq!("LCH_COLOR".parse::<BlendMode>().unwrap(), BlendMode::LchColor);
        assert_eq!("6".parse::<BlendMode>().unwrap(), BlendMode::Multiply);
        assert!("9".parse::<BlendMode>().is_err());
        assert!("dodge".parse::<BlendMode>().is_err());
    }

    #[test]
    fn test_blend_mode_raw_fallback() {
        assert_eq!(BlendMode::from_raw_index(0), BlendMode::GrainMerge);
        assert_eq!(BlendMode::from_raw_index(8), BlendMode::HardLight);
        assert_eq!(BlendMode::from_raw_index(9), BlendMode::SoftLight);
        assert_eq!(BlendMode::from_raw_index(-1), BlendMode::SoftLight);
        assert_eq!(BlendMode::from_raw_name("screen"), BlendMode::SoftLight);

        for (i, mode) in BlendMode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), i);
        }
    }

    #[test]
    fn test_set_by_name() {
        let mut params = MetaParams::default();

        params.set(BLEND_MODE, Value::from("multiply")).unwrap();
        params.set(BLOOM_STRENGTH, Value::Float(5.0)).unwrap();
        params.set(NOISE_REDUCTION, Value::Integer(6)).unwrap();
        params.set(SOFT_GLOW_RADIUS, Value::Integer(20)).unwrap();
        params.set(COLOR, Value::from("#00ff00")).unwrap();

        assert_eq!(params.blend_mode, BlendMode::Multiply);
        assert_eq!(params.bloom_strength, 5.0);
        assert_eq!(params.noise_reduction, 6);
        assert_eq!(params.soft_glow_radius, 20.0);
        assert_eq!(params.color, Color::rgb(0, 255, 0));
    }

    #[test]
    fn test_set_rejects_without_change() {
        let mut params = MetaParams::default();

        assert!(matches!(
            params.set(CHROMA, Value::Float(15.5)),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set(BLOOM_SOFTNESS, Value::Float(6.9)),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set(BLOOM_STRENGTH, Value::Float(f64::INFINITY)),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set(BLOOM_SOFTNESS, Value::Float(f64::INFINITY)),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set(SOFT_GLOW_BRIGHTNESS, Value::Float(f64::NAN)),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set(NOISE_REDUCTION, Value::Float(2.0)),
            Err(ParameterError::TypeMismatch { .. })
        ));
        assert!(matches!(
            params.set(BLEND_MODE, Value::Integer(12)),
            Err(ParameterError::OutOfRange { .. })
        ));
        assert!(matches!(
            params.set("glow", Value::Float(1.0)),
            Err(ParameterError::Unknown(_))
        ));

        assert_eq!(params, MetaParams::default());
    }

    #[test]
    fn test_partial_preset_deserializes_with_defaults() {
        let params: MetaParams =
            serde_json::from_str(r##"{"blend_mode": "hard-light", "color": "#102030"}"##).unwrap();
        assert_eq!(params.blend_mode, BlendMode::HardLight);
        assert_eq!(params.color, Color::rgb(0x10, 0x20, 0x30));
        assert_eq!(params.bloom_radius, 10.0);
    }
}
