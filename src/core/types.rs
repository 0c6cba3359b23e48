//! Value types written into node properties and meta-parameters.
//!
//! The set of types is closed: the effect only ever deals with integers,
//! floats, strings, booleans and colors, plus the image type used to
//! describe what flows along the links.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A property or parameter value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value
    Boolean(bool),
    /// RGBA color value
    Color(Color),
    /// Represents absence of value
    None,
}

/// RGBA color value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Port and parameter types, used to type-check links and property writes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PortType {
    Image,
    Integer,
    Float,
    String,
    Boolean,
    Color,
    /// Accepts any type
    Any,
}

// ============================================================================
// Value Implementation
// ============================================================================

impl Value {
    /// Get the port type of this value.
    pub fn get_type(&self) -> PortType {
        match self {
            Value::Integer(_) => PortType::Integer,
            Value::Float(_) => PortType::Float,
            Value::String(_) => PortType::String,
            Value::Boolean(_) => PortType::Boolean,
            Value::Color(_) => PortType::Color,
            Value::None => PortType::Any,
        }
    }

    /// Try to get this value as an integer.
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// Try to get this value as a float.
    /// Integers are automatically converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get this value as a color.
    pub fn as_color(&self) -> Option<Color> {
        if let Value::Color(c) = self {
            Some(*c)
        } else {
            None
        }
    }

    /// Check if this value is None.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{:.4}", fl),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Color(c) => write!(f, "{}", c),
            Value::None => write!(f, "None"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Value::Color(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

// ============================================================================
// PortType Implementation
// ============================================================================

impl PortType {
    /// Check if a value matches this port type.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (PortType::Any, _) => true,
            (PortType::Integer, Value::Integer(_)) => true,
            (PortType::Float, Value::Float(_)) => true,
            // Integer can be used where float is expected (implicit conversion)
            (PortType::Float, Value::Integer(_)) => true,
            (PortType::String, Value::String(_)) => true,
            (PortType::Boolean, Value::Boolean(_)) => true,
            (PortType::Color, Value::Color(_)) => true,
            _ => false,
        }
    }

    /// Check if this type is compatible with another (for links).
    pub fn compatible_with(&self, other: &PortType) -> bool {
        match (self, other) {
            (PortType::Any, _) | (_, PortType::Any) => true,
            (PortType::Integer, PortType::Float) => true,
            (a, b) => a == b,
        }
    }

    /// Get a human-readable name for this type.
    pub fn display_name(&self) -> &'static str {
        match self {
            PortType::Image => "Image",
            PortType::Integer => "Integer",
            PortType::Float => "Float",
            PortType::String => "String",
            PortType::Boolean => "Boolean",
            PortType::Color => "Color",
            PortType::Any => "Any",
        }
    }
}

impl fmt::Display for PortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Color Implementation
// ============================================================================

impl Color {
    /// Create a new color from RGBA components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB components (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse a hex color string.
    ///
    /// Supports formats: "#RGB", "#RGBA", "#RRGGBB", "#RRGGBBAA"
    pub fn from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return Err(format!("Invalid hex color: {}", hex));
        }

        let nibble = |s: &str| u8::from_str_radix(s, 16).map(|v| v * 17).map_err(|e| e.to_string());
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|e| e.to_string());

        match hex.len() {
            3 => Ok(Self::rgb(nibble(&hex[0..1])?, nibble(&hex[1..2])?, nibble(&hex[2..3])?)),
            4 => Ok(Self::new(
                nibble(&hex[0..1])?,
                nibble(&hex[1..2])?,
                nibble(&hex[2..3])?,
                nibble(&hex[3..4])?,
            )),
            6 => Ok(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Ok(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => Err(format!(
                "Invalid hex color format: expected 3, 4, 6, or 8 characters, got {}",
                hex.len()
            )),
        }
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    /// Default glow tint.
    pub const GLOWSTICK_PINK: Color = Color::rgb(0xFF, 0xAC, 0xF9);
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
