//! Configuration files.
//!
//! A configuration is a TOML document with two optional tables:
//!
//! ```toml
//! [params]
//! blend_mode = "hard-light"
//! bloom_strength = 5.0
//! color = "#FFACF9"
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! Missing keys take their defaults.

use crate::core::error::GlowstickResult;
use crate::effect::params::MetaParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowstickConfig {
    /// Parameter preset applied at attach.
    pub params: MetaParams,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter in `env_logger` syntax, e.g. `"info"` or `"glowstick=trace"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl GlowstickConfig {
    /// Parse a configuration and range-check its preset.
    pub fn from_toml_str(source: &str) -> GlowstickResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.params.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> GlowstickResult<Self> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn to_toml_string(&self) -> GlowstickResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::GlowstickError;
    use crate::core::types::Color;
    use crate::effect::params::BlendMode;
    use std::io::Write;

    #[test]
    fn test_empty_config_is_default() {
        let config = GlowstickConfig::from_toml_str("").unwrap();
        assert_eq!(config, GlowstickConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_preset() {
        let config = GlowstickConfig::from_toml_str(
            r##"
            [params]
            blend_mode = "linear-light"
            soft_glow_brightness = 0.1
            color = "#00FF00"
            "##,
        )
        .unwrap();

        assert_eq!(config.params.blend_mode, BlendMode::LinearLight);
        assert_eq!(config.params.soft_glow_brightness, 0.1);
        assert_eq!(config.params.color, Color::rgb(0, 255, 0));
        assert_eq!(config.params.noise_reduction, 2);
    }

    #[test]
    fn test_out_of_range_preset_rejected() {
        let result = GlowstickConfig::from_toml_str("[params]\nlightness = 10.0\n");
        assert!(matches!(result, Err(GlowstickError::Parameter(_))));
    }

    #[test]
    fn test_malformed_config_rejected() {
        let result = GlowstickConfig::from_toml_str("[params]\nblend_mode = \"dodge\"\n");
        assert!(matches!(result, Err(GlowstickError::Config(_))));
    }

    #[test]
    fn test_round_trip_through_file() {
        let mut config = GlowstickConfig::default();
        config.params.blend_mode = BlendMode::Burn;
        config.params.bloom_strength = 12.5;
        config.logging.level = "debug".to_string();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();

        let loaded = GlowstickConfig::from_path(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = GlowstickConfig::from_path(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(GlowstickError::Io(_))));
    }
}
