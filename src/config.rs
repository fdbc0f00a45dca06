//! Renderer configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::terrain::glyphs::GlyphSet;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    /// Side of one grid cell in pixels
    pub cell_size: f32,
    /// Pixels scrolled per frame
    pub scroll_speed: f32,
    pub glyph_set: GlyphSet,
    pub target_fps: u32,
    /// Extra columns kept past the right edge
    pub overscan: usize,
    /// World column at the left edge on startup
    pub start_x: i64,
    pub palette_refresh_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            cell_size: 14.0,
            scroll_speed: 0.4,
            glyph_set: GlyphSet::Unicode,
            target_fps: 30,
            overscan: 2,
            start_x: 0,
            palette_refresh_secs: 60,
        }
    }
}

impl RendererConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: RendererConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "cell_size",
                reason: format!("must be a positive number, got {}", self.cell_size),
            });
        }
        if !self.scroll_speed.is_finite() || self.scroll_speed < 0.0 {
            return Err(ConfigError::Invalid {
                field: "scroll_speed",
                reason: format!("must be zero or positive, got {}", self.scroll_speed),
            });
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid {
                field: "target_fps",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn palette_refresh(&self) -> Duration {
        Duration::from_secs(self.palette_refresh_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.cell_size, 14.0);
        assert_eq!(config.scroll_speed, 0.4);
        assert_eq!(config.target_fps, 30);
        assert_eq!(config.overscan, 2);
        assert_eq!(config.palette_refresh(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RendererConfig::from_json_str(r#"{"cell_size": 10, "glyph_set": "ascii"}"#)
            .expect("valid config");
        assert_eq!(config.cell_size, 10.0);
        assert_eq!(config.glyph_set, GlyphSet::Ascii);
        assert_eq!(config.target_fps, 30);
    }

    #[test]
    fn test_rejects_invalid_values() {
        for text in [
            r#"{"cell_size": 0}"#,
            r#"{"cell_size": -3.5}"#,
            r#"{"scroll_speed": -1}"#,
            r#"{"target_fps": 0}"#,
        ] {
            match RendererConfig::from_json_str(text) {
                Err(ConfigError::Invalid { .. }) => {}
                other => panic!("expected invalid value for {}, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(matches!(
            RendererConfig::from_json_str(r#"{"font": "mono"}"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RendererConfig::load("/nonexistent/terrain_backdrop.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
