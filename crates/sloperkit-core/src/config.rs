//! Render configuration
//!
//! Every knob the pipeline recognizes, threaded explicitly through the
//! bounds/raster/association calls instead of living as module globals.
//! Values load from a TOML file when one is supplied and fall back to the
//! documented defaults otherwise.

use crate::error::{Error, Result};
use crate::units::DEFAULT_DPI;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rendering and association parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Stroke width for piece outlines, in pixels.
    pub stroke_width_px: f64,
    /// Raster resolution; one model unit is one millimeter.
    pub dpi: f64,
    /// Corner rounding radius for polyline joints, in model units
    /// (scaled to pixels at draw time).
    pub corner_fillet_radius: f64,
    /// Extra clockwise rotation applied after label-derived de-rotation,
    /// in degrees.
    pub global_rotation_offset: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            stroke_width_px: 18.0,
            dpi: DEFAULT_DPI,
            corner_fillet_radius: 5.0,
            global_rotation_offset: 0.0,
        }
    }
}

impl RenderConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| Error::config(e.to_string()))
    }

    /// Validates that the numeric knobs make geometric sense.
    pub fn validate(&self) -> Result<()> {
        if self.dpi <= 0.0 {
            return Err(Error::config(format!("dpi must be positive, got {}", self.dpi)));
        }
        if self.stroke_width_px < 0.0 {
            return Err(Error::config(format!(
                "stroke_width_px must be non-negative, got {}",
                self.stroke_width_px
            )));
        }
        if self.corner_fillet_radius < 0.0 {
            return Err(Error::config(format!(
                "corner_fillet_radius must be non-negative, got {}",
                self.corner_fillet_radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = RenderConfig::default();
        assert_eq!(cfg.stroke_width_px, 18.0);
        assert_eq!(cfg.dpi, 150.0);
        assert_eq!(cfg.corner_fillet_radius, 5.0);
        assert_eq!(cfg.global_rotation_offset, 0.0);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dpi = 300.0").unwrap();
        let cfg = RenderConfig::load(file.path()).unwrap();
        assert_eq!(cfg.dpi, 300.0);
        assert_eq!(cfg.stroke_width_px, 18.0);
    }

    #[test]
    fn negative_dpi_rejected() {
        let cfg = RenderConfig {
            dpi: -1.0,
            ..RenderConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
