//! Pipeline configuration.
//!
//! Configuration is read from a JSON file. [`BonedotConfig::discover`] looks at
//! an explicit path first, then the `BONEDOT_CONFIG` environment variable, and
//! falls back to defaults. Individual fields can be overridden afterwards with
//! the builder-style setters.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "BONEDOT_CONFIG";

/// Default alpha threshold (any non-fully-transparent pixel is opaque).
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 1;
/// Default contour stride.
pub const DEFAULT_STRIDE: usize = 16;
/// Default pixel-to-world scale.
pub const DEFAULT_SCALE: f64 = 0.01;
/// Offset of the cutter from the target plane, in local units.
pub const DEFAULT_CUTTER_OFFSET: f64 = 0.01;
/// Default tolerance for keyframe compression.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Settings for the silhouette cut pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CutConfig {
    /// Minimum alpha value counted as opaque.
    pub alpha_threshold: u8,
    /// Keep every n-th contour point.
    pub stride: usize,
    /// World units per pixel.
    pub scale: f64,
    /// Distance the cutter is moved along the plane normal.
    pub cutter_offset: f64,
    /// Name given to the temporary cutter object.
    pub cutter_name: String,
}

impl Default for CutConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            stride: DEFAULT_STRIDE,
            scale: DEFAULT_SCALE,
            cutter_offset: DEFAULT_CUTTER_OFFSET,
            cutter_name: "cut_tool".to_string(),
        }
    }
}

impl CutConfig {
    /// Sets the alpha threshold.
    pub fn alpha_threshold(mut self, threshold: u8) -> Self {
        self.alpha_threshold = threshold;
        self
    }

    /// Sets the contour stride. A stride of 0 is treated as 1.
    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Sets the pixel-to-world scale.
    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

/// Settings for animation export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExportConfig {
    /// Keyframe compression tolerance.
    pub epsilon: f64,
    /// Directory prefix for texture references.
    pub texture_dir: String,
    /// Pretty-print the `.bdsket` JSON.
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            texture_dir: "textures".to_string(),
            pretty: true,
        }
    }
}

impl ExportConfig {
    /// Sets the keyframe compression tolerance.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets whether output is pretty-printed.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BonedotConfig {
    /// Cut pipeline settings.
    pub cut: CutConfig,
    /// Export settings.
    pub export: ExportConfig,
}

impl BonedotConfig {
    /// Parses a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config file.
    pub fn load(path: &Path) -> Result<Self, SpecError> {
        let text = std::fs::read_to_string(path).map_err(|e| SpecError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&text).map_err(|e| SpecError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Resolves the config: explicit path, then `BONEDOT_CONFIG`, then defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, SpecError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            tracing::debug!(path = %path.display(), "loading config from environment");
            return Self::load(&path);
        }

        Ok(Self::default())
    }
}
