#![forbid(unsafe_code)]

//! Engine configuration as data.
//!
//! Every tunable of the engine lives in one [`EngineConfig`] that can be
//! loaded from TOML or JSON. Missing sections and fields fall back to the
//! reference dashboard values, so `EngineConfig::default()` is a complete,
//! valid configuration.
//!
//! ```toml
//! [grid]
//! cols = 12
//! row_height = 60.0
//!
//! [interaction]
//! dominance_factor = 1.5
//!
//! [widgets.chart]
//! w = 6
//! h = 4
//! min_w = 3
//! min_h = 3
//! ```

use std::fmt;
use std::path::Path;

use gridtile_core::pointer::GridMetrics;
use serde::{Deserialize, Serialize};

use crate::item::{DEFAULT_COLS, GridDims};
use crate::widget::SizeRegistry;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub grid: GridConfig,
    pub interaction: InteractionConfig,
    pub adjust: AdjustConfig,
    pub widgets: SizeRegistry,
}

/// Grid geometry in cells and pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub cols: u16,
    /// Rows used before the first viewport measurement.
    pub initial_max_rows: u16,
    /// Row height in pixels, excluding margin.
    pub row_height: f64,
    /// Horizontal and vertical gap between cells in pixels.
    pub margin: [f64; 2],
    /// Horizontal and vertical container padding in pixels.
    pub padding: [f64; 2],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            initial_max_rows: 10,
            row_height: 60.0,
            margin: [8.0, 8.0],
            padding: [8.0, 8.0],
        }
    }
}

impl GridConfig {
    #[must_use]
    pub const fn initial_dims(&self) -> GridDims {
        GridDims::new(self.cols, self.initial_max_rows)
    }

    /// Pixel metrics for a container of `width` pixels at the given origin.
    ///
    /// Column width is derived the same way the renderer lays columns out:
    /// the width left after padding and inter-column margins, split evenly.
    #[must_use]
    pub fn metrics(&self, left: f64, top: f64, width: f64, max_rows: u16) -> GridMetrics {
        let cols = f64::from(self.cols.max(1));
        let [margin_x, margin_y] = self.margin;
        let [padding_x, padding_y] = self.padding;
        let col_width = (width - 2.0 * padding_x - margin_x * (cols - 1.0)) / cols;
        GridMetrics {
            container_left: left,
            container_top: top,
            padding_x,
            padding_y,
            margin_x,
            margin_y,
            col_width,
            row_height: self.row_height,
            cols: self.cols,
            max_rows,
        }
    }
}

/// Pointer interaction tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// An axis dominates a corner resize when its delta exceeds the other's
    /// by this factor.
    pub dominance_factor: f32,
    /// Pixels the pointer must travel before a press becomes a drag.
    pub drag_threshold: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            dominance_factor: 1.5,
            drag_threshold: 4.0,
        }
    }
}

/// Auto-adjust tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustConfig {
    /// Ceiling on graduated-shrink steps per insertion.
    pub max_shrink_iterations: u32,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            max_shrink_iterations: 200,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Validate every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.grid.cols == 0 {
            errors.push("grid.cols must be > 0".into());
        }
        if self.grid.initial_max_rows == 0 {
            errors.push("grid.initial_max_rows must be > 0".into());
        }
        if !(self.grid.row_height > 0.0) {
            errors.push(format!(
                "grid.row_height must be > 0, got {}",
                self.grid.row_height
            ));
        }
        if self.grid.margin.iter().chain(&self.grid.padding).any(|v| *v < 0.0) {
            errors.push("grid.margin and grid.padding must be >= 0".into());
        }

        if !(self.interaction.dominance_factor >= 1.0) {
            errors.push(format!(
                "interaction.dominance_factor must be >= 1, got {}",
                self.interaction.dominance_factor
            ));
        }
        if self.interaction.drag_threshold < 0.0 {
            errors.push(format!(
                "interaction.drag_threshold must be >= 0, got {}",
                self.interaction.drag_threshold
            ));
        }

        if self.adjust.max_shrink_iterations == 0 {
            errors.push("adjust.max_shrink_iterations must be > 0".into());
        }

        errors.extend(self.widgets.validate(self.grid.cols));
        errors
    }

    /// Load from a TOML string and reject invalid values.
    pub fn from_toml_str_validated(s: &str) -> Result<Self, ConfigError> {
        let config = Self::from_toml_str(s)?;
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
