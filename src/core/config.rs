//! Map settings loaded from TOML
//!
//! A map file describes the cell grid, the area subdivision used for
//! visibility, the eyesight radius and optionally how background logic shards
//! the grid into regions. See `data/grid.toml` for the reference layout.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::Result;
use crate::spatial::grid::GridConfig;

/// Cell grid dimensions and the area subdivision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSection {
    /// Cells along x
    pub cell_width: u32,
    /// Cells along y
    pub cell_height: u32,
    /// Cells per area along x
    pub area_width: u32,
    /// Cells per area along y
    pub area_height: u32,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            cell_width: 100,
            cell_height: 100,
            area_width: 10,
            area_height: 10,
        }
    }
}

/// Eyesight radius in areas. A 3x3 window is radius (1, 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyesightSection {
    pub x: u32,
    pub y: u32,
}

impl Default for EyesightSection {
    fn default() -> Self {
        Self { x: 1, y: 1 }
    }
}

/// How the grid is cut into regions for coarse background logic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ShardSettings {
    /// Every region spans a fixed number of cells per axis
    CellCount { x: u32, y: u32 },
    /// The grid is split into a fixed number of regions per axis
    CutCount { x: u32, y: u32 },
}

/// Complete settings for one map instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub grid: GridSection,
    pub eyesight: EyesightSection,
    pub shard: Option<ShardSettings>,
}

impl GridSettings {
    /// Parse settings from TOML text. Missing sections fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: GridSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file on disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!(
            "Loaded grid settings from {}: {}x{} cells, {}x{} per area",
            path.display(),
            settings.grid.cell_width,
            settings.grid.cell_height,
            settings.grid.area_width,
            settings.grid.area_height
        );
        Ok(settings)
    }

    /// Check that the settings describe a constructible grid
    pub fn validate(&self) -> Result<()> {
        self.to_config().map(|_| ())
    }

    /// Build the immutable grid configuration
    pub fn to_config(&self) -> Result<GridConfig> {
        GridConfig::new(
            self.grid.cell_width,
            self.grid.cell_height,
            self.grid.area_width,
            self.grid.area_height,
            self.eyesight.x,
            self.eyesight.y,
        )
    }
}
