//! Arc Spatial - grid occupancy and area-of-interest for tick-based worlds
//!
//! Tracks which cell each entity stands in, answers per-category movement
//! tests, and keeps an incremental visibility index that reports who entered
//! or left an entity's eyesight as it moves.

pub mod core;
pub mod spatial;

pub use crate::core::error::{ConfigError, Result};
pub use crate::core::types::{AreaPoint, CellPoint, EntityId, RectPoint, RegionPoint};
pub use crate::spatial::{create_grid, GridConfig, GridMap};
