//! Spatial authority: grid model, cell occupancy, area-of-interest and sharding

pub mod aoi;
pub mod events;
pub mod grid;
pub mod helix;
pub mod map;
pub mod occupancy;
pub mod shard;

pub use aoi::AreaIndex;
pub use events::{EventLog, EventSink, NullSink, SpatialEvent};
pub use grid::{GridConfig, Plane, MAX_CELLS};
pub use helix::{helix, DEFAULT_HELIX_RADIUS};
pub use map::{create_grid, GridMap};
pub use occupancy::{BlockMask, Category, CellLayer, CellState};
pub use shard::{ByCellCount, ByCutCount, RegionIndex, RegionLayout, ShardStrategy};
