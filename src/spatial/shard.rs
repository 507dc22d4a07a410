//! Spatial sharding for coarse background logic
//!
//! Regions are an index over the cell grid that is independent of areas. Logic
//! such as periodic AI refresh keeps one payload per region and asks which
//! region a cell falls in; the grid itself never reads the payload.

use super::grid::{GridConfig, Plane};
use crate::core::config::ShardSettings;
use crate::core::types::{CellPoint, RectPoint, RegionPoint};

/// Region grid produced by a sharding strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLayout {
    /// Regions along x
    pub regions_x: u32,
    /// Regions along y
    pub regions_y: u32,
    /// Nominal cells per region along x; the last column may differ
    pub cells_x: u32,
    /// Nominal cells per region along y; the last row may differ
    pub cells_y: u32,
    cell_width: u32,
    cell_height: u32,
}

impl RegionLayout {
    fn new(config: &GridConfig, (regions_x, cells_x): (u32, u32), (regions_y, cells_y): (u32, u32)) -> Self {
        Self {
            regions_x,
            regions_y,
            cells_x,
            cells_y,
            cell_width: config.cell_width(),
            cell_height: config.cell_height(),
        }
    }

    pub fn region_count(&self) -> usize {
        self.regions_x as usize * self.regions_y as usize
    }

    pub fn is_region_valid(&self, region: RegionPoint) -> bool {
        region.rx < self.regions_x && region.ry < self.regions_y
    }

    /// Region holding a cell; `None` for cells outside the grid
    pub fn region_of(&self, cell: CellPoint) -> Option<RegionPoint> {
        if cell.cx >= self.cell_width || cell.cy >= self.cell_height {
            return None;
        }
        Some(RegionPoint::new(
            (cell.cx / self.cells_x).min(self.regions_x - 1),
            (cell.cy / self.cells_y).min(self.regions_y - 1),
        ))
    }

    /// Row-major region index
    pub fn region_index(&self, region: RegionPoint) -> Option<usize> {
        if !self.is_region_valid(region) {
            return None;
        }
        Some(self.regions_x as usize * region.ry as usize + region.rx as usize)
    }

    /// Inclusive cell rectangle of a region
    pub fn region_bounds(&self, region: RegionPoint) -> Option<RectPoint> {
        if !self.is_region_valid(region) {
            return None;
        }
        let (lx, rx) = axis_bounds(region.rx, self.regions_x, self.cells_x, self.cell_width);
        let (ly, ry) = axis_bounds(region.ry, self.regions_y, self.cells_y, self.cell_height);
        Some(RectPoint::new(lx, ly, rx, ry))
    }
}

fn axis_bounds(region: u32, regions: u32, per: u32, cells: u32) -> (u32, u32) {
    let low = region * per;
    let high = if region + 1 == regions {
        cells - 1
    } else {
        (low + per - 1).min(cells - 1)
    };
    (low, high)
}

/// Cuts a grid into regions
pub trait ShardStrategy {
    fn shard(&self, config: &GridConfig) -> RegionLayout;
}

/// Fixed cell count per region; the last region on an axis may be smaller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByCellCount {
    pub x: u32,
    pub y: u32,
}

/// Fixed number of regions per axis; the last region takes the remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByCutCount {
    pub x: u32,
    pub y: u32,
}

/// `(regions, cells per region)` for one axis split into `size`-cell chunks
fn split_by_size(cells: u32, size: u32) -> (u32, u32) {
    if size == 0 {
        return (1, cells);
    }
    let size = size.min(cells);
    (cells.div_ceil(size), size)
}

/// `(regions, cells per region)` for one axis split into `cuts` chunks
fn split_by_cuts(cells: u32, cuts: u32) -> (u32, u32) {
    if cuts == 0 {
        return (1, cells);
    }
    let cuts = cuts.min(cells);
    (cuts, cells / cuts)
}

impl ShardStrategy for ByCellCount {
    fn shard(&self, config: &GridConfig) -> RegionLayout {
        RegionLayout::new(
            config,
            split_by_size(config.cell_width(), self.x),
            split_by_size(config.cell_height(), self.y),
        )
    }
}

impl ShardStrategy for ByCutCount {
    fn shard(&self, config: &GridConfig) -> RegionLayout {
        RegionLayout::new(
            config,
            split_by_cuts(config.cell_width(), self.x),
            split_by_cuts(config.cell_height(), self.y),
        )
    }
}

impl ShardStrategy for ShardSettings {
    fn shard(&self, config: &GridConfig) -> RegionLayout {
        match *self {
            ShardSettings::CellCount { x, y } => ByCellCount { x, y }.shard(config),
            ShardSettings::CutCount { x, y } => ByCutCount { x, y }.shard(config),
        }
    }
}

/// One payload slot per region
///
/// Dimensions are fixed at construction. Payload synchronisation is the
/// owner's concern; the index only maps cells to stable slots.
#[derive(Debug, Clone)]
pub struct RegionIndex<T: Clone + Default> {
    layout: RegionLayout,
    slots: Plane<T>,
}

impl<T: Clone + Default> RegionIndex<T> {
    pub fn new(config: &GridConfig, strategy: &impl ShardStrategy) -> Self {
        let layout = strategy.shard(config);
        tracing::debug!(
            "Sharded {}x{} cells into {}x{} regions of {}x{}",
            config.cell_width(),
            config.cell_height(),
            layout.regions_x,
            layout.regions_y,
            layout.cells_x,
            layout.cells_y
        );
        Self {
            layout,
            slots: Plane::new(layout.regions_x, layout.regions_y),
        }
    }

    pub fn layout(&self) -> &RegionLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn region_of(&self, cell: CellPoint) -> Option<RegionPoint> {
        self.layout.region_of(cell)
    }

    pub fn get(&self, region: RegionPoint) -> Option<&T> {
        self.slots.get(region.rx, region.ry)
    }

    pub fn get_mut(&mut self, region: RegionPoint) -> Option<&mut T> {
        self.slots.get_mut(region.rx, region.ry)
    }

    /// Payload of the region holding `cell`
    pub fn for_cell_mut(&mut self, cell: CellPoint) -> Option<&mut T> {
        let region = self.layout.region_of(cell)?;
        self.get_mut(region)
    }

    /// All regions with their payloads, row-major
    pub fn iter(&self) -> impl Iterator<Item = (RegionPoint, &T)> {
        let width = self.layout.regions_x as usize;
        self.slots.iter().enumerate().map(move |(index, slot)| {
            (
                RegionPoint::new((index % width) as u32, (index / width) as u32),
                slot,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(w: u32, h: u32) -> GridConfig {
        GridConfig::new(w, h, 10, 10, 1, 1).unwrap()
    }

    #[test]
    fn test_cell_count_rounds_up() {
        let layout = ByCellCount { x: 30, y: 25 }.shard(&config(100, 100));
        assert_eq!((layout.regions_x, layout.regions_y), (4, 4));
        assert_eq!((layout.cells_x, layout.cells_y), (30, 25));
        assert_eq!(
            layout.region_bounds(RegionPoint::new(3, 0)),
            Some(RectPoint::new(90, 0, 99, 24))
        );
    }

    #[test]
    fn test_cut_count_remainder_goes_last() {
        let layout = ByCutCount { x: 3, y: 4 }.shard(&config(100, 100));
        assert_eq!((layout.regions_x, layout.regions_y), (3, 4));
        assert_eq!((layout.cells_x, layout.cells_y), (33, 25));
        assert_eq!(
            layout.region_bounds(RegionPoint::new(2, 3)),
            Some(RectPoint::new(66, 75, 99, 99))
        );
        assert_eq!(layout.region_of(CellPoint::new(99, 99)), Some(RegionPoint::new(2, 3)));
        assert_eq!(layout.region_of(CellPoint::new(65, 0)), Some(RegionPoint::new(1, 0)));
    }

    #[test]
    fn test_zero_cuts_cover_whole_axis() {
        let layout = ByCutCount { x: 3, y: 0 }.shard(&config(90, 40));
        assert_eq!((layout.regions_x, layout.regions_y), (3, 1));
        assert_eq!(layout.cells_y, 40);
        assert_eq!(layout.region_of(CellPoint::new(89, 39)), Some(RegionPoint::new(2, 0)));
    }

    #[test]
    fn test_zero_size_covers_whole_axis() {
        let layout = ByCellCount { x: 0, y: 10 }.shard(&config(50, 50));
        assert_eq!((layout.regions_x, layout.regions_y), (1, 5));
    }

    #[test]
    fn test_more_cuts_than_cells() {
        let layout = ByCutCount { x: 8, y: 1 }.shard(&config(5, 5));
        assert_eq!((layout.regions_x, layout.cells_x), (5, 1));
    }

    #[test]
    fn test_region_index_payloads() {
        let mut index: RegionIndex<u32> = RegionIndex::new(&config(100, 100), &ByCutCount { x: 2, y: 2 });
        assert_eq!(index.len(), 4);

        *index.for_cell_mut(CellPoint::new(75, 10)).unwrap() += 3;
        *index.for_cell_mut(CellPoint::new(99, 0)).unwrap() += 1;
        assert!(index.for_cell_mut(CellPoint::new(100, 0)).is_none());

        assert_eq!(index.get(RegionPoint::new(1, 0)), Some(&4));
        let total: u32 = index.iter().map(|(_, v)| *v).sum();
        assert_eq!(total, 4);
        assert_eq!(index.layout().region_index(RegionPoint::new(1, 1)), Some(3));
    }

    #[test]
    fn test_settings_dispatch() {
        let settings = ShardSettings::CellCount { x: 20, y: 50 };
        let layout = settings.shard(&config(100, 100));
        assert_eq!((layout.regions_x, layout.regions_y), (5, 2));
    }
}
