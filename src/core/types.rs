//! Core type definitions used throughout the codebase
//!
//! Three coordinate spaces share the same grid: cells (standing resolution),
//! areas (visibility resolution) and regions (sharding resolution). All of them
//! are unsigned and grid-relative; `u32::MAX` on both axes means "not placed".

use serde::{Deserialize, Serialize};

/// Stable identifier for an entity
///
/// The grid never owns entities; it only stores these handles and hands them
/// back through queries and event callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Sentinel coordinate component for "invalid / not placed"
pub const INVALID_COORD: u32 = u32::MAX;

/// Cell coordinate (finest movement-blocking unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellPoint {
    pub cx: u32,
    pub cy: u32,
}

impl CellPoint {
    pub const fn new(cx: u32, cy: u32) -> Self {
        Self { cx, cy }
    }

    /// True if this is the "not placed" sentinel
    pub fn is_sentinel(&self) -> bool {
        *self == INVALID_CELL
    }
}

/// Cell sentinel: an entity standing here is not on the grid
pub const INVALID_CELL: CellPoint = CellPoint::new(INVALID_COORD, INVALID_COORD);

/// Area coordinate (AOI unit, a fixed rectangle of cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AreaPoint {
    pub ax: u32,
    pub ay: u32,
}

impl AreaPoint {
    pub const fn new(ax: u32, ay: u32) -> Self {
        Self { ax, ay }
    }

    pub fn is_sentinel(&self) -> bool {
        *self == INVALID_AREA
    }

    /// Shift by a signed offset. Anything that leaves the representable
    /// range becomes the sentinel, which every bounds check rejects.
    pub fn offset(&self, dx: i64, dy: i64) -> AreaPoint {
        let x = i64::from(self.ax) + dx;
        let y = i64::from(self.ay) + dy;
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(ax), Ok(ay)) => AreaPoint { ax, ay },
            _ => INVALID_AREA,
        }
    }

    /// Chebyshev distance test on each axis independently
    pub fn within(&self, other: &AreaPoint, radius_x: u32, radius_y: u32) -> bool {
        self.ax.abs_diff(other.ax) <= radius_x && self.ay.abs_diff(other.ay) <= radius_y
    }
}

pub const INVALID_AREA: AreaPoint = AreaPoint::new(INVALID_COORD, INVALID_COORD);

/// Region coordinate (sharding unit, independent of AOI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RegionPoint {
    pub rx: u32,
    pub ry: u32,
}

impl RegionPoint {
    pub const fn new(rx: u32, ry: u32) -> Self {
        Self { rx, ry }
    }
}

pub const INVALID_REGION: RegionPoint = RegionPoint::new(INVALID_COORD, INVALID_COORD);

/// Rectangle with inclusive bounds: `(lx, ly)` top-left, `(rx, ry)` bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RectPoint {
    pub lx: u32,
    pub ly: u32,
    pub rx: u32,
    pub ry: u32,
}

impl RectPoint {
    pub const fn new(lx: u32, ly: u32, rx: u32, ry: u32) -> Self {
        Self { lx, ly, rx, ry }
    }

    /// A rectangle whose right edge lies left of its left edge holds nothing
    pub fn is_empty(&self) -> bool {
        self.rx < self.lx || self.ry < self.ly
    }

    /// Iterate contained points row by row (y outer, x inner)
    pub fn points(&self) -> impl Iterator<Item = (u32, u32)> {
        let (lx, rx) = (self.lx, self.rx);
        (self.ly..=self.ry).flat_map(move |y| (lx..=rx).map(move |x| (x, y)))
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.lx && x <= self.rx && y >= self.ly && y <= self.ry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_offset_underflow_is_sentinel() {
        let a = AreaPoint::new(0, 3);
        assert_eq!(a.offset(-1, 0), INVALID_AREA);
        assert_eq!(a.offset(1, -1), AreaPoint::new(1, 2));
    }

    #[test]
    fn test_area_within_is_square_window() {
        let center = AreaPoint::new(5, 5);
        assert!(AreaPoint::new(6, 6).within(&center, 1, 1));
        assert!(AreaPoint::new(4, 6).within(&center, 1, 1));
        assert!(!AreaPoint::new(7, 5).within(&center, 1, 1));
        assert!(AreaPoint::new(7, 5).within(&center, 2, 0));
        assert!(!AreaPoint::new(7, 6).within(&center, 2, 0));
    }

    #[test]
    fn test_rect_points_row_major() {
        let rect = RectPoint::new(1, 1, 2, 2);
        let pts: Vec<_> = rect.points().collect();
        assert_eq!(pts, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_inverted_rect_is_empty() {
        let rect = RectPoint::new(3, 0, 2, 0);
        assert!(rect.is_empty());
        assert_eq!(rect.points().count(), 0);
    }

    #[test]
    fn test_sentinels() {
        assert!(INVALID_CELL.is_sentinel());
        assert!(INVALID_AREA.is_sentinel());
        assert!(!CellPoint::new(0, 0).is_sentinel());
    }
}
