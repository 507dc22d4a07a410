//! Grid model: configuration, bounds checks and coordinate conversion
//!
//! Cells and areas are both stored row-major (`index = width * y + x`). The
//! ordering is relied on by area enumeration, so rectangle queries always visit
//! areas in the same order.

use crate::core::error::{ConfigError, Result};
use crate::core::types::{AreaPoint, CellPoint, RectPoint, INVALID_AREA};

/// Largest cell grid a map may allocate (8192 x 8192)
pub const MAX_CELLS: u64 = 1 << 26;

/// Immutable grid configuration, fixed at map load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    cell_width: u32,
    cell_height: u32,
    area_cell_width: u32,
    area_cell_height: u32,
    eyesight_x: u32,
    eyesight_y: u32,
    area_width: u32,
    area_height: u32,
}

impl GridConfig {
    /// Build a configuration. The area grid is `ceil(cells / cells_per_area)`
    /// on each axis.
    pub fn new(
        cell_width: u32,
        cell_height: u32,
        area_cell_width: u32,
        area_cell_height: u32,
        eyesight_x: u32,
        eyesight_y: u32,
    ) -> Result<Self> {
        if area_cell_width == 0 || area_cell_height == 0 {
            return Err(ConfigError::ZeroAreaSize {
                width: area_cell_width,
                height: area_cell_height,
            });
        }
        if cell_width == 0 || cell_height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: cell_width,
                height: cell_height,
            });
        }
        if u64::from(cell_width) * u64::from(cell_height) > MAX_CELLS {
            return Err(ConfigError::GridTooLarge {
                width: cell_width,
                height: cell_height,
            });
        }

        Ok(Self {
            cell_width,
            cell_height,
            area_cell_width,
            area_cell_height,
            eyesight_x,
            eyesight_y,
            area_width: cell_width.div_ceil(area_cell_width),
            area_height: cell_height.div_ceil(area_cell_height),
        })
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    /// Cells covered by one area along x
    pub fn area_cell_width(&self) -> u32 {
        self.area_cell_width
    }

    /// Cells covered by one area along y
    pub fn area_cell_height(&self) -> u32 {
        self.area_cell_height
    }

    /// Areas along x
    pub fn area_width(&self) -> u32 {
        self.area_width
    }

    /// Areas along y
    pub fn area_height(&self) -> u32 {
        self.area_height
    }

    pub fn eyesight_x(&self) -> u32 {
        self.eyesight_x
    }

    pub fn eyesight_y(&self) -> u32 {
        self.eyesight_y
    }

    pub fn cell_count(&self) -> usize {
        self.cell_width as usize * self.cell_height as usize
    }

    pub fn area_count(&self) -> usize {
        self.area_width as usize * self.area_height as usize
    }

    #[inline]
    pub fn is_cell_valid(&self, cell: CellPoint) -> bool {
        cell.cx < self.cell_width && cell.cy < self.cell_height
    }

    #[inline]
    pub fn is_area_valid(&self, area: AreaPoint) -> bool {
        area.ax < self.area_width && area.ay < self.area_height
    }

    /// Saturate a cell coordinate into the grid
    pub fn clamp_cell(&self, cx: u32, cy: u32) -> CellPoint {
        CellPoint::new(cx.min(self.cell_width - 1), cy.min(self.cell_height - 1))
    }

    /// Saturate an area coordinate into the area grid
    pub fn clamp_area(&self, ax: u32, ay: u32) -> AreaPoint {
        AreaPoint::new(ax.min(self.area_width - 1), ay.min(self.area_height - 1))
    }

    /// Saturate an area rectangle into the area grid
    pub fn clamp_rect(&self, rect: RectPoint) -> RectPoint {
        RectPoint::new(
            rect.lx.min(self.area_width - 1),
            rect.ly.min(self.area_height - 1),
            rect.rx.min(self.area_width - 1),
            rect.ry.min(self.area_height - 1),
        )
    }

    /// Row-major cell index. The cell must be valid.
    #[inline]
    pub fn cell_to_index(&self, cell: CellPoint) -> usize {
        debug_assert!(self.is_cell_valid(cell), "cell {:?} out of bounds", cell);
        self.cell_width as usize * cell.cy as usize + cell.cx as usize
    }

    /// Row-major area index. The area must be valid.
    #[inline]
    pub fn area_to_index(&self, area: AreaPoint) -> usize {
        debug_assert!(self.is_area_valid(area), "area {:?} out of bounds", area);
        self.area_width as usize * area.ay as usize + area.ax as usize
    }

    pub fn index_to_area(&self, index: usize) -> Option<AreaPoint> {
        if index >= self.area_count() {
            return None;
        }
        let width = self.area_width as usize;
        Some(AreaPoint::new((index % width) as u32, (index / width) as u32))
    }

    /// Area containing a cell; out-of-grid cells map to the area sentinel
    #[inline]
    pub fn cell_to_area(&self, cell: CellPoint) -> AreaPoint {
        if !self.is_cell_valid(cell) {
            return INVALID_AREA;
        }
        AreaPoint::new(
            cell.cx / self.area_cell_width,
            cell.cy / self.area_cell_height,
        )
    }

    /// Inclusive cell rectangle covered by an area. The last row and column
    /// of areas may be narrower than the configured size.
    pub fn area_cell_bounds(&self, area: AreaPoint) -> Option<RectPoint> {
        if !self.is_area_valid(area) {
            return None;
        }
        let lx = area.ax * self.area_cell_width;
        let ly = area.ay * self.area_cell_height;
        let rx = lx.saturating_add(self.area_cell_width - 1).min(self.cell_width - 1);
        let ry = ly.saturating_add(self.area_cell_height - 1).min(self.cell_height - 1);
        Some(RectPoint::new(lx, ly, rx, ry))
    }

    /// Eyesight window around an area, clipped to the area grid
    pub fn eyesight_rect(&self, area: AreaPoint) -> Option<RectPoint> {
        if !self.is_area_valid(area) {
            return None;
        }
        Some(RectPoint::new(
            area.ax.saturating_sub(self.eyesight_x),
            area.ay.saturating_sub(self.eyesight_y),
            area.ax.saturating_add(self.eyesight_x).min(self.area_width - 1),
            area.ay.saturating_add(self.eyesight_y).min(self.area_height - 1),
        ))
    }

    /// Whether `area` is inside the eyesight window centred on `center`
    #[inline]
    pub fn in_eyesight(&self, center: AreaPoint, area: AreaPoint) -> bool {
        area.within(&center, self.eyesight_x, self.eyesight_y)
    }
}

/// Dense row-major storage for per-cell or per-area data
#[derive(Debug, Clone)]
pub struct Plane<T: Clone + Default> {
    pub width: u32,
    pub height: u32,
    data: Vec<T>,
}

impl<T: Clone + Default> Plane<T> {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width as usize * height as usize],
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if x < self.width && y < self.height {
            self.data.get(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: u32, y: u32) -> Option<&mut T> {
        if x < self.width && y < self.height {
            self.data.get_mut(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn at(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}
