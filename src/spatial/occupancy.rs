//! Cell occupancy layer
//!
//! Each cell carries a small bitmask describing what currently blocks it. An
//! entity moving into a cell tests its own block mask against that state:
//! movement is blocked iff `mask & state != 0`.
//!
//! Static marks (physical walls, map-authored reservations) are kept apart
//! from the live occupant counters, so entities walking through a cell never
//! erase map geometry and several entities can share a cell without the last
//! one to leave clearing bits the others still hold.

use serde::{Deserialize, Serialize};

use super::events::EventSink;
use super::grid::{GridConfig, Plane};
use super::helix::helix;
use crate::core::types::{CellPoint, EntityId};

bitflags::bitflags! {
    /// Per-cell blocking bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CellState: u8 {
        /// Physical obstacle (terrain, wall)
        const BLOCK      = 0b0000_0001;
        /// Something stands here, whatever its category
        const OCCUPIED   = 0b0000_0010;
        /// First category; conventionally players
        const CATEGORY_0 = 0b0000_0100;
        /// Second category; conventionally monsters
        const CATEGORY_1 = 0b0000_1000;
        /// Third category; conventionally items
        const CATEGORY_2 = 0b0001_0000;
    }
}

/// Per-entity movement test profile over the `CellState` bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockMask(CellState);

impl BlockMask {
    /// Ignore everything but physical blocks
    pub const NONE: BlockMask = BlockMask(CellState::BLOCK);
    /// Blocked by anything standing there, ignoring categories
    pub const LOOSE: BlockMask = BlockMask(CellState::BLOCK.union(CellState::OCCUPIED));
    /// Blocked by occupants and by the first two categories; items do not block
    pub const DEFAULT: BlockMask = BlockMask(
        CellState::BLOCK
            .union(CellState::OCCUPIED)
            .union(CellState::CATEGORY_0)
            .union(CellState::CATEGORY_1),
    );
    /// Ignores player/monster occupancy, respects other items
    pub const ITEM: BlockMask = BlockMask(CellState::BLOCK.union(CellState::CATEGORY_2));

    /// Build a custom profile from cell-state bits
    pub const fn from_state(state: CellState) -> Self {
        Self(state)
    }

    /// The bits this profile treats as blocking
    pub const fn state(&self) -> CellState {
        self.0
    }

    #[inline]
    pub fn blocks(&self, state: CellState) -> bool {
        self.0.intersects(state)
    }
}

impl Default for BlockMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Occupancy category of a moving entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Only the generic occupancy bit
    Generic,
    Player,
    Monster,
    Item,
}

impl Category {
    /// The category bit this tag contributes, if any
    pub fn bit(&self) -> CellState {
        match self {
            Category::Generic => CellState::empty(),
            Category::Player => CellState::CATEGORY_0,
            Category::Monster => CellState::CATEGORY_1,
            Category::Item => CellState::CATEGORY_2,
        }
    }

    fn slot(&self) -> Option<usize> {
        match self {
            Category::Generic => None,
            Category::Player => Some(0),
            Category::Monster => Some(1),
            Category::Item => Some(2),
        }
    }
}

const CATEGORY_BITS: [CellState; 3] = [
    CellState::CATEGORY_0,
    CellState::CATEGORY_1,
    CellState::CATEGORY_2,
];

#[derive(Debug, Clone, Copy, Default)]
struct CellSlot {
    marks: CellState,
    occupants: u32,
    by_category: [u32; 3],
}

impl CellSlot {
    fn state(&self) -> CellState {
        let mut state = self.marks;
        if self.occupants > 0 {
            state |= CellState::OCCUPIED;
        }
        for (count, bit) in self.by_category.iter().zip(CATEGORY_BITS) {
            if *count > 0 {
                state |= bit;
            }
        }
        state
    }

    fn enter(&mut self, category: Category) {
        self.occupants = self.occupants.saturating_add(1);
        if let Some(slot) = category.slot() {
            self.by_category[slot] = self.by_category[slot].saturating_add(1);
        }
    }

    fn exit(&mut self, category: Category) {
        debug_assert!(self.occupants > 0, "exit from a cell with no occupants");
        self.occupants = self.occupants.saturating_sub(1);
        if let Some(slot) = category.slot() {
            debug_assert!(self.by_category[slot] > 0, "exit {:?} not present", category);
            self.by_category[slot] = self.by_category[slot].saturating_sub(1);
        }
    }
}

/// Blocking state for every cell of one grid
#[derive(Debug, Clone)]
pub struct CellLayer {
    config: GridConfig,
    cells: Plane<CellSlot>,
}

impl CellLayer {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            cells: Plane::new(config.cell_width(), config.cell_height()),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn slot(&self, cell: CellPoint) -> Option<&CellSlot> {
        if !self.config.is_cell_valid(cell) {
            return None;
        }
        self.cells.at(self.config.cell_to_index(cell))
    }

    fn slot_mut(&mut self, cell: CellPoint) -> Option<&mut CellSlot> {
        if !self.config.is_cell_valid(cell) {
            return None;
        }
        let index = self.config.cell_to_index(cell);
        self.cells.at_mut(index)
    }

    /// Current state of a cell, `None` outside the grid
    pub fn state(&self, cell: CellPoint) -> Option<CellState> {
        self.slot(cell).map(CellSlot::state)
    }

    /// Number of entities currently standing in a cell
    pub fn occupants(&self, cell: CellPoint) -> u32 {
        self.slot(cell).map_or(0, |slot| slot.occupants)
    }

    /// Movement test. Out-of-grid cells always block.
    #[inline]
    pub fn test_blocked(&self, cell: CellPoint, mask: BlockMask) -> bool {
        match self.slot(cell) {
            Some(slot) => mask.blocks(slot.state()),
            None => true,
        }
    }

    /// Set or clear the physical block bit
    pub fn set_block(&mut self, cell: CellPoint, blocked: bool) {
        if blocked {
            self.mark(cell, CellState::BLOCK);
        } else {
            self.unmark(cell, CellState::BLOCK);
        }
    }

    /// Add static bits to a cell (map geometry, reserved spots)
    pub fn mark(&mut self, cell: CellPoint, bits: CellState) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.marks |= bits;
        }
    }

    /// Remove static bits from a cell
    pub fn unmark(&mut self, cell: CellPoint, bits: CellState) {
        if let Some(slot) = self.slot_mut(cell) {
            slot.marks.remove(bits);
        }
    }

    /// Move an entity's occupancy from one cell to another
    ///
    /// Out-of-grid endpoints are skipped without mutation or event, which is
    /// how spawn (`from` off-grid) and despawn (`to` off-grid) are expressed.
    pub fn exchange_cell(
        &mut self,
        entity: EntityId,
        category: Category,
        from: CellPoint,
        to: CellPoint,
        sink: &dyn EventSink,
    ) {
        if from == to {
            return;
        }

        if let Some(slot) = self.slot_mut(from) {
            slot.exit(category);
            sink.exit_cell(entity, from);
        }

        if let Some(slot) = self.slot_mut(to) {
            slot.enter(category);
            sink.enter_cell(entity, to);
        }
    }

    /// Nearest cell around `center`, in spiral order, that `mask` can stand in
    pub fn find_free_cell(&self, center: CellPoint, mask: BlockMask, radius: u32) -> Option<CellPoint> {
        helix(radius)
            .filter_map(|(dx, dy)| {
                let x = u32::try_from(i64::from(center.cx) + dx).ok()?;
                let y = u32::try_from(i64::from(center.cy) + dy).ok()?;
                Some(CellPoint::new(x, y))
            })
            .find(|&cell| !self.test_blocked(cell, mask))
    }
}
