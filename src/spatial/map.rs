//! Grid map: one map instance's spatial state behind a single API
//!
//! A move flows one way: cell occupancy is updated first (exit/enter cell),
//! then area membership (leave/enter visibility). All mutators take `&mut self`
//! and finish every sink callback before returning, so a map is driven by one
//! simulation loop at a time. Separate maps share nothing and can be ticked on
//! different threads.

use std::sync::Arc;

use ahash::AHashSet;

use super::aoi::AreaIndex;
use super::events::EventSink;
use super::grid::GridConfig;
use super::helix::DEFAULT_HELIX_RADIUS;
use super::occupancy::{BlockMask, Category, CellLayer, CellState};
use crate::core::config::GridSettings;
use crate::core::error::Result;
use crate::core::types::{AreaPoint, CellPoint, EntityId, RectPoint};

/// Spatial authority for one map instance
pub struct GridMap {
    config: GridConfig,
    cells: CellLayer,
    areas: AreaIndex,
    sink: Arc<dyn EventSink>,
}

/// Build a grid from raw dimensions
pub fn create_grid(
    cell_width: u32,
    cell_height: u32,
    area_cell_width: u32,
    area_cell_height: u32,
    eyesight_x: u32,
    eyesight_y: u32,
    sink: Arc<dyn EventSink>,
) -> Result<GridMap> {
    let config = GridConfig::new(
        cell_width,
        cell_height,
        area_cell_width,
        area_cell_height,
        eyesight_x,
        eyesight_y,
    )?;
    Ok(GridMap::new(config, sink))
}

impl GridMap {
    pub fn new(config: GridConfig, sink: Arc<dyn EventSink>) -> Self {
        tracing::debug!(
            "Grid {}x{} cells, {}x{} areas, eyesight ({}, {})",
            config.cell_width(),
            config.cell_height(),
            config.area_width(),
            config.area_height(),
            config.eyesight_x(),
            config.eyesight_y()
        );
        Self {
            config,
            cells: CellLayer::new(config),
            areas: AreaIndex::new(config),
            sink,
        }
    }

    pub fn from_settings(settings: &GridSettings, sink: Arc<dyn EventSink>) -> Result<Self> {
        Ok(Self::new(settings.to_config()?, sink))
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    pub fn cells(&self) -> &CellLayer {
        &self.cells
    }

    pub fn areas(&self) -> &AreaIndex {
        &self.areas
    }

    // === Queries ===

    pub fn is_cell_valid(&self, cell: CellPoint) -> bool {
        self.config.is_cell_valid(cell)
    }

    pub fn is_area_valid(&self, area: AreaPoint) -> bool {
        self.config.is_area_valid(area)
    }

    pub fn cell_to_area(&self, cell: CellPoint) -> AreaPoint {
        self.config.cell_to_area(cell)
    }

    pub fn test_blocked(&self, cell: CellPoint, mask: BlockMask) -> bool {
        self.cells.test_blocked(cell, mask)
    }

    pub fn cell_state(&self, cell: CellPoint) -> Option<CellState> {
        self.cells.state(cell)
    }

    pub fn entities_in_area(
        &self,
        area: AreaPoint,
        filter: impl Fn(EntityId) -> bool,
    ) -> AHashSet<EntityId> {
        self.areas.entities_in_area(area, filter)
    }

    pub fn entities_in_rect(
        &self,
        rect: RectPoint,
        filter: impl Fn(EntityId) -> bool,
    ) -> AHashSet<EntityId> {
        self.areas.entities_in_rect(rect, filter)
    }

    /// Entities an observer standing in `cell` can see
    pub fn visible_from(&self, cell: CellPoint, filter: impl Fn(EntityId) -> bool) -> AHashSet<EntityId> {
        self.areas.visible_entities(self.config.cell_to_area(cell), filter)
    }

    pub fn area_of(&self, entity: EntityId) -> Option<AreaPoint> {
        self.areas.area_of(entity)
    }

    /// Nearest standable cell around `center` within the default spiral
    pub fn find_free_cell(&self, center: CellPoint, mask: BlockMask) -> Option<CellPoint> {
        self.cells.find_free_cell(center, mask, DEFAULT_HELIX_RADIUS)
    }

    // === Map geometry ===

    pub fn set_block(&mut self, cell: CellPoint, blocked: bool) {
        self.cells.set_block(cell, blocked);
    }

    pub fn mark(&mut self, cell: CellPoint, bits: CellState) {
        self.cells.mark(cell, bits);
    }

    pub fn unmark(&mut self, cell: CellPoint, bits: CellState) {
        self.cells.unmark(cell, bits);
    }

    // === Mutators ===

    pub fn exchange_cell(&mut self, entity: EntityId, category: Category, from: CellPoint, to: CellPoint) {
        self.cells
            .exchange_cell(entity, category, from, to, self.sink.as_ref());
    }

    pub fn exchange_area(&mut self, entity: EntityId, from: AreaPoint, to: AreaPoint, force: bool) {
        self.areas
            .exchange_area(entity, from, to, force, self.sink.as_ref());
    }

    /// Step an entity from one cell to another: occupancy, then visibility
    pub fn move_entity(&mut self, entity: EntityId, category: Category, from: CellPoint, to: CellPoint) {
        self.relocate(entity, category, from, to, false);
    }

    /// Like `move_entity`, but always rescans both eyesight windows
    pub fn teleport(&mut self, entity: EntityId, category: Category, from: CellPoint, to: CellPoint) {
        tracing::debug!(?entity, ?from, ?to, "teleport");
        self.relocate(entity, category, from, to, true);
    }

    fn relocate(&mut self, entity: EntityId, category: Category, from: CellPoint, to: CellPoint, force: bool) {
        self.exchange_cell(entity, category, from, to);
        let from_area = self.config.cell_to_area(from);
        let to_area = self.config.cell_to_area(to);
        self.exchange_area(entity, from_area, to_area, force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ConfigError;
    use crate::core::types::INVALID_CELL;
    use crate::spatial::events::{EventLog, SpatialEvent};

    fn map() -> (GridMap, Arc<EventLog>) {
        let log = Arc::new(EventLog::new());
        let map = create_grid(100, 100, 10, 10, 1, 1, log.clone()).unwrap();
        (map, log)
    }

    #[test]
    fn test_create_grid_rejects_zero_divisor() {
        let log = Arc::new(EventLog::new());
        assert!(matches!(
            create_grid(100, 100, 10, 0, 1, 1, log),
            Err(ConfigError::ZeroAreaSize { .. })
        ));
    }

    #[test]
    fn test_move_fires_cell_events_before_area_events() {
        let (mut map, log) = map();
        map.move_entity(EntityId(1), Category::Monster, INVALID_CELL, CellPoint::new(45, 45));
        map.move_entity(EntityId(2), Category::Player, INVALID_CELL, CellPoint::new(55, 55));
        log.clear();

        // (55,55) -> (55,75): area (5,5) -> (5,7), entity 1 in (4,4) drops out
        map.move_entity(EntityId(2), Category::Player, CellPoint::new(55, 55), CellPoint::new(55, 75));

        let events = log.drain();
        assert_eq!(
            events,
            vec![
                SpatialEvent::ExitCell { entity: EntityId(2), cell: CellPoint::new(55, 55) },
                SpatialEvent::EnterCell { entity: EntityId(2), cell: CellPoint::new(55, 75) },
                SpatialEvent::ExitArea {
                    entity: EntityId(2),
                    other: EntityId(1),
                    area: AreaPoint::new(5, 5)
                },
            ]
        );
    }

    #[test]
    fn test_move_within_area_skips_area_events() {
        let (mut map, log) = map();
        map.move_entity(EntityId(1), Category::Player, INVALID_CELL, CellPoint::new(50, 50));
        map.move_entity(EntityId(2), Category::Player, INVALID_CELL, CellPoint::new(52, 52));
        log.clear();

        map.move_entity(EntityId(1), Category::Player, CellPoint::new(50, 50), CellPoint::new(51, 50));
        assert!(log.drain().iter().all(|e| !e.is_area_event()));
        assert_eq!(map.area_of(EntityId(1)), Some(AreaPoint::new(5, 5)));
    }

    #[test]
    fn test_teleport_rescans_windows() {
        let (mut map, log) = map();
        map.move_entity(EntityId(1), Category::Player, INVALID_CELL, CellPoint::new(50, 50));
        map.move_entity(EntityId(2), Category::Player, INVALID_CELL, CellPoint::new(45, 50));
        log.clear();

        map.teleport(EntityId(1), Category::Player, CellPoint::new(50, 50), CellPoint::new(51, 50));

        let area_events: Vec<_> = log.drain().into_iter().filter(|e| e.is_area_event()).collect();
        assert_eq!(area_events.len(), 2);
    }

    #[test]
    fn test_blocking_follows_occupancy() {
        let (mut map, _log) = map();
        let cell = CellPoint::new(10, 10);
        map.move_entity(EntityId(1), Category::Player, INVALID_CELL, cell);
        assert!(map.test_blocked(cell, BlockMask::DEFAULT));
        assert!(!map.test_blocked(cell, BlockMask::NONE));

        map.move_entity(EntityId(1), Category::Player, cell, INVALID_CELL);
        assert!(!map.test_blocked(cell, BlockMask::DEFAULT));
        assert_eq!(map.area_of(EntityId(1)), None);
    }

    #[test]
    fn test_find_free_cell_avoids_occupied() {
        let (mut map, _log) = map();
        let drop_at = CellPoint::new(20, 20);
        map.move_entity(EntityId(1), Category::Monster, INVALID_CELL, drop_at);
        assert_eq!(map.find_free_cell(drop_at, BlockMask::DEFAULT), Some(CellPoint::new(21, 20)));
        assert_eq!(map.find_free_cell(drop_at, BlockMask::ITEM), Some(drop_at));
    }

    #[test]
    fn test_visible_from() {
        let (mut map, _log) = map();
        map.move_entity(EntityId(1), Category::Player, INVALID_CELL, CellPoint::new(5, 5));
        map.move_entity(EntityId(2), Category::Player, INVALID_CELL, CellPoint::new(25, 5));
        let seen = map.visible_from(CellPoint::new(15, 5), |_| true);
        assert_eq!(seen.len(), 2);
        let seen = map.visible_from(CellPoint::new(0, 0), |_| true);
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![EntityId(1)]);
    }
}
