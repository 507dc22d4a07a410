//! Randomized checks of the incremental AOI diff against a brute-force window scan

use std::sync::Arc;

use ahash::AHashMap;
use arc_spatial::core::types::INVALID_CELL;
use arc_spatial::spatial::{Category, CellState, EventLog, SpatialEvent};
use arc_spatial::{create_grid, AreaPoint, CellPoint, EntityId, GridConfig};
use proptest::prelude::*;

const ENTITIES: u64 = 8;

#[derive(Debug, Clone)]
struct Grid {
    cells: (u32, u32),
    area: (u32, u32),
    eyesight: (u32, u32),
}

#[derive(Debug, Clone)]
struct Move {
    entity: u64,
    target: (u32, u32),
    force: bool,
}

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (1u32..60, 1u32..60, 1u32..8, 1u32..8, 0u32..12, 0u32..12).prop_map(|(cw, ch, aw, ah, ex, ey)| Grid {
        cells: (cw, ch),
        area: (aw, ah),
        eyesight: (ex, ey),
    })
}

fn moves_strategy() -> impl Strategy<Value = Vec<Move>> {
    // Targets reach a few cells past the largest grid so some moves leave it
    prop::collection::vec(
        (0..ENTITIES, 0u32..64, 0u32..64, prop::bool::weighted(0.1)).prop_map(|(entity, x, y, force)| Move {
            entity,
            target: (x, y),
            force,
        }),
        1..80,
    )
}

fn category(entity: u64) -> Category {
    match entity % 4 {
        0 => Category::Generic,
        1 => Category::Player,
        2 => Category::Monster,
        _ => Category::Item,
    }
}

/// Everyone other than `mover` whose area lies in the window around `center`
fn window(
    config: &GridConfig,
    positions: &AHashMap<u64, CellPoint>,
    mover: u64,
    center: AreaPoint,
) -> Vec<EntityId> {
    if !config.is_area_valid(center) {
        return Vec::new();
    }
    positions
        .iter()
        .filter(|&(&id, _)| id != mover)
        .filter(|&(_, &cell)| {
            let area = config.cell_to_area(cell);
            config.is_area_valid(area) && config.in_eyesight(center, area)
        })
        .map(|(&id, _)| EntityId(id))
        .collect()
}

fn sorted(mut ids: Vec<EntityId>) -> Vec<EntityId> {
    ids.sort();
    ids
}

fn minus(a: &[EntityId], b: &[EntityId]) -> Vec<EntityId> {
    a.iter().filter(|id| !b.contains(id)).copied().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn incremental_diff_matches_full_scan(grid in grid_strategy(), moves in moves_strategy()) {
        let log = Arc::new(EventLog::new());
        let mut map = create_grid(
            grid.cells.0,
            grid.cells.1,
            grid.area.0,
            grid.area.1,
            grid.eyesight.0,
            grid.eyesight.1,
            log.clone(),
        )
        .unwrap();
        let config = *map.config();
        let mut positions: AHashMap<u64, CellPoint> = AHashMap::new();

        for step in moves {
            let id = EntityId(step.entity);
            let from = positions.get(&step.entity).copied().unwrap_or(INVALID_CELL);
            let to = CellPoint::new(step.target.0, step.target.1);
            let to = if config.is_cell_valid(to) { to } else { INVALID_CELL };

            let from_area = config.cell_to_area(from);
            let to_area = config.cell_to_area(to);
            let seen_before = window(&config, &positions, step.entity, from_area);

            if step.force {
                map.teleport(id, category(step.entity), from, to);
            } else {
                map.move_entity(id, category(step.entity), from, to);
            }

            if to == INVALID_CELL {
                positions.remove(&step.entity);
            } else {
                positions.insert(step.entity, to);
            }
            let seen_after = window(&config, &positions, step.entity, to_area);

            let (expected_exits, expected_enters) = if !step.force && from_area == to_area {
                (Vec::new(), Vec::new())
            } else if step.force || !config.is_area_valid(from_area) || !config.is_area_valid(to_area) {
                (seen_before.clone(), seen_after.clone())
            } else {
                (minus(&seen_before, &seen_after), minus(&seen_after, &seen_before))
            };

            let events = log.drain();
            let mut exits = Vec::new();
            let mut enters = Vec::new();
            let mut cell_events = Vec::new();
            let mut phase = 0;
            for event in &events {
                prop_assert_eq!(event.actor(), id);
                match *event {
                    SpatialEvent::ExitCell { .. } | SpatialEvent::EnterCell { .. } => {
                        prop_assert_eq!(phase, 0, "cell event after area events");
                        cell_events.push(*event);
                    }
                    SpatialEvent::ExitArea { other, area, .. } => {
                        prop_assert!(phase <= 1, "leave after enter");
                        phase = 1;
                        prop_assert_eq!(area, from_area);
                        exits.push(other);
                    }
                    SpatialEvent::EnterArea { other, area, .. } => {
                        phase = 2;
                        prop_assert_eq!(area, to_area);
                        enters.push(other);
                    }
                }
            }

            prop_assert_eq!(sorted(exits), sorted(expected_exits));
            prop_assert_eq!(sorted(enters), sorted(expected_enters));

            let mut expected_cells = Vec::new();
            if from != to {
                if config.is_cell_valid(from) {
                    expected_cells.push(SpatialEvent::ExitCell { entity: id, cell: from });
                }
                if config.is_cell_valid(to) {
                    expected_cells.push(SpatialEvent::EnterCell { entity: id, cell: to });
                }
            }
            prop_assert_eq!(cell_events, expected_cells);

            let expected_area = if config.is_area_valid(to_area) { Some(to_area) } else { None };
            prop_assert_eq!(map.area_of(id), expected_area);
            prop_assert!(map.areas().check_invariants());
        }

        prop_assert_eq!(map.areas().tracked_count(), positions.len());

        // Occupancy counters agree with where everyone ended up
        for cy in 0..config.cell_height() {
            for cx in 0..config.cell_width() {
                let cell = CellPoint::new(cx, cy);
                let here = positions.values().filter(|&&p| p == cell).count();
                prop_assert_eq!(map.cells().occupants(cell) as usize, here);
                let state = map.cell_state(cell).unwrap();
                prop_assert_eq!(state.contains(CellState::OCCUPIED), here > 0);
            }
        }
    }

    #[test]
    fn cell_to_area_stays_on_grid(grid in grid_strategy(), x in 0u32..64, y in 0u32..64) {
        let config = GridConfig::new(
            grid.cells.0,
            grid.cells.1,
            grid.area.0,
            grid.area.1,
            grid.eyesight.0,
            grid.eyesight.1,
        )
        .unwrap();
        let cell = CellPoint::new(x, y);
        let area = config.cell_to_area(cell);
        prop_assert_eq!(config.is_cell_valid(cell), config.is_area_valid(area));
        if config.is_area_valid(area) {
            prop_assert!(config.area_to_index(area) < config.area_count());
            let bounds = config.area_cell_bounds(area).unwrap();
            prop_assert!(bounds.contains(x, y));
        }
    }
}
