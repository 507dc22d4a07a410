//! Area-of-interest index
//!
//! Every area keeps the set of entities standing in it. When an entity moves
//! between areas only the symmetric difference of its old and new eyesight
//! windows is scanned: areas that stay visible produce no events.
//!
//! For an offset `o` in the window, the area `from + o` leaves visibility
//! exactly when its mirror `to - o` enters it (both conditions reduce to
//! `|from + o - to| > eyesight` per axis), so one pass over the window covers
//! both sides of the move.

use ahash::{AHashMap, AHashSet};

use super::events::EventSink;
use super::grid::{GridConfig, Plane};
use crate::core::types::{AreaPoint, EntityId, RectPoint};

/// Membership sets for every area of one grid
#[derive(Debug, Clone)]
pub struct AreaIndex {
    config: GridConfig,
    areas: Plane<AHashSet<EntityId>>,
    locations: AHashMap<EntityId, AreaPoint>,
}

impl AreaIndex {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            areas: Plane::new(config.area_width(), config.area_height()),
            locations: AHashMap::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    fn set(&self, area: AreaPoint) -> Option<&AHashSet<EntityId>> {
        if !self.config.is_area_valid(area) {
            return None;
        }
        self.areas.at(self.config.area_to_index(area))
    }

    /// Raw members of one area; nothing for an out-of-grid area
    pub fn members(&self, area: AreaPoint) -> impl Iterator<Item = EntityId> + '_ {
        self.set(area).into_iter().flatten().copied()
    }

    /// Members of one area accepted by `filter`
    pub fn entities_in_area(
        &self,
        area: AreaPoint,
        filter: impl Fn(EntityId) -> bool,
    ) -> AHashSet<EntityId> {
        self.members(area).filter(|&e| filter(e)).collect()
    }

    /// Union over every area of an inclusive rectangle, visited row-major.
    /// The part of the rectangle outside the grid contributes nothing.
    pub fn entities_in_rect(
        &self,
        rect: RectPoint,
        filter: impl Fn(EntityId) -> bool,
    ) -> AHashSet<EntityId> {
        let mut result = AHashSet::new();
        if rect.is_empty()
            || rect.lx >= self.config.area_width()
            || rect.ly >= self.config.area_height()
        {
            return result;
        }
        let clipped = RectPoint::new(
            rect.lx,
            rect.ly,
            rect.rx.min(self.config.area_width() - 1),
            rect.ry.min(self.config.area_height() - 1),
        );
        for (x, y) in clipped.points() {
            result.extend(self.members(AreaPoint::new(x, y)).filter(|&e| filter(e)));
        }
        result
    }

    /// Everything inside the eyesight window centred on `area`
    pub fn visible_entities(
        &self,
        area: AreaPoint,
        filter: impl Fn(EntityId) -> bool,
    ) -> AHashSet<EntityId> {
        match self.config.eyesight_rect(area) {
            Some(rect) => self.entities_in_rect(rect, filter),
            None => AHashSet::new(),
        }
    }

    /// Area an entity is registered in, if placed
    pub fn area_of(&self, entity: EntityId) -> Option<AreaPoint> {
        self.locations.get(&entity).copied()
    }

    pub fn area_population(&self, area: AreaPoint) -> usize {
        self.set(area).map_or(0, |set| set.len())
    }

    /// Number of entities currently placed on the grid
    pub fn tracked_count(&self) -> usize {
        self.locations.len()
    }

    fn remove(&mut self, entity: EntityId, area: AreaPoint) {
        let index = self.config.area_to_index(area);
        if let Some(set) = self.areas.at_mut(index) {
            set.remove(&entity);
        }
        if self.locations.get(&entity) == Some(&area) {
            self.locations.remove(&entity);
        }
    }

    fn insert(&mut self, entity: EntityId, area: AreaPoint) {
        if let Some(previous) = self.locations.insert(entity, area) {
            debug_assert_eq!(
                previous, area,
                "{:?} registered in {:?} while entering {:?}",
                entity, previous, area
            );
            if previous != area {
                let index = self.config.area_to_index(previous);
                if let Some(set) = self.areas.at_mut(index) {
                    set.remove(&entity);
                }
            }
        }
        let index = self.config.area_to_index(area);
        if let Some(set) = self.areas.at_mut(index) {
            set.insert(entity);
        }
    }

    /// Move an entity between areas and report visibility changes
    ///
    /// With `force` (or when either endpoint is off the grid) the full eyesight
    /// windows around `from` and `to` are scanned; otherwise only the areas
    /// whose visibility actually changes.
    pub fn exchange_area(
        &mut self,
        entity: EntityId,
        from: AreaPoint,
        to: AreaPoint,
        force: bool,
        sink: &dyn EventSink,
    ) {
        if !force && from == to {
            return;
        }

        let ok_from = self.config.is_area_valid(from);
        let ok_to = self.config.is_area_valid(to);
        let force = force || !ok_from || !ok_to;

        if ok_from {
            self.remove(entity, from);
        }

        let eye_x = i64::from(self.config.eyesight_x());
        let eye_y = i64::from(self.config.eyesight_y());
        // Displacement of the move; only read on the incremental path, where
        // both endpoints are valid.
        let shift_x = i64::from(to.ax) - i64::from(from.ax);
        let shift_y = i64::from(to.ay) - i64::from(from.ay);

        let (lo_x, hi_x) = offset_span(
            eye_x,
            ok_from.then_some(from.ax),
            ok_to.then_some(to.ax),
            self.config.area_width(),
        );
        let (lo_y, hi_y) = offset_span(
            eye_y,
            ok_from.then_some(from.ay),
            ok_to.then_some(to.ay),
            self.config.area_height(),
        );

        let mut leaving = Vec::new();
        let mut entering = Vec::new();

        for dy in lo_y..=hi_y {
            for dx in lo_x..=hi_x {
                // from + d still inside the window around to
                if !force && (dx - shift_x).abs() <= eye_x && (dy - shift_y).abs() <= eye_y {
                    continue;
                }
                if ok_from {
                    leaving.extend(self.members(from.offset(dx, dy)));
                }
                if ok_to {
                    entering.extend(self.members(to.offset(-dx, -dy)));
                }
            }
        }

        if ok_to {
            self.insert(entity, to);
        }

        tracing::trace!(
            ?entity,
            ?from,
            ?to,
            force,
            leaving = leaving.len(),
            entering = entering.len(),
            "exchange_area"
        );

        for other in leaving {
            sink.exit_area(entity, other, from);
        }
        for other in entering {
            sink.enter_area(entity, other, to);
        }
    }

    /// Check that membership sets and the reverse lookup agree
    pub fn check_invariants(&self) -> bool {
        let mut seen = 0usize;
        for (index, set) in self.areas.iter().enumerate() {
            let Some(area) = self.config.index_to_area(index) else {
                return false;
            };
            for entity in set {
                if self.locations.get(entity) != Some(&area) {
                    return false;
                }
                seen += 1;
            }
        }
        seen == self.locations.len()
    }
}

/// Offsets on one axis worth visiting: those within eyesight where either
/// `from + d` or `to - d` lands on an axis of `len` areas. Empty when neither
/// endpoint is on the grid.
fn offset_span(eye: i64, from: Option<u32>, to: Option<u32>, len: u32) -> (i64, i64) {
    let last = i64::from(len) - 1;
    let mut lo = i64::MAX;
    let mut hi = i64::MIN;
    if let Some(f) = from.map(i64::from) {
        lo = lo.min(-f);
        hi = hi.max(last - f);
    }
    if let Some(t) = to.map(i64::from) {
        lo = lo.min(t - last);
        hi = hi.max(t);
    }
    (lo.max(-eye), hi.min(eye))
}
