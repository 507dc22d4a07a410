//! Event sink contract for spatial transitions
//!
//! The grid calls into exactly one sink per instance, synchronously and on the
//! caller's thread. Within one `exchange_cell` call the order is exit then
//! enter; within one `exchange_area` call every leave precedes every enter.

use std::sync::Mutex;

use crate::core::types::{AreaPoint, CellPoint, EntityId};

/// Receiver of cell and area transitions, implemented by the game layer
pub trait EventSink: Send + Sync {
    /// `entity` stopped occupying `cell`
    fn exit_cell(&self, entity: EntityId, cell: CellPoint);

    /// `entity` started occupying `cell`
    fn enter_cell(&self, entity: EntityId, cell: CellPoint);

    /// `other` dropped out of the moving `entity`'s visibility; `area` is the
    /// area `entity` moved away from
    fn exit_area(&self, entity: EntityId, other: EntityId, area: AreaPoint);

    /// `other` came into the moving `entity`'s visibility; `area` is the area
    /// `entity` moved into
    fn enter_area(&self, entity: EntityId, other: EntityId, area: AreaPoint);
}

/// A single recorded transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpatialEvent {
    ExitCell {
        entity: EntityId,
        cell: CellPoint,
    },
    EnterCell {
        entity: EntityId,
        cell: CellPoint,
    },
    ExitArea {
        entity: EntityId,
        other: EntityId,
        area: AreaPoint,
    },
    EnterArea {
        entity: EntityId,
        other: EntityId,
        area: AreaPoint,
    },
}

impl SpatialEvent {
    /// The entity whose move produced this event
    pub fn actor(&self) -> EntityId {
        match self {
            Self::ExitCell { entity, .. }
            | Self::EnterCell { entity, .. }
            | Self::ExitArea { entity, .. }
            | Self::EnterArea { entity, .. } => *entity,
        }
    }

    /// The counterpart of an area event
    pub fn other(&self) -> Option<EntityId> {
        match self {
            Self::ExitArea { other, .. } | Self::EnterArea { other, .. } => Some(*other),
            _ => None,
        }
    }

    pub fn is_area_event(&self) -> bool {
        matches!(self, Self::ExitArea { .. } | Self::EnterArea { .. })
    }
}

/// Sink that records every event in call order
///
/// Used by tests and by the simulation driver to count traffic.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SpatialEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: SpatialEvent) {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        events.push(event);
    }

    /// Take all recorded events, leaving the log empty
    pub fn drain(&self) -> Vec<SpatialEvent> {
        let mut events = self.events.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *events)
    }

    /// Copy of the recorded events
    pub fn snapshot(&self) -> Vec<SpatialEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl EventSink for EventLog {
    fn exit_cell(&self, entity: EntityId, cell: CellPoint) {
        self.push(SpatialEvent::ExitCell { entity, cell });
    }

    fn enter_cell(&self, entity: EntityId, cell: CellPoint) {
        self.push(SpatialEvent::EnterCell { entity, cell });
    }

    fn exit_area(&self, entity: EntityId, other: EntityId, area: AreaPoint) {
        self.push(SpatialEvent::ExitArea { entity, other, area });
    }

    fn enter_area(&self, entity: EntityId, other: EntityId, area: AreaPoint) {
        self.push(SpatialEvent::EnterArea { entity, other, area });
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn exit_cell(&self, _: EntityId, _: CellPoint) {}
    fn enter_cell(&self, _: EntityId, _: CellPoint) {}
    fn exit_area(&self, _: EntityId, _: EntityId, _: AreaPoint) {}
    fn enter_area(&self, _: EntityId, _: EntityId, _: AreaPoint) {}
}
