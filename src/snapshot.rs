use crate::grid::Position;
use crate::leg::CellCost;
use crate::sequencer::{EngineStatus, Leg};
use std::collections::{BTreeMap, BTreeSet};

/// Read-only copy of the engine state between two steps
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    /// Frontier of the current leg
    pub open: BTreeSet<Position>,
    /// Expanded cells of the current leg
    pub closed: BTreeSet<Position>,
    /// g/h/f of every cell discovered in the current leg
    pub costs: BTreeMap<Position, CellCost>,
    /// Concatenated paths of the legs completed so far
    pub route: Vec<Position>,
    pub leg_index: usize,
    pub leg_count: usize,
    pub current_leg: Option<Leg>,
    pub status: EngineStatus,
}

impl EngineSnapshot {
    /// Snapshot of an engine with no search configured
    pub fn empty() -> Self {
        EngineSnapshot {
            open: BTreeSet::new(),
            closed: BTreeSet::new(),
            costs: BTreeMap::new(),
            route: Vec::new(),
            leg_index: 0,
            leg_count: 0,
            current_leg: None,
            status: EngineStatus::Idle,
        }
    }

    pub fn is_open(&self, pos: Position) -> bool {
        self.open.contains(&pos)
    }

    pub fn is_closed(&self, pos: Position) -> bool {
        self.closed.contains(&pos)
    }
}

impl Default for EngineSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
