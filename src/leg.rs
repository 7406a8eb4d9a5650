use crate::error::FrontierError;
use crate::frontier::Frontier;
use crate::grid::{Grid, Position};
use crate::node::{NodeArena, NodeId, SearchNode};
use crate::path::reconstruct;
use log::{debug, trace};
use std::collections::{HashMap, HashSet};

/// Chebyshev distance to the target.
///
/// Consistent on an 8-connected grid with unit orthogonal and √2 diagonal
/// moves, so closed nodes never need to be reopened.
pub fn heuristic(from: Position, to: Position) -> f64 {
    from.chebyshev(&to) as f64
}

/// Cost estimates recorded for a cell, kept for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellCost {
    pub g: f64,
    pub h: f64,
    pub f: f64,
}

impl CellCost {
    pub fn new(g: f64, h: f64) -> Self {
        CellCost { g, h, f: g + h }
    }
}

/// Lifecycle of a single origin -> target search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegState {
    Idle,
    Running,
    Succeeded,
    Exhausted,
}

/// Outcome of one `LegSearch::step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegStep {
    InProgress,
    /// The target was expanded; the handle points into the leg's arena
    ReachedTarget(NodeId),
    /// The frontier ran dry without reaching the target
    Exhausted,
}

/// Resumable A* search for one leg, advanced one expansion at a time
#[derive(Debug, Clone)]
pub struct LegSearch {
    origin: Position,
    target: Position,
    state: LegState,
    frontier: Frontier,
    closed: HashSet<Position>,
    arena: NodeArena,
    costs: HashMap<Position, CellCost>,
    goal_node: Option<NodeId>,
}

impl Default for LegSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LegSearch {
    pub fn new() -> Self {
        LegSearch {
            origin: Position::new(0, 0),
            target: Position::new(0, 0),
            state: LegState::Idle,
            frontier: Frontier::new(),
            closed: HashSet::new(),
            arena: NodeArena::new(),
            costs: HashMap::new(),
            goal_node: None,
        }
    }

    /// Drop everything from the previous leg and seed the frontier with `origin`
    pub fn start_leg(&mut self, origin: Position, target: Position) -> Result<(), FrontierError> {
        self.reset();
        self.origin = origin;
        self.target = target;

        let h = heuristic(origin, target);
        self.frontier.push(SearchNode::new(origin, 0.0, h, None))?;
        self.costs.insert(origin, CellCost::new(0.0, h));
        self.state = LegState::Running;

        debug!("[Leg] start {} -> {}, h={:.1}", origin, target, h);
        Ok(())
    }

    /// Expand exactly one node.
    ///
    /// Calling this on a leg that is not running does no work and reports
    /// the leg's outcome again; an idle leg reports `Exhausted`.
    pub fn step(&mut self, grid: &Grid) -> Result<LegStep, FrontierError> {
        match (self.state, self.goal_node) {
            (LegState::Running, _) => {}
            (LegState::Succeeded, Some(id)) => return Ok(LegStep::ReachedTarget(id)),
            _ => return Ok(LegStep::Exhausted),
        }

        if self.frontier.is_empty() {
            self.state = LegState::Exhausted;
            debug!(
                "[Leg] exhausted {} -> {} after {} expansions",
                self.origin,
                self.target,
                self.arena.len()
            );
            return Ok(LegStep::Exhausted);
        }

        let current = self.frontier.pop_min()?;
        let position = current.position;
        let g = current.g;
        trace!(
            "[Leg] expand {} g={:.3} h={:.1} f={:.3} open={}",
            position,
            current.g,
            current.h,
            current.f(),
            self.frontier.len()
        );
        self.closed.insert(position);
        let id = self.arena.push(current);

        if position == self.target {
            self.state = LegState::Succeeded;
            self.goal_node = Some(id);
            debug!(
                "[Leg] reached {} with g={:.3} after {} expansions",
                position,
                g,
                self.arena.len()
            );
            return Ok(LegStep::ReachedTarget(id));
        }

        for (next, cost) in grid.neighbors8(position) {
            if self.closed.contains(&next) {
                continue;
            }
            let tentative_g = g + cost;

            match self.frontier.get(next).map(|node| node.g) {
                None => {
                    let h = heuristic(next, self.target);
                    self.frontier
                        .push(SearchNode::new(next, tentative_g, h, Some(id)))?;
                    self.costs.insert(next, CellCost::new(tentative_g, h));
                }
                Some(existing_g) if tentative_g < existing_g => {
                    self.frontier.decrease_cost(next, tentative_g, Some(id))?;
                    if let Some(entry) = self.costs.get_mut(&next) {
                        entry.g = tentative_g;
                        entry.f = tentative_g + entry.h;
                    }
                }
                Some(_) => {}
            }
        }

        Ok(LegStep::InProgress)
    }

    /// Clear all per-leg state and return to `Idle`
    pub fn reset(&mut self) {
        self.state = LegState::Idle;
        self.frontier.clear();
        self.closed.clear();
        self.arena.clear();
        self.costs.clear();
        self.goal_node = None;
    }

    /// Path from origin to target once the leg has succeeded
    pub fn path(&self) -> Option<Vec<Position>> {
        self.goal_node.map(|id| reconstruct(&self.arena, id))
    }

    pub fn state(&self) -> LegState {
        self.state
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn closed(&self) -> &HashSet<Position> {
        &self.closed
    }

    pub fn costs(&self) -> &HashMap<Position, CellCost> {
        &self.costs
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn goal_node(&self) -> Option<&SearchNode> {
        self.goal_node.and_then(|id| self.arena.get(id))
    }

    /// Number of nodes expanded in this leg
    pub fn expansions(&self) -> usize {
        self.arena.len()
    }
}
