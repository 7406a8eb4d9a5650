use crate::error::{InvalidConfiguration, Result};
use crate::grid::{Grid, Position};
use crate::leg::{LegSearch, LegStep};
use crate::path::path_cost;
use crate::snapshot::EngineSnapshot;
use log::debug;

/// Maximum number of intermediate waypoints between start and goal
pub const MAX_WAYPOINTS: usize = 3;

/// One origin -> target segment of the route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leg {
    pub origin: Position,
    pub target: Position,
}

/// Outcome of one `Engine::step`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerStep {
    /// No search has been started
    Idle,
    InProgress,
    /// A leg finished and the next one has been seeded
    LegCompleted,
    /// The goal was reached; the route is final
    AllCompleted,
    /// The current leg has no path; the route holds the completed legs only
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    Idle,
    Running,
    Completed,
    Exhausted,
}

/// Result of a finished leg
#[derive(Debug, Clone, PartialEq)]
pub struct LegSummary {
    pub leg: Leg,
    pub path: Vec<Position>,
    pub cost: f64,
    pub expansions: usize,
}

/// Ordered legs start -> waypoints -> goal
pub fn plan_legs(start: Position, waypoints: &[Position], goal: Position) -> Vec<Leg> {
    let mut checkpoints = Vec::with_capacity(waypoints.len() + 2);
    checkpoints.push(start);
    checkpoints.extend_from_slice(waypoints);
    checkpoints.push(goal);

    checkpoints
        .windows(2)
        .map(|w| Leg {
            origin: w[0],
            target: w[1],
        })
        .collect()
}

/// Check that every checkpoint is set, inside the grid and on a free cell
pub fn validate_checkpoints(
    grid: &Grid,
    start: Option<Position>,
    waypoints: &[Position],
    goal: Option<Position>,
) -> std::result::Result<(Position, Position), InvalidConfiguration> {
    let start = start.ok_or(InvalidConfiguration::MissingStart)?;
    let goal = goal.ok_or(InvalidConfiguration::MissingGoal)?;
    if waypoints.len() > MAX_WAYPOINTS {
        return Err(InvalidConfiguration::TooManyWaypoints {
            count: waypoints.len(),
            max: MAX_WAYPOINTS,
        });
    }

    let named = std::iter::once(("start".to_string(), start))
        .chain(
            waypoints
                .iter()
                .enumerate()
                .map(|(i, &p)| (format!("waypoint {}", i + 1), p)),
        )
        .chain(std::iter::once(("goal".to_string(), goal)));

    for (checkpoint, position) in named {
        if !grid.in_bounds(position) {
            return Err(InvalidConfiguration::OutOfBounds {
                checkpoint,
                position,
            });
        }
        if grid.is_blocked(position) {
            return Err(InvalidConfiguration::Blocked {
                checkpoint,
                position,
            });
        }
    }

    Ok((start, goal))
}

/// Multi-waypoint A* engine driven one expansion per `step()`.
///
/// The engine searches its own copy of the grid taken at `begin()`; edits
/// the driver makes afterwards only apply to the next search.
#[derive(Debug, Clone)]
pub struct Engine {
    grid: Grid,
    legs: Vec<Leg>,
    leg_index: usize,
    search: LegSearch,
    route: Vec<Position>,
    completed: Vec<LegSummary>,
    status: EngineStatus,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            grid: Grid::new(0, 0),
            legs: Vec::new(),
            leg_index: 0,
            search: LegSearch::new(),
            route: Vec::new(),
            completed: Vec::new(),
            status: EngineStatus::Idle,
        }
    }

    /// Start a new search, replacing any previous one.
    ///
    /// On error the engine is left exactly as it was.
    pub fn begin(
        &mut self,
        grid: &Grid,
        start: Option<Position>,
        waypoints: &[Position],
        goal: Option<Position>,
    ) -> Result<()> {
        let (start, goal) = validate_checkpoints(grid, start, waypoints, goal)?;
        let legs = plan_legs(start, waypoints, goal);

        let mut search = LegSearch::new();
        search.start_leg(legs[0].origin, legs[0].target)?;

        debug!(
            "[Engine] begin: {} -> {} via {} waypoint(s), {} leg(s), grid {}x{} rev {}",
            start,
            goal,
            waypoints.len(),
            legs.len(),
            grid.rows,
            grid.cols,
            grid.get_revision()
        );

        self.grid = grid.clone();
        self.legs = legs;
        self.leg_index = 0;
        self.search = search;
        self.route = Vec::new();
        self.completed = Vec::new();
        self.status = EngineStatus::Running;
        Ok(())
    }

    /// Advance the current leg by one expansion
    pub fn step(&mut self) -> Result<SequencerStep> {
        match self.status {
            EngineStatus::Idle => return Ok(SequencerStep::Idle),
            EngineStatus::Completed => return Ok(SequencerStep::AllCompleted),
            EngineStatus::Exhausted => return Ok(SequencerStep::Exhausted),
            EngineStatus::Running => {}
        }

        let Some(leg) = self.legs.get(self.leg_index).copied() else {
            self.status = EngineStatus::Completed;
            return Ok(SequencerStep::AllCompleted);
        };

        match self.search.step(&self.grid)? {
            LegStep::InProgress => Ok(SequencerStep::InProgress),
            LegStep::Exhausted => {
                self.status = EngineStatus::Exhausted;
                debug!(
                    "[Engine] no path for leg {} ({} -> {}), route keeps {} cell(s)",
                    self.leg_index + 1,
                    leg.origin,
                    leg.target,
                    self.route.len()
                );
                Ok(SequencerStep::Exhausted)
            }
            LegStep::ReachedTarget(_) => {
                let path = self.search.path().unwrap_or_default();
                let cost = self
                    .search
                    .goal_node()
                    .map(|node| node.g)
                    .unwrap_or_else(|| path_cost(&path));
                self.append_to_route(&path);
                self.completed.push(LegSummary {
                    leg,
                    path,
                    cost,
                    expansions: self.search.expansions(),
                });
                debug!(
                    "[Engine] leg {}/{} done: cost={:.3}, route={} cell(s)",
                    self.leg_index + 1,
                    self.legs.len(),
                    cost,
                    self.route.len()
                );

                self.leg_index += 1;
                match self.legs.get(self.leg_index).copied() {
                    Some(next) => {
                        self.search.start_leg(next.origin, next.target)?;
                        Ok(SequencerStep::LegCompleted)
                    }
                    None => {
                        self.status = EngineStatus::Completed;
                        Ok(SequencerStep::AllCompleted)
                    }
                }
            }
        }
    }

    /// Step until the search finishes or `max_steps` is used up
    pub fn run_to_completion(&mut self, max_steps: usize) -> Result<SequencerStep> {
        let mut last = SequencerStep::Idle;
        for _ in 0..max_steps {
            last = self.step()?;
            match last {
                SequencerStep::InProgress | SequencerStep::LegCompleted => continue,
                _ => return Ok(last),
            }
        }
        Ok(last)
    }

    /// Abandon the current search and clear all state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        if self.status == EngineStatus::Idle {
            return EngineSnapshot::empty();
        }

        EngineSnapshot {
            open: self.search.frontier().positions().collect(),
            closed: self.search.closed().iter().copied().collect(),
            costs: self
                .search
                .costs()
                .iter()
                .map(|(&pos, &cost)| (pos, cost))
                .collect(),
            route: self.route.clone(),
            leg_index: self.leg_index,
            leg_count: self.legs.len(),
            current_leg: self.current_leg(),
            status: self.status,
        }
    }

    fn append_to_route(&mut self, path: &[Position]) {
        let skip = match (self.route.last(), path.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        self.route.extend_from_slice(&path[skip..]);
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn route(&self) -> &[Position] {
        &self.route
    }

    pub fn route_cost(&self) -> f64 {
        path_cost(&self.route)
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Leg being searched, or the last leg once the search is over
    pub fn current_leg(&self) -> Option<Leg> {
        self.legs
            .get(self.leg_index)
            .or_else(|| self.legs.last())
            .copied()
    }

    pub fn leg_index(&self) -> usize {
        self.leg_index
    }

    pub fn completed_legs(&self) -> &[LegSummary] {
        &self.completed
    }

    /// Expansions over all legs, including the one in progress
    pub fn total_expansions(&self) -> usize {
        let done: usize = self.completed.iter().map(|s| s.expansions).sum();
        match self.status {
            EngineStatus::Running | EngineStatus::Exhausted => done + self.search.expansions(),
            _ => done,
        }
    }

    /// Revision of the grid copy being searched
    pub fn grid_revision(&self) -> Option<u64> {
        match self.status {
            EngineStatus::Idle => None,
            _ => Some(self.grid.get_revision()),
        }
    }
}
