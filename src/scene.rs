use crate::error::{Error, Result};
use crate::grid::{Grid, Position, MAX_DIMENSION};
use crate::sequencer::MAX_WAYPOINTS;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const BLOCKED: char = '■';
const FREE: char = '□';
const FREE_ALT: char = '.';
const START: char = 'S';
const GOAL: char = 'G';
const ROUTE: char = '*';

/// Search inputs: obstacles and checkpoints. Never holds search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub grid_rows: i32,
    pub grid_cols: i32,
    /// Blocked cells in row-major order
    pub blocked_cells: Vec<Position>,
    pub start: Option<Position>,
    #[serde(default)]
    pub waypoints: Vec<Position>,
    pub goal: Option<Position>,
}

impl Scene {
    /// Create a scene from the current grid and checkpoints
    pub fn from_parts(
        grid: &Grid,
        start: Option<Position>,
        waypoints: &[Position],
        goal: Option<Position>,
    ) -> Self {
        Scene {
            grid_rows: grid.rows,
            grid_cols: grid.cols,
            blocked_cells: grid.blocked_cells(),
            start,
            waypoints: waypoints.to_vec(),
            goal,
        }
    }

    /// Rebuild the grid described by this scene
    pub fn restore_grid(&self) -> Result<Grid> {
        self.check_size()?;
        Ok(Grid::with_blocked(
            self.grid_rows,
            self.grid_cols,
            &self.blocked_cells,
        ))
    }

    fn check_size(&self) -> Result<()> {
        if Grid::supports_dimensions(self.grid_rows, self.grid_cols) {
            Ok(())
        } else {
            Err(Error::GridSize {
                rows: self.grid_rows,
                cols: self.grid_cols,
                max: MAX_DIMENSION,
            })
        }
    }

    /// Checkpoints with their display names, in visiting order
    fn named_checkpoints(&self) -> Vec<(String, Position)> {
        let mut named = Vec::with_capacity(self.waypoints.len() + 2);
        named.extend(self.start.map(|pos| ("start".to_string(), pos)));
        named.extend(
            self.waypoints
                .iter()
                .enumerate()
                .map(|(i, &pos)| (format!("waypoint {}", i + 1), pos)),
        );
        named.extend(self.goal.map(|pos| ("goal".to_string(), pos)));
        named
    }

    /// A layout has one symbol per cell, so every checkpoint needs its own
    /// free, in-bounds cell
    fn check_representable(&self, blocked: &HashSet<Position>) -> Result<()> {
        if self.waypoints.len() > MAX_WAYPOINTS {
            return Err(Error::Layout(format!(
                "{} waypoints do not fit the digits 1..={}",
                self.waypoints.len(),
                MAX_WAYPOINTS
            )));
        }
        let named = self.named_checkpoints();
        for (i, (name, pos)) in named.iter().enumerate() {
            let pos = *pos;
            let inside = (0..self.grid_rows).contains(&pos.row)
                && (0..self.grid_cols).contains(&pos.col);
            if !inside {
                return Err(Error::Layout(format!("{} {} is outside the grid", name, pos)));
            }
            if blocked.contains(&pos) {
                return Err(Error::Layout(format!("{} {} is on a blocked cell", name, pos)));
            }
            if let Some((other, _)) = named[..i].iter().find(|(_, p)| *p == pos) {
                return Err(Error::Layout(format!(
                    "{} and {} share cell {}",
                    other, name, pos
                )));
            }
        }
        Ok(())
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let scene: Scene = serde_json::from_str(&json)?;
        scene.check_size()?;
        Ok(scene)
    }

    fn symbol_at(&self, pos: Position, blocked: &HashSet<Position>) -> char {
        if self.start == Some(pos) {
            START
        } else if self.goal == Some(pos) {
            GOAL
        } else if let Some(i) = self.waypoints.iter().position(|&w| w == pos) {
            char::from_digit(i as u32 + 1, 10).unwrap_or(FREE)
        } else if blocked.contains(&pos) {
            BLOCKED
        } else {
            FREE
        }
    }

    fn render(&self, route: &HashSet<Position>) -> String {
        let blocked: HashSet<Position> = self.blocked_cells.iter().copied().collect();
        let mut result = String::new();

        for row in 0..self.grid_rows {
            for col in 0..self.grid_cols {
                let pos = Position::new(row, col);
                let symbol = match self.symbol_at(pos, &blocked) {
                    FREE if route.contains(&pos) => ROUTE,
                    symbol => symbol,
                };
                result.push(symbol);
            }
            result.push('\n');
        }

        result
    }

    /// Text layout of the scene, one line per grid row
    ///
    /// - `■`: blocked cell
    /// - `□` (or `.` when parsing): free cell
    /// - `S`, `G`: start and goal
    /// - `1`..`3`: waypoints in visiting order
    ///
    /// Fails with `Error::Layout` when two checkpoints share a cell or a
    /// checkpoint sits on a wall or outside the grid, since parsing the
    /// text back would not give the same scene.
    pub fn to_layout(&self) -> Result<String> {
        self.check_size()?;
        let blocked: HashSet<Position> = self.blocked_cells.iter().copied().collect();
        self.check_representable(&blocked)?;
        Ok(self.render(&HashSet::new()))
    }

    /// Layout with `*` on the free cells of `route`, for display only.
    ///
    /// Where symbols collide the start wins over the goal, the goal over
    /// waypoints, and any checkpoint over a wall.
    pub fn render_route(&self, route: &[Position]) -> String {
        self.render(&route.iter().copied().collect())
    }

    /// Parse a text layout produced by `to_layout`
    pub fn parse_layout(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.is_empty() {
            return Err(Error::Layout("no grid rows found".to_string()));
        }

        let grid_cols = i32::try_from(lines[0].chars().count()).unwrap_or(i32::MAX);
        let grid_rows = i32::try_from(lines.len()).unwrap_or(i32::MAX);
        if !Grid::supports_dimensions(grid_rows, grid_cols) {
            return Err(Error::GridSize {
                rows: grid_rows,
                cols: grid_cols,
                max: MAX_DIMENSION,
            });
        }

        let mut blocked_cells = Vec::new();
        let mut start = None;
        let mut goal = None;
        let mut numbered: Vec<(u32, Position)> = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let width = line.chars().count() as i32;
            if width != grid_cols {
                return Err(Error::Layout(format!(
                    "row {} has {} cells, expected {}",
                    row, width, grid_cols
                )));
            }

            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row as i32, col as i32);
                match ch {
                    BLOCKED => blocked_cells.push(pos),
                    FREE | FREE_ALT | ROUTE => {}
                    START => {
                        if start.replace(pos).is_some() {
                            return Err(Error::Layout("more than one start".to_string()));
                        }
                    }
                    GOAL => {
                        if goal.replace(pos).is_some() {
                            return Err(Error::Layout("more than one goal".to_string()));
                        }
                    }
                    '1'..='9' => {
                        let digit = ch.to_digit(10).unwrap_or(0);
                        if digit as usize > MAX_WAYPOINTS {
                            return Err(Error::Layout(format!(
                                "waypoint {} at {} exceeds the limit of {}",
                                digit, pos, MAX_WAYPOINTS
                            )));
                        }
                        if numbered.iter().any(|&(d, _)| d == digit) {
                            return Err(Error::Layout(format!("waypoint {} appears twice", digit)));
                        }
                        numbered.push((digit, pos));
                    }
                    other => {
                        return Err(Error::Layout(format!(
                            "unexpected character {:?} at {}",
                            other, pos
                        )));
                    }
                }
            }
        }

        numbered.sort_by_key(|&(digit, _)| digit);

        Ok(Scene {
            grid_rows,
            grid_cols,
            blocked_cells,
            start,
            waypoints: numbered.into_iter().map(|(_, pos)| pos).collect(),
            goal,
        })
    }
}
