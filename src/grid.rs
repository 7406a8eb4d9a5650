use serde::{Deserialize, Serialize};
use std::f64::consts::SQRT_2;
use std::fmt;

/// Neighbor offsets as (row, col) deltas: E, S, W, N, then the diagonals
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// A cell on the grid, addressed by row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Position { row, col }
    }

    /// Chebyshev distance: the number of king moves between two cells
    pub fn chebyshev(&self, other: &Position) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// True if `other` is one of the 8 cells surrounding this one
    pub fn is_adjacent(&self, other: &Position) -> bool {
        self.chebyshev(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Occupancy of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellState {
    #[default]
    Free,
    Blocked,
}

/// Grid structure for storing cell states in row-major order
/// Largest supported row or column count
pub const MAX_DIMENSION: i32 = 4096;

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub rows: i32,
    pub cols: i32,
    cells: Vec<CellState>,
    /// Revision number - incremented whenever grid cells change
    revision: u64,
}

impl Grid {
    /// Create a new grid with all cells free.
    ///
    /// Each side is clamped to `0..=MAX_DIMENSION`; callers holding untrusted
    /// sizes check them with `supports_dimensions` first.
    pub fn new(rows: i32, cols: i32) -> Self {
        let rows = rows.clamp(0, MAX_DIMENSION);
        let cols = cols.clamp(0, MAX_DIMENSION);
        let len = (rows as usize)
            .checked_mul(cols as usize)
            .unwrap_or_default();
        Grid {
            rows,
            cols,
            cells: vec![CellState::Free; len],
            revision: 0,
        }
    }

    /// True if a `rows` x `cols` grid can be built without clamping
    pub fn supports_dimensions(rows: i32, cols: i32) -> bool {
        (1..=MAX_DIMENSION).contains(&rows) && (1..=MAX_DIMENSION).contains(&cols)
    }

    /// Create a grid with specific blocked cells; out-of-bounds entries are ignored
    pub fn with_blocked(rows: i32, cols: i32, blocked: &[Position]) -> Self {
        let mut grid = Self::new(rows, cols);
        for &pos in blocked {
            if let Some(index) = grid.index(pos) {
                grid.cells[index] = CellState::Blocked;
            }
        }
        grid
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row >= 0 && pos.row < self.rows && pos.col >= 0 && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.row * self.cols + pos.col) as usize)
        } else {
            None
        }
    }

    /// Get cell state; out of bounds is treated as blocked
    pub fn cell(&self, pos: Position) -> CellState {
        self.index(pos)
            .map(|index| self.cells[index])
            .unwrap_or(CellState::Blocked)
    }

    /// Check if a cell is blocked (out of bounds is considered blocked)
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.cell(pos) == CellState::Blocked
    }

    /// Set cell state, bumping the revision only when the value changes
    pub fn set_cell(&mut self, pos: Position, state: CellState) {
        if let Some(index) = self.index(pos) {
            if self.cells[index] != state {
                self.cells[index] = state;
                self.revision += 1;
            }
        }
    }

    /// Free every cell
    pub fn clear(&mut self) {
        if self.cells.iter().any(|&c| c == CellState::Blocked) {
            self.cells.fill(CellState::Free);
            self.revision += 1;
        }
    }

    /// All blocked cells in row-major order
    pub fn blocked_cells(&self) -> Vec<Position> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Position::new(row, col)))
            .filter(|&pos| self.is_blocked(pos))
            .collect()
    }

    /// Get current grid revision number
    pub fn get_revision(&self) -> u64 {
        self.revision
    }

    /// Traversable 8-connected neighbors with their step cost.
    ///
    /// Orthogonal moves cost 1, diagonal moves cost sqrt(2). A diagonal move
    /// only requires the destination cell to be free.
    pub fn neighbors8(&self, pos: Position) -> Vec<(Position, f64)> {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dr, dc)| {
                let next = Position::new(pos.row + dr, pos.col + dc);
                if self.is_blocked(next) {
                    return None;
                }
                let cost = if dr == 0 || dc == 0 { 1.0 } else { SQRT_2 };
                Some((next, cost))
            })
            .collect()
    }
}
