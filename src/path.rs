use crate::grid::Position;
use crate::node::{NodeArena, NodeId};
use std::f64::consts::SQRT_2;

/// Walk parent links from `terminal` back to the leg origin, origin first
pub fn reconstruct(arena: &NodeArena, terminal: NodeId) -> Vec<Position> {
    let mut path = Vec::new();
    let mut current = arena.get(terminal);
    while let Some(node) = current {
        path.push(node.position);
        current = node.parent.and_then(|id| arena.get(id));
    }
    path.reverse();
    path
}

/// Cost of one move between adjacent cells
pub fn step_cost(from: &Position, to: &Position) -> f64 {
    if from.row != to.row && from.col != to.col {
        SQRT_2
    } else {
        1.0
    }
}

/// Total movement cost along a path of adjacent cells
pub fn path_cost(path: &[Position]) -> f64 {
    path.windows(2).map(|w| step_cost(&w[0], &w[1])).sum()
}

/// True if every consecutive pair of cells is 8-connected
pub fn is_connected(path: &[Position]) -> bool {
    path.windows(2).all(|w| w[0].is_adjacent(&w[1]))
}

/// Format path for display
pub fn format_path(path: &[Position]) -> String {
    if path.is_empty() {
        return "No path".to_string();
    }

    path.iter()
        .map(|pos| pos.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
