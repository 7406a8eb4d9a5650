use crate::grid::Position;

/// Handle to an expanded node inside a leg's [`NodeArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in the A* search for the current leg
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode {
    pub position: Position,
    /// Accumulated cost from the leg origin
    pub g: f64,
    /// Heuristic estimate to the leg target
    pub h: f64,
    /// Expanded predecessor, `None` for the leg origin
    pub parent: Option<NodeId>,
}

impl SearchNode {
    pub fn new(position: Position, g: f64, h: f64, parent: Option<NodeId>) -> Self {
        SearchNode {
            position,
            g,
            h,
            parent,
        }
    }

    pub fn f(&self) -> f64 {
        self.g + self.h
    }
}

/// Append-only storage for the nodes expanded during one leg.
///
/// Parents are always pushed before their children, so every `parent`
/// handle points to a lower index and the links form a tree.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: SearchNode) -> NodeId {
        debug_assert!(node.parent.map_or(true, |p| p.0 < self.nodes.len()));
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> Option<&SearchNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
