use crate::error::FrontierError;
use crate::grid::Position;
use crate::node::{NodeId, SearchNode};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Frontier ordering: lower f first, then lower h (closer to the target),
/// then lower (row, col) so equal estimates always pop in the same order.
fn priority(a: &SearchNode, b: &SearchNode) -> Ordering {
    a.f()
        .total_cmp(&b.f())
        .then_with(|| a.h.total_cmp(&b.h))
        .then_with(|| a.position.cmp(&b.position))
}

/// Open set of the A* search.
///
/// A binary min-heap paired with a position -> heap slot index, so that
/// membership is O(1) and push, pop and decrease-key are O(log n). At most
/// one entry per position is ever open.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    heap: Vec<SearchNode>,
    slots: HashMap<Position, usize>,
}

impl Frontier {
    pub fn new() -> Self {
        Frontier {
            heap: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Insert a node for a position that is not open yet
    pub fn push(&mut self, node: SearchNode) -> Result<(), FrontierError> {
        if self.slots.contains_key(&node.position) {
            return Err(FrontierError::AlreadyOpen(node.position));
        }
        let slot = self.heap.len();
        self.slots.insert(node.position, slot);
        self.heap.push(node);
        self.sift_up(slot);
        Ok(())
    }

    /// Remove and return the node with the smallest f
    pub fn pop_min(&mut self) -> Result<SearchNode, FrontierError> {
        if self.heap.is_empty() {
            return Err(FrontierError::Empty);
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let node = self.heap.pop().ok_or(FrontierError::Empty)?;
        self.slots.remove(&node.position);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Ok(node)
    }

    /// Lower the cost of an open node and give it a new parent; `h` is kept
    pub fn decrease_cost(
        &mut self,
        position: Position,
        new_g: f64,
        new_parent: Option<NodeId>,
    ) -> Result<(), FrontierError> {
        let slot = *self
            .slots
            .get(&position)
            .ok_or(FrontierError::NotOpen(position))?;
        let node = &mut self.heap[slot];
        if !(new_g < node.g) {
            return Err(FrontierError::NotDecreased {
                position,
                current_g: node.g,
                new_g,
            });
        }
        node.g = new_g;
        node.parent = new_parent;
        self.sift_up(slot);
        Ok(())
    }

    pub fn contains(&self, position: Position) -> bool {
        self.slots.contains_key(&position)
    }

    pub fn get(&self, position: Position) -> Option<&SearchNode> {
        self.slots.get(&position).map(|&slot| &self.heap[slot])
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Open positions, in heap order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.heap.iter().map(|node| node.position)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].position, a);
        self.slots.insert(self.heap[b].position, b);
    }

    fn less(&self, a: usize, b: usize) -> bool {
        priority(&self.heap[a], &self.heap[b]) == Ordering::Less
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(row: i32, col: i32, g: f64, h: f64) -> SearchNode {
        SearchNode::new(Position::new(row, col), g, h, None)
    }

    #[test]
    fn test_pop_in_f_order() {
        let mut frontier = Frontier::new();
        frontier.push(node(0, 0, 5.0, 1.0)).unwrap();
        frontier.push(node(0, 1, 1.0, 1.0)).unwrap();
        frontier.push(node(0, 2, 3.0, 0.0)).unwrap();
        frontier.push(node(0, 3, 0.5, 0.0)).unwrap();

        let order: Vec<Position> = std::iter::from_fn(|| frontier.pop_min().ok())
            .map(|n| n.position)
            .collect();
        assert_eq!(
            order,
            vec![
                Position::new(0, 3),
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(0, 0),
            ]
        );
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_equal_f_prefers_lower_h() {
        let mut frontier = Frontier::new();
        frontier.push(node(0, 0, 1.0, 3.0)).unwrap();
        frontier.push(node(5, 5, 3.0, 1.0)).unwrap();
        assert_eq!(frontier.pop_min().unwrap().position, Position::new(5, 5));
    }

    #[test]
    fn test_equal_f_and_h_prefers_lower_position() {
        let mut frontier = Frontier::new();
        frontier.push(node(2, 1, 1.0, 1.0)).unwrap();
        frontier.push(node(1, 7, 1.0, 1.0)).unwrap();
        frontier.push(node(1, 3, 1.0, 1.0)).unwrap();
        assert_eq!(frontier.pop_min().unwrap().position, Position::new(1, 3));
        assert_eq!(frontier.pop_min().unwrap().position, Position::new(1, 7));
        assert_eq!(frontier.pop_min().unwrap().position, Position::new(2, 1));
    }

    #[test]
    fn test_duplicate_push_rejected() {
        let mut frontier = Frontier::new();
        frontier.push(node(1, 1, 2.0, 2.0)).unwrap();
        let err = frontier.push(node(1, 1, 1.0, 2.0)).unwrap_err();
        assert_eq!(err, FrontierError::AlreadyOpen(Position::new(1, 1)));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_pop_empty_is_error() {
        let mut frontier = Frontier::new();
        assert_eq!(frontier.pop_min(), Err(FrontierError::Empty));
    }

    #[test]
    fn test_decrease_cost_reorders() {
        let mut frontier = Frontier::new();
        frontier.push(node(0, 0, 2.0, 2.0)).unwrap();
        frontier.push(node(0, 1, 5.0, 2.0)).unwrap();
        frontier.push(node(0, 2, 6.0, 2.0)).unwrap();

        frontier
            .decrease_cost(Position::new(0, 2), 1.0, None)
            .unwrap();
        let updated = frontier.get(Position::new(0, 2)).unwrap();
        assert_eq!(updated.g, 1.0);
        assert_eq!(updated.h, 2.0);
        assert_eq!(updated.f(), 3.0);

        assert_eq!(frontier.pop_min().unwrap().position, Position::new(0, 2));
        assert_eq!(frontier.pop_min().unwrap().position, Position::new(0, 0));
    }

    #[test]
    fn test_decrease_cost_rejects_non_improvement() {
        let mut frontier = Frontier::new();
        frontier.push(node(3, 3, 2.0, 1.0)).unwrap();
        assert!(matches!(
            frontier.decrease_cost(Position::new(3, 3), 2.0, None),
            Err(FrontierError::NotDecreased { .. })
        ));
        assert_eq!(
            frontier.decrease_cost(Position::new(4, 4), 1.0, None),
            Err(FrontierError::NotOpen(Position::new(4, 4)))
        );
    }

    #[test]
    fn test_membership_follows_pop() {
        let mut frontier = Frontier::new();
        frontier.push(node(0, 0, 0.0, 1.0)).unwrap();
        frontier.push(node(0, 1, 1.0, 1.0)).unwrap();
        assert!(frontier.contains(Position::new(0, 0)));
        frontier.pop_min().unwrap();
        assert!(!frontier.contains(Position::new(0, 0)));
        assert!(frontier.contains(Position::new(0, 1)));
        // A popped position may be pushed again
        frontier.push(node(0, 0, 0.0, 1.0)).unwrap();
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_heap_stays_consistent_under_churn() {
        let mut frontier = Frontier::new();
        for i in 0..20 {
            let g = ((i * 7) % 11) as f64;
            frontier.push(node(i, 0, g + 10.0, 0.0)).unwrap();
        }
        for i in (0..20).step_by(3) {
            let current = frontier.get(Position::new(i, 0)).unwrap().g;
            frontier
                .decrease_cost(Position::new(i, 0), current - 10.0, None)
                .unwrap();
        }
        let mut last = f64::NEG_INFINITY;
        while let Ok(n) = frontier.pop_min() {
            assert!(n.f() >= last);
            last = n.f();
        }
    }
}
