//! Segment-level data structures backing the cost curve.
//!
//! A `SegmentNode` is one linear piece of a convex piecewise-linear
//! function's derivative: a slope increase of `delta_slope` at the piece's
//! breakpoint, followed by a run of horizontal extent `delta_width`. Nodes
//! live in a grow-only [`NodeStore`] and refer to each other by index, so
//! every structural edit is an array-bounds-checked assignment.

use std::ops::{Index, IndexMut};

/// One piece of the derivative profile, with subtree aggregates.
///
/// `slope_sum` and `width_sum` cover the node itself plus both child
/// subtrees. They are maintained lazily: [`NodeStore::refresh`] recomputes
/// them from the children's stored sums, and the tree layer decides when a
/// node is due for a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentNode {
    /// Derivative increase at this piece's breakpoint; always positive.
    pub delta_slope: i64,
    /// Horizontal extent of the piece; always positive.
    pub delta_width: i64,
    /// Subtree total of `delta_slope`.
    pub slope_sum: i64,
    /// Subtree total of `delta_width`.
    pub width_sum: i64,
    pub parent: Option<usize>,
    /// Left child at index 0, right child at index 1.
    pub children: [Option<usize>; 2],
}

impl SegmentNode {
    fn new(delta_slope: i64, delta_width: i64) -> Self {
        Self {
            delta_slope,
            delta_width,
            slope_sum: delta_slope,
            width_sum: delta_width,
            parent: None,
            children: [None, None],
        }
    }
}

/// Grow-only arena of segment nodes for one curve.
///
/// Nodes are never reclaimed individually; the whole store is dropped when
/// its curve is.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Vec<SegmentNode>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a fresh unlinked node and return its index.
    ///
    /// # Panics
    /// Panics if either delta is not positive.
    pub fn push(&mut self, delta_slope: i64, delta_width: i64) -> usize {
        assert!(delta_slope > 0, "delta_slope must be positive");
        assert!(delta_width > 0, "delta_width must be positive");
        self.nodes.push(SegmentNode::new(delta_slope, delta_width));
        self.nodes.len() - 1
    }

    /// Recompute `idx`'s aggregates from its own deltas and its children's
    /// stored sums. The children must already be up to date.
    pub fn refresh(&mut self, idx: usize) {
        debug_assert!(self.nodes[idx].delta_slope > 0);
        debug_assert!(self.nodes[idx].delta_width > 0);
        let [left, right] = self.nodes[idx].children;
        let mut slope_sum = self.nodes[idx].delta_slope;
        let mut width_sum = self.nodes[idx].delta_width;
        if let Some(child) = left {
            slope_sum += self.nodes[child].slope_sum;
            width_sum += self.nodes[child].width_sum;
        }
        if let Some(child) = right {
            slope_sum += self.nodes[child].slope_sum;
            width_sum += self.nodes[child].width_sum;
        }
        let node = &mut self.nodes[idx];
        node.slope_sum = slope_sum;
        node.width_sum = width_sum;
    }

    /// Full validation pass over the subtree rooted at `root`: positive
    /// deltas, aggregates consistent with the children's stored sums, and
    /// intact parent back-links. Returns the number of nodes reached.
    ///
    /// # Panics
    /// Panics on the first violated invariant.
    pub fn audit(&self, root: usize) -> usize {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];
        let mut reached = 0;
        while let Some(idx) = stack.pop() {
            assert!(!seen[idx], "node {idx} reached twice");
            seen[idx] = true;
            reached += 1;
            let node = &self.nodes[idx];
            assert!(node.delta_slope > 0, "node {idx} has non-positive delta_slope");
            assert!(node.delta_width > 0, "node {idx} has non-positive delta_width");
            let mut slope_sum = node.delta_slope;
            let mut width_sum = node.delta_width;
            for &child in &node.children {
                if let Some(c) = child {
                    assert_eq!(
                        self.nodes[c].parent,
                        Some(idx),
                        "node {c} does not link back to parent {idx}"
                    );
                    slope_sum += self.nodes[c].slope_sum;
                    width_sum += self.nodes[c].width_sum;
                    stack.push(c);
                }
            }
            assert_eq!(node.slope_sum, slope_sum, "stale slope_sum at node {idx}");
            assert_eq!(node.width_sum, width_sum, "stale width_sum at node {idx}");
        }
        reached
    }
}

impl Index<usize> for NodeStore {
    type Output = SegmentNode;

    fn index(&self, idx: usize) -> &SegmentNode {
        &self.nodes[idx]
    }
}

impl IndexMut<usize> for NodeStore {
    fn index_mut(&mut self, idx: usize) -> &mut SegmentNode {
        &mut self.nodes[idx]
    }
}

#[cfg(test)]
mod tests {
    use super::NodeStore;

    #[test]
    fn fresh_node_aggregates_equal_deltas() {
        let mut store = NodeStore::new();
        let idx = store.push(3, 7);
        assert_eq!(store[idx].slope_sum, 3);
        assert_eq!(store[idx].width_sum, 7);
        assert_eq!(store[idx].parent, None);
        assert_eq!(store[idx].children, [None, None]);
    }

    #[test]
    #[should_panic(expected = "delta_slope must be positive")]
    fn zero_slope_is_rejected() {
        let mut store = NodeStore::new();
        store.push(0, 5);
    }

    #[test]
    fn refresh_sums_both_children() {
        let mut store = NodeStore::new();
        let root = store.push(1, 10);
        let left = store.push(2, 20);
        let right = store.push(4, 40);
        store[root].children = [Some(left), Some(right)];
        store[left].parent = Some(root);
        store[right].parent = Some(root);
        store.refresh(root);
        assert_eq!(store[root].slope_sum, 7);
        assert_eq!(store[root].width_sum, 70);
        assert_eq!(store.audit(root), 3);
    }

    #[test]
    #[should_panic(expected = "stale slope_sum")]
    fn audit_catches_a_stale_aggregate() {
        let mut store = NodeStore::new();
        let root = store.push(1, 10);
        let left = store.push(2, 20);
        store[root].children[0] = Some(left);
        store[left].parent = Some(root);
        // root's aggregates were never refreshed after the link
        store.audit(root);
    }
}
