//! Splay tree over derivative pieces, keyed by prefix sums on either axis.
//!
//! The tree stores the pieces of a convex function's derivative in order.
//! There are no stored keys: a piece's position is the prefix sum of
//! either axis over everything before it, so both "find the piece at
//! width offset k" and "find the piece where cumulative slope reaches k"
//! are the same weighted descent, parameterized by [`DescentAxis`].
//!
//! Aggregates are maintained lazily. An [`insert`](WeightedTree::insert)
//! leaves the descent path stale and returns the touched node; the caller
//! must [`promote`](WeightedTree::promote) that node before the next
//! operation that reads aggregates. Promotion rotates the node to the
//! root, refreshing every node it demotes on the way, then refreshes the
//! node itself, so the whole stale path is repaired in one pass.

use crate::node::{NodeStore, SegmentNode};
use crate::traits::{Anchor, DescentAxis};

/// Where an insert landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The key hit an existing piece boundary; the amount merged into
    /// this node's opposite delta.
    Exact(usize),
    /// The key fell strictly inside a piece, which split; this is the
    /// newly created node.
    Split(usize),
}

impl Placement {
    /// The node to promote after the insert.
    pub fn index(self) -> usize {
        match self {
            Placement::Exact(idx) | Placement::Split(idx) => idx,
        }
    }
}

/// Order-maintaining splay tree of [`SegmentNode`]s.
#[derive(Debug, Default)]
pub struct WeightedTree {
    store: NodeStore,
    root: Option<usize>,
}

impl WeightedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(nodes: usize) -> Self {
        Self {
            store: NodeStore::with_capacity(nodes),
            root: None,
        }
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn root(&self) -> Option<usize> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Tree-wide total of axis `A`.
    pub fn total<A: DescentAxis>(&self) -> i64 {
        self.root.map_or(0, |r| A::subtotal(&self.store[r]))
    }

    /// Append a piece after everything currently in the tree.
    ///
    /// The new node is promoted to the root, so aggregates are fully
    /// up to date when this returns.
    pub fn append(&mut self, delta_slope: i64, delta_width: i64) {
        let node = self.store.push(delta_slope, delta_width);
        match self.root {
            None => self.root = Some(node),
            Some(mut cur) => {
                while let Some(next) = self.store[cur].children[1] {
                    cur = next;
                }
                self.store[cur].children[1] = Some(node);
                self.store[node].parent = Some(cur);
                self.promote(node, None);
            }
        }
    }

    /// Insert `amount` of the opposite axis at prefix-sum `key` on axis `A`.
    ///
    /// An exact boundary hit merges the amount into the existing piece; a
    /// key strictly inside a piece splits it. Either way the touched node
    /// is returned and the descent path is left stale: callers must
    /// [`promote`](Self::promote) the returned placement's node before the
    /// next aggregate-reading operation.
    ///
    /// # Panics
    /// Panics if the tree is empty, if `amount` is not positive, or if
    /// `key` is outside the axis's valid range (`[0, total)` for
    /// start-anchored keys, `(0, total]` for end-anchored ones).
    pub fn insert<A: DescentAxis>(&mut self, mut key: i64, amount: i64) -> Placement {
        assert!(amount > 0, "inserted amount must be positive");
        let total = self.total::<A>();
        match A::ANCHOR {
            Anchor::Start => {
                assert!(0 <= key && key < total, "start-anchored key {key} outside [0, {total})")
            }
            Anchor::End => {
                assert!(0 < key && key <= total, "end-anchored key {key} outside (0, {total}]")
            }
        }
        let mut idx = self.root.expect("insert into an empty tree");
        loop {
            let left = self.store[idx].children[0];
            let before = left.map_or(0, |c| A::subtotal(&self.store[c]));
            let own = A::weight(&self.store[idx]);
            let go_left = match A::ANCHOR {
                Anchor::Start => key < before,
                Anchor::End => key <= before,
            };
            if go_left {
                idx = left.expect("descent undershot a subtree");
                continue;
            }
            let boundary = match A::ANCHOR {
                Anchor::Start => before,
                Anchor::End => before + own,
            };
            if key == boundary {
                *A::deposit_mut(&mut self.store[idx]) += amount;
                return Placement::Exact(idx);
            }
            if key < before + own {
                return Placement::Split(self.split::<A>(idx, key - before, amount));
            }
            key -= before + own;
            idx = self.store[idx].children[1].expect("descent overshot a subtree");
        }
    }

    /// Split `idx` at `offset` along axis `A` and graft a new piece
    /// carrying `amount` of the opposite axis at the split point.
    fn split<A: DescentAxis>(&mut self, idx: usize, offset: i64, amount: i64) -> usize {
        let own = A::weight(&self.store[idx]);
        debug_assert!(0 < offset && offset < own);
        // A start-anchored piece keeps its head and the tail moves to the
        // new in-order successor; an end-anchored piece keeps its tail and
        // the head moves to the new predecessor.
        let (side, kept, carried) = match A::ANCHOR {
            Anchor::Start => (1, offset, own - offset),
            Anchor::End => (0, own - offset, offset),
        };
        let (delta_slope, delta_width) = A::compose(carried, amount);
        let node = self.store.push(delta_slope, delta_width);
        *A::weight_mut(&mut self.store[idx]) = kept;
        self.graft(idx, side, node);
        node
    }

    /// Attach `node` as the in-order neighbor of `at` on `side`.
    fn graft(&mut self, at: usize, side: usize, node: usize) {
        match self.store[at].children[side] {
            None => {
                self.store[at].children[side] = Some(node);
                self.store[node].parent = Some(at);
            }
            Some(mut cur) => {
                while let Some(next) = self.store[cur].children[1 - side] {
                    cur = next;
                }
                self.store[cur].children[1 - side] = Some(node);
                self.store[node].parent = Some(cur);
            }
        }
    }

    fn direction(&self, idx: usize) -> usize {
        let parent = self.store[idx].parent.expect("direction of the root");
        if self.store[parent].children[0] == Some(idx) {
            0
        } else {
            1
        }
    }

    /// Rotate `idx` one level up. Refreshes only the demoted parent;
    /// `idx` itself stays stale until its caller refreshes it.
    pub fn rotate(&mut self, idx: usize) {
        let parent = self.store[idx].parent.expect("rotate requires a parent");
        let side = self.direction(idx);
        let grand = self.store[parent].parent;
        let carry = self.store[idx].children[1 - side];

        self.store[parent].children[side] = carry;
        if let Some(c) = carry {
            self.store[c].parent = Some(parent);
        }
        self.store[idx].children[1 - side] = Some(parent);
        self.store[parent].parent = Some(idx);
        self.store[idx].parent = grand;
        match grand {
            Some(g) => {
                let gside = if self.store[g].children[0] == Some(parent) { 0 } else { 1 };
                self.store[g].children[gside] = Some(idx);
            }
            None => self.root = Some(idx),
        }
        self.store.refresh(parent);
    }

    /// Splay `idx` until its parent is `stop` (to the root for `None`),
    /// then refresh it. Repairs a stale path whose stale nodes are all
    /// ancestors of `idx`.
    pub fn promote(&mut self, idx: usize, stop: Option<usize>) {
        loop {
            let Some(parent) = self.store[idx].parent else { break };
            if stop == Some(parent) {
                break;
            }
            let grand = self.store[parent].parent;
            if grand.is_none() || grand == stop {
                self.rotate(idx);
            } else if self.direction(idx) == self.direction(parent) {
                self.rotate(parent);
                self.rotate(idx);
            } else {
                self.rotate(idx);
                self.rotate(idx);
            }
        }
        self.store.refresh(idx);
    }

    /// Iterate pieces left to right.
    pub fn in_order(&self) -> InOrder<'_> {
        let mut iter = InOrder {
            store: &self.store,
            stack: Vec::new(),
        };
        let mut cur = self.root;
        while let Some(idx) = cur {
            iter.stack.push(idx);
            cur = iter.store[idx].children[0];
        }
        iter
    }

    /// Validate the whole tree: root link, parent back-links, positive
    /// deltas, exact aggregates, and that every stored node is reachable.
    ///
    /// # Panics
    /// Panics on the first violated invariant.
    pub fn audit(&self) {
        match self.root {
            Some(root) => {
                assert_eq!(self.store[root].parent, None, "root has a parent link");
                let reached = self.store.audit(root);
                assert_eq!(reached, self.store.len(), "store holds detached nodes");
            }
            None => assert!(self.store.is_empty(), "store holds nodes but no root is set"),
        }
    }
}

/// In-order traversal over a tree's pieces.
pub struct InOrder<'a> {
    store: &'a NodeStore,
    stack: Vec<usize>,
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a SegmentNode;

    fn next(&mut self) -> Option<&'a SegmentNode> {
        let idx = self.stack.pop()?;
        let mut cur = self.store[idx].children[1];
        while let Some(c) = cur {
            self.stack.push(c);
            cur = self.store[c].children[0];
        }
        Some(&self.store[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::{Placement, WeightedTree};
    use crate::traits::{SlopeAxis, WidthAxis};

    fn ladder() -> WeightedTree {
        // pieces in order: (ds, dx) = (5, 10), (3, 4), (7, 6)
        let mut tree = WeightedTree::new();
        tree.append(5, 10);
        tree.append(3, 4);
        tree.append(7, 6);
        tree
    }

    #[test]
    fn append_builds_an_ordered_audited_tree() {
        let tree = ladder();
        tree.audit();
        assert_eq!(tree.total::<WidthAxis>(), 20);
        assert_eq!(tree.total::<SlopeAxis>(), 15);
        let widths: Vec<i64> = tree.in_order().map(|n| n.delta_width).collect();
        assert_eq!(widths, vec![10, 4, 6]);
    }

    #[test]
    fn width_insert_on_a_boundary_merges() {
        let mut tree = ladder();
        let before = tree.len();
        // width offset 10 is the left edge of the second piece
        let placement = tree.insert::<WidthAxis>(10, 2);
        assert!(matches!(placement, Placement::Exact(_)));
        tree.promote(placement.index(), None);
        tree.audit();
        assert_eq!(tree.len(), before);
        assert_eq!(tree.total::<SlopeAxis>(), 17);
        assert_eq!(tree.total::<WidthAxis>(), 20);
        let slopes: Vec<i64> = tree.in_order().map(|n| n.delta_slope).collect();
        assert_eq!(slopes, vec![5, 5, 7]);
    }

    #[test]
    fn width_insert_inside_a_piece_splits_it() {
        let mut tree = ladder();
        let before = tree.len();
        // width offset 3 is inside the first piece: head keeps 3, tail gets 7
        let placement = tree.insert::<WidthAxis>(3, 9);
        assert!(matches!(placement, Placement::Split(_)));
        tree.promote(placement.index(), None);
        tree.audit();
        assert_eq!(tree.len(), before + 1);
        assert_eq!(tree.total::<WidthAxis>(), 20);
        assert_eq!(tree.total::<SlopeAxis>(), 24);
        let pieces: Vec<(i64, i64)> = tree.in_order().map(|n| (n.delta_slope, n.delta_width)).collect();
        assert_eq!(pieces, vec![(5, 3), (9, 7), (3, 4), (7, 6)]);
    }

    #[test]
    fn slope_insert_on_a_boundary_merges() {
        let mut tree = ladder();
        // cumulative slope 8 is the right edge of the second piece
        let placement = tree.insert::<SlopeAxis>(8, 5);
        assert!(matches!(placement, Placement::Exact(_)));
        tree.promote(placement.index(), None);
        tree.audit();
        assert_eq!(tree.total::<WidthAxis>(), 25);
        let pieces: Vec<(i64, i64)> = tree.in_order().map(|n| (n.delta_slope, n.delta_width)).collect();
        assert_eq!(pieces, vec![(5, 10), (3, 9), (7, 6)]);
    }

    #[test]
    fn slope_insert_inside_a_piece_splits_it() {
        let mut tree = ladder();
        // cumulative slope 2 is inside the first piece's jump: the head
        // (slope 2, carrying the new run) lands before the kept tail
        let placement = tree.insert::<SlopeAxis>(2, 11);
        assert!(matches!(placement, Placement::Split(_)));
        tree.promote(placement.index(), None);
        tree.audit();
        assert_eq!(tree.total::<SlopeAxis>(), 15);
        assert_eq!(tree.total::<WidthAxis>(), 31);
        let pieces: Vec<(i64, i64)> = tree.in_order().map(|n| (n.delta_slope, n.delta_width)).collect();
        assert_eq!(pieces, vec![(2, 11), (3, 10), (3, 4), (7, 6)]);
    }

    #[test]
    fn slope_insert_accepts_the_full_total_as_a_key() {
        let mut tree = ladder();
        let placement = tree.insert::<SlopeAxis>(15, 3);
        assert!(matches!(placement, Placement::Exact(_)));
        tree.promote(placement.index(), None);
        tree.audit();
        let pieces: Vec<(i64, i64)> = tree.in_order().map(|n| (n.delta_slope, n.delta_width)).collect();
        assert_eq!(pieces, vec![(5, 10), (3, 4), (7, 9)]);
    }

    #[test]
    fn width_insert_at_zero_hits_the_first_piece() {
        let mut tree = ladder();
        let placement = tree.insert::<WidthAxis>(0, 4);
        assert!(matches!(placement, Placement::Exact(_)));
        tree.promote(placement.index(), None);
        tree.audit();
        let slopes: Vec<i64> = tree.in_order().map(|n| n.delta_slope).collect();
        assert_eq!(slopes, vec![9, 3, 7]);
    }

    #[test]
    #[should_panic(expected = "end-anchored key 0")]
    fn slope_insert_rejects_a_zero_key() {
        let mut tree = ladder();
        tree.insert::<SlopeAxis>(0, 1);
    }

    #[test]
    #[should_panic(expected = "outside [0, 20)")]
    fn width_insert_rejects_the_full_total_as_a_key() {
        let mut tree = ladder();
        tree.insert::<WidthAxis>(20, 1);
    }

    #[test]
    fn promote_of_the_root_changes_nothing() {
        let mut tree = ladder();
        let root = tree.root().expect("ladder has a root");
        let before: Vec<(i64, i64)> =
            tree.in_order().map(|n| (n.delta_slope, n.delta_width)).collect();
        tree.promote(root, None);
        assert_eq!(tree.root(), Some(root));
        let after: Vec<(i64, i64)> =
            tree.in_order().map(|n| (n.delta_slope, n.delta_width)).collect();
        assert_eq!(before, after);
        tree.audit();
    }

    #[test]
    fn promote_with_a_stop_halts_below_it() {
        let mut tree = WeightedTree::new();
        for i in 1..=6 {
            tree.append(i, i);
        }
        let root = tree.root().expect("tree has a root");
        // deepest node on the left spine
        let mut deep = root;
        while let Some(next) = tree.store()[deep].children[0] {
            deep = next;
        }
        assert_ne!(deep, root);
        tree.promote(deep, Some(root));
        assert_eq!(tree.root(), Some(root));
        assert_eq!(tree.store()[deep].parent, Some(root));
        // the stop's subtree composition is unchanged, so nothing is stale
        tree.audit();
    }

    #[test]
    fn rotate_refreshes_the_demoted_parent() {
        let mut tree = ladder();
        let root = tree.root().expect("ladder has a root");
        let child = tree.store()[root].children[0]
            .or(tree.store()[root].children[1])
            .expect("root of three nodes has a child");
        tree.rotate(child);
        assert_eq!(tree.root(), Some(child));
        // the climbed node is stale by contract until refreshed
        tree.promote(child, None);
        tree.audit();
        assert_eq!(tree.total::<WidthAxis>(), 20);
        assert_eq!(tree.total::<SlopeAxis>(), 15);
    }

    #[test]
    fn interleaved_inserts_keep_every_invariant() {
        let mut tree = WeightedTree::new();
        tree.append(100, 50);
        tree.append(100, 1);
        let keys = [1i64, 7, 13, 13, 29, 43, 49];
        for (i, &key) in keys.iter().enumerate() {
            let placement = if i % 2 == 0 {
                tree.insert::<WidthAxis>(key, 3)
            } else {
                tree.insert::<SlopeAxis>(key.min(tree.total::<SlopeAxis>()), 3)
            };
            tree.promote(placement.index(), None);
            tree.audit();
        }
        assert_eq!(tree.root().map(|r| tree.store()[r].parent), Some(None));
    }
}
