//! Convex piecewise-linear cost curve with splay-tree breakpoints.
//!
//! A [`CostCurve`] represents a convex function over a working window.
//! The representation is split three ways:
//!
//! - `base`: the function's value at the window start,
//! - `left_slope`: the slope entering the window start, kept negative so
//!   the curve always descends into its minimum from the left,
//! - the tree: the derivative's pieces from the window start rightward,
//!   each a positive slope jump followed by a positive horizontal run.
//!
//! Absolute positions are deliberately absent: a piece sits at the prefix
//! width of everything before it, so widening the window on the left is a
//! caller-side relabeling, not a tree edit. Uniform re-slopes are a single
//! scalar update to `left_slope`, which shifts the cumulative slope at
//! every point of the profile at once.

use crate::traits::{SlopeAxis, WidthAxis};
use crate::tree::WeightedTree;

/// Convex cost curve under slope and width edits.
///
/// ```
/// use slope_fit::curve::CostCurve;
///
/// // a flat window of width 4 between walls of slope 10
/// let mut curve = CostCurve::open(10, 4);
/// curve.add_slope(2, 5);
/// assert_eq!(curve.minimum_value(), 0);
/// curve.lift(3);
/// assert_eq!(curve.minimum_value(), 3);
/// ```
#[derive(Debug)]
pub struct CostCurve {
    tree: WeightedTree,
    left_slope: i64,
    base: i128,
    auditing: bool,
}

impl CostCurve {
    /// Open a flat zero curve over a window of `width`, fenced by walls of
    /// slope `wall` on both sides.
    ///
    /// # Panics
    /// Panics unless both `wall` and `width` are positive.
    pub fn open(wall: i64, width: i64) -> Self {
        Self::with_capacity(wall, width, 0)
    }

    /// Like [`open`](Self::open), but pre-sizes the node arena.
    pub fn with_capacity(wall: i64, width: i64, nodes: usize) -> Self {
        assert!(wall > 0, "wall slope must be positive");
        assert!(width > 0, "window width must be positive");
        let mut tree = WeightedTree::with_capacity(nodes);
        // left wall's landing jump over the window, then the right wall's
        // jump on a carrier piece whose width is never read
        tree.append(wall, width);
        tree.append(wall, 1);
        Self {
            tree,
            left_slope: -wall,
            base: 0,
            auditing: false,
        }
    }

    /// Run a full structural audit after every tree edit.
    pub fn set_audit(&mut self, on: bool) {
        self.auditing = on;
    }

    /// Slope entering the window start. Negative while the curve is valid.
    pub fn left_slope(&self) -> i64 {
        self.left_slope
    }

    /// Function value at the window start.
    pub fn base(&self) -> i128 {
        self.base
    }

    pub fn tree(&self) -> &WeightedTree {
        &self.tree
    }

    /// Total horizontal extent of the stored profile.
    pub fn total_width(&self) -> i64 {
        self.tree.total::<WidthAxis>()
    }

    /// Total slope climbed across the stored profile.
    pub fn total_slope(&self) -> i64 {
        self.tree.total::<SlopeAxis>()
    }

    /// Raise the whole curve by `amount`.
    pub fn lift(&mut self, amount: i128) {
        self.base += amount;
    }

    /// Add `slope` uniformly across the entire curve.
    ///
    /// The profile's jumps are untouched; only the entering slope moves,
    /// which shifts every cumulative slope with it. The result must still
    /// descend at the window start.
    pub fn tilt(&mut self, slope: i64) {
        self.left_slope += slope;
        assert!(
            self.left_slope < 0,
            "the curve must keep descending at the window start"
        );
    }

    /// Insert a slope jump of `slope` at width offset `offset` from the
    /// window start.
    ///
    /// # Panics
    /// Panics unless `slope > 0` and `0 <= offset < total_width`.
    pub fn add_slope(&mut self, offset: i64, slope: i64) {
        let placement = self.tree.insert::<WidthAxis>(offset, slope);
        self.tree.promote(placement.index(), None);
        if self.auditing {
            self.audit();
        }
    }

    /// Insert a horizontal run of `width` where the profile's cumulative
    /// slope reaches `level`.
    ///
    /// Passing `level = -self.left_slope()` inserts at the curve's zero
    /// crossing, which widens the minimum region in place.
    ///
    /// # Panics
    /// Panics unless `width > 0` and `0 < level <= total_slope`.
    pub fn add_width(&mut self, level: i64, width: i64) {
        let placement = self.tree.insert::<SlopeAxis>(level, width);
        self.tree.promote(placement.index(), None);
        if self.auditing {
            self.audit();
        }
    }

    /// Minimum value of the curve.
    ///
    /// Walks the profile from the window start, descending while the
    /// cumulative slope is negative. The first piece that brings the slope
    /// to zero or above marks the minimum.
    ///
    /// # Panics
    /// Panics if the curve does not descend at the window start, or if the
    /// profile never stops descending.
    pub fn minimum_value(&self) -> i128 {
        assert!(
            self.left_slope < 0,
            "the curve must descend at the window start"
        );
        let mut slope = self.left_slope;
        let mut value = self.base;
        for piece in self.tree.in_order() {
            slope += piece.delta_slope;
            if slope >= 0 {
                return value;
            }
            value += i128::from(piece.delta_width) * i128::from(slope);
        }
        panic!("curve never stops descending");
    }

    /// The profile's pieces in order, as `(delta_slope, delta_width)`.
    pub fn segments(&self) -> Vec<(i64, i64)> {
        self.tree
            .in_order()
            .map(|n| (n.delta_slope, n.delta_width))
            .collect()
    }

    /// Validate the curve: descending window start plus a full tree audit.
    ///
    /// # Panics
    /// Panics on the first violated invariant.
    pub fn audit(&self) {
        assert!(
            self.left_slope < 0,
            "the curve must descend at the window start"
        );
        self.tree.audit();
    }
}
