//! The descent contract shared by the two curve edit operations.
//!
//! Inserting a slope kink and inserting a width run are mirror images of
//! one another: both walk the tree by a prefix-sum key, both split a piece
//! when the key lands strictly inside it, and both deposit into the
//! *opposite* delta when the key lands exactly on a piece boundary. The
//! [`DescentAxis`] trait captures the mirror so `WeightedTree::insert` can
//! be written once and instantiated for either axis.

use crate::node::SegmentNode;

/// Which end of a piece its key addresses.
///
/// Width keys measure the distance from the *start* of the derivative
/// profile to the start of a piece, so the valid key range is
/// `[0, total_width)` and an exact hit lands on a piece's left edge.
/// Slope keys measure cumulative slope through the *end* of a piece, so
/// the valid range is `(0, total_slope]` and an exact hit lands on a
/// piece's right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    End,
}

/// One axis of the derivative profile: either horizontal extent or
/// cumulative slope.
///
/// Implementations are zero-sized selectors; all state lives in the nodes.
pub trait DescentAxis {
    /// How keys on this axis relate to piece boundaries.
    const ANCHOR: Anchor;

    /// The per-piece measure the descent key is compared against.
    fn weight(node: &SegmentNode) -> i64;

    /// Subtree total of [`weight`](Self::weight).
    fn subtotal(node: &SegmentNode) -> i64;

    fn weight_mut(node: &mut SegmentNode) -> &mut i64;

    /// The *other* axis's delta, the one an exact boundary hit deposits
    /// into.
    fn deposit_mut(node: &mut SegmentNode) -> &mut i64;

    /// Assemble `(delta_slope, delta_width)` for a freshly split-off piece
    /// carrying `weight` on this axis and `amount` on the other.
    fn compose(weight: i64, amount: i64) -> (i64, i64);
}

/// Descent keyed by horizontal extent.
pub struct WidthAxis;

impl DescentAxis for WidthAxis {
    const ANCHOR: Anchor = Anchor::Start;

    fn weight(node: &SegmentNode) -> i64 {
        node.delta_width
    }

    fn subtotal(node: &SegmentNode) -> i64 {
        node.width_sum
    }

    fn weight_mut(node: &mut SegmentNode) -> &mut i64 {
        &mut node.delta_width
    }

    fn deposit_mut(node: &mut SegmentNode) -> &mut i64 {
        &mut node.delta_slope
    }

    fn compose(weight: i64, amount: i64) -> (i64, i64) {
        (amount, weight)
    }
}

/// Descent keyed by cumulative slope.
pub struct SlopeAxis;

impl DescentAxis for SlopeAxis {
    const ANCHOR: Anchor = Anchor::End;

    fn weight(node: &SegmentNode) -> i64 {
        node.delta_slope
    }

    fn subtotal(node: &SegmentNode) -> i64 {
        node.slope_sum
    }

    fn weight_mut(node: &mut SegmentNode) -> &mut i64 {
        &mut node.delta_slope
    }

    fn deposit_mut(node: &mut SegmentNode) -> &mut i64 {
        &mut node.delta_width
    }

    fn compose(weight: i64, amount: i64) -> (i64, i64) {
        (weight, amount)
    }
}
