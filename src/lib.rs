//! Slope-trick fitting for drift-bounded sequences
//!
//! This crate solves a constrained tracking problem: given targets
//! `t_1..t_n`, choose values `v_1..v_n` with `v_1 = t_1` and `v_n = t_n`,
//! where consecutive values drift by at most a step bound, minimizing the
//! summed absolute deviation of the interior values from their targets.
//!
//! ## Core idea
//! 1. The prefix-optimal cost as a function of the current value is convex
//!    and piecewise linear, so it is fully described by its breakpoints.
//! 2. A splay tree keyed by prefix sums ([`curve::CostCurve`]) supports
//!    every recurrence step as a logarithmic-time breakpoint edit: absolute
//!    deviations fold in as slope insertions, the drift bound as a width
//!    insertion at the curve's zero crossing.
//! 3. [`FitEngine`] sweeps the positions once and reads the answer off the
//!    final curve's minimum, for `O(n log n)` total.
//!
//! Compared to the classic table-filling recurrence over the value range,
//! the curve never materializes a value axis, so run time is independent of
//! how far the targets spread.
//!
//! ## Quick start
//! ```
//! use slope_fit::{FitEngine, FitOutcome, FitProblem};
//!
//! // ends pinned at 0, one interior target at 5, drift at most 1
//! let problem = FitProblem::new(1, vec![0, 5, 0]);
//! let outcome = FitEngine::new(problem).run();
//! assert_eq!(outcome, FitOutcome::Cost(4));
//! ```

pub mod builder;
pub mod curve;
pub mod node;
pub mod solver;
pub mod traits;
pub mod tree;
pub mod utils;

pub use crate::builder::FitEngineBuilder;
pub use crate::curve::CostCurve;
pub use crate::solver::{FitEngine, FitOutcome, FitProblem};
