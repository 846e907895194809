//! Drift-bounded sequence fitting over a [`CostCurve`].
//!
//! A [`FitProblem`] asks for values `v_1..v_n` where the first and last
//! values are pinned to their targets, consecutive values may differ by at
//! most `max_step`, and the cost is the summed absolute deviation of the
//! interior values from their targets. [`FitEngine::run`] sweeps the
//! positions once, maintaining the convex prefix-cost curve:
//!
//! - each interior target folds an absolute deviation into the curve with
//!   one lift, one tilt and at most one slope insertion,
//! - each step bound relaxes the curve by inserting width at its zero
//!   crossing and widening the reachable window,
//! - the pinned far end is enforced with a steep deviation whose wall
//!   slope dominates every slope the targets can produce, so reading the
//!   curve's minimum reads the value at the pinned point.
//!
//! Every curve operation is amortized logarithmic in the number of pieces,
//! giving `O(n log n)` for the whole sweep.

use crate::curve::CostCurve;
use crate::utils::wall_slope;

/// A drift-bounded fitting instance: targets plus a step bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitProblem {
    targets: Vec<i64>,
    max_step: i64,
}

impl FitProblem {
    /// Build an instance over `targets` with per-step drift at most
    /// `max_step`.
    ///
    /// # Panics
    /// Panics if there are fewer than two targets, if `max_step` is
    /// negative, or if the combined magnitude of targets and total drift
    /// would not fit the solver's working range.
    pub fn new(max_step: i64, targets: Vec<i64>) -> Self {
        assert!(targets.len() >= 2, "an instance needs at least two positions");
        assert!(max_step >= 0, "max_step must be non-negative");
        let extent = targets
            .iter()
            .map(|&t| i128::from(t).abs())
            .max()
            .expect("targets is non-empty");
        let drift = (targets.len() as i128 - 1) * i128::from(max_step);
        assert!(
            extent + 2 * drift < i128::from(i64::MAX / 4),
            "target and step magnitudes overflow the solver's working range"
        );
        Self { targets, max_step }
    }

    pub fn num_positions(&self) -> usize {
        self.targets.len()
    }

    pub fn max_step(&self) -> i64 {
        self.max_step
    }

    pub fn targets(&self) -> &[i64] {
        &self.targets
    }
}

/// Result of a fit: the optimal cost, or proof that no assignment exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitOutcome {
    /// Minimum total interior deviation over all feasible assignments.
    Cost(i128),
    /// No assignment reaches the pinned far end under the step bound.
    Infeasible,
}

impl FitOutcome {
    pub fn cost(self) -> Option<i128> {
        match self {
            FitOutcome::Cost(cost) => Some(cost),
            FitOutcome::Infeasible => None,
        }
    }
}

/// Single-sweep solver for [`FitProblem`]s.
#[derive(Debug)]
pub struct FitEngine {
    problem: FitProblem,
    wall: i64,
    auditing: bool,
}

impl FitEngine {
    /// Engine with the default wall slope for the instance size.
    pub fn new(problem: FitProblem) -> Self {
        let wall = wall_slope(problem.num_positions());
        Self::with_wall_slope(problem, wall)
    }

    /// Engine with an explicit wall slope.
    ///
    /// # Panics
    /// Panics if `wall` is below [`wall_slope`] for the instance size
    /// (a weaker wall cannot dominate the targets' own slopes) or large
    /// enough to overflow the curve's slope totals.
    pub fn with_wall_slope(problem: FitProblem, wall: i64) -> Self {
        let floor = wall_slope(problem.num_positions());
        assert!(wall >= floor, "wall slope {wall} is below the dominance floor {floor}");
        assert!(wall <= i64::MAX / 8, "wall slope {wall} exceeds the solver's working range");
        Self {
            problem,
            wall,
            auditing: false,
        }
    }

    /// Audit the curve after every structural edit during [`run`](Self::run).
    pub fn set_audit(&mut self, on: bool) {
        self.auditing = on;
    }

    pub fn problem(&self) -> &FitProblem {
        &self.problem
    }

    /// Solve the instance.
    pub fn run(&self) -> FitOutcome {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "fit_run",
            positions = self.problem.num_positions(),
            max_step = self.problem.max_step
        );
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        if self.problem.max_step == 0 {
            return self.run_flat();
        }

        let targets = &self.problem.targets;
        let n = targets.len();
        let step = self.problem.max_step;
        let wall = self.wall;

        // worst case: one split per deviation kink and one per relaxation
        let capacity = 2 * (n - 2) + 4;
        let mut curve = CostCurve::with_capacity(wall, 2 * step, capacity);
        curve.set_audit(self.auditing);

        // window of values reachable at the position about to be processed
        let mut lo = targets[0] - step;
        let mut hi = targets[0] + step;

        {
            #[cfg(feature = "tracing")]
            let span = tracing::info_span!("recurrence_steps", count = n - 2);
            #[cfg(feature = "tracing")]
            let _enter = span.enter();

            for idx in 1..n - 1 {
                #[cfg(feature = "tracing")]
                let step_span = tracing::trace_span!("advance", position = idx + 1);
                #[cfg(feature = "tracing")]
                let _step = step_span.enter();

                let t = targets[idx];
                // fold |v - t| into the curve
                curve.lift(i128::from((t - lo).abs()));
                if t <= lo {
                    curve.tilt(1);
                } else if t >= hi {
                    curve.tilt(-1);
                } else {
                    curve.tilt(-1);
                    curve.add_slope(t - lo, 2);
                }
                // relax by the step bound and widen the window
                curve.add_width(-curve.left_slope(), 2 * step);
                lo -= step;
                hi += step;
            }
        }

        #[cfg(feature = "tracing")]
        let span = tracing::trace_span!("finalize", target = targets[n - 1]);
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        let last = targets[n - 1];
        if last < lo || last > hi {
            return FitOutcome::Infeasible;
        }
        // pin the far end with a deviation steep enough to dominate
        curve.lift(i128::from(wall) * i128::from(last - lo));
        curve.tilt(-wall);
        curve.add_slope(last - lo, 2 * wall);
        FitOutcome::Cost(curve.minimum_value())
    }

    /// Zero-step instances collapse to a single column: every position
    /// must hold the pinned value, so the cost is a plain deviation sum.
    fn run_flat(&self) -> FitOutcome {
        let targets = &self.problem.targets;
        let anchor = targets[0];
        if targets[targets.len() - 1] != anchor {
            return FitOutcome::Infeasible;
        }
        let cost = targets[1..targets.len() - 1]
            .iter()
            .map(|&t| i128::from((t - anchor).abs()))
            .sum();
        FitOutcome::Cost(cost)
    }
}
