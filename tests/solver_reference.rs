use proptest::prelude::*;
use slope_fit::{FitEngine, FitProblem};

/// Full DP over the clamped value range. An optimal assignment can always
/// be clamped into the targets' hull without raising its cost, so scanning
/// `[min target, max target]` is exact.
fn reference_min_cost(max_step: i64, targets: &[i64]) -> Option<i128> {
    const BIG: i128 = i128::MAX / 4;
    let lo = *targets.iter().min().expect("targets is non-empty");
    let hi = *targets.iter().max().expect("targets is non-empty");
    let width = (hi - lo) as usize + 1;
    let step = max_step.min(width as i64) as usize;
    let n = targets.len();

    let mut dp = vec![BIG; width];
    dp[(targets[0] - lo) as usize] = 0;
    for idx in 1..n {
        let mut next = vec![BIG; width];
        for v in 0..width {
            let from = v.saturating_sub(step);
            let to = (v + step).min(width - 1);
            let mut best = BIG;
            for u in from..=to {
                best = best.min(dp[u]);
            }
            if best == BIG {
                continue;
            }
            let value = lo + v as i64;
            let deviation = if idx == n - 1 {
                0
            } else {
                (value - targets[idx]).abs()
            };
            next[v] = best + i128::from(deviation);
        }
        dp = next;
    }
    let cost = dp[(targets[n - 1] - lo) as usize];
    (cost < BIG).then_some(cost)
}

proptest! {
    #[test]
    fn engine_matches_the_value_range_dp(
        max_step in 0i64..=3,
        targets in proptest::collection::vec(-8i64..=8, 2..=7),
    ) {
        let outcome = FitEngine::new(FitProblem::new(max_step, targets.clone())).run();
        prop_assert_eq!(outcome.cost(), reference_min_cost(max_step, &targets));
    }

    #[test]
    fn engine_matches_the_dp_on_wider_instances(
        max_step in 0i64..=5,
        targets in proptest::collection::vec(-20i64..=20, 2..=10),
    ) {
        let outcome = FitEngine::new(FitProblem::new(max_step, targets.clone())).run();
        prop_assert_eq!(outcome.cost(), reference_min_cost(max_step, &targets));
    }

    #[test]
    fn auditing_does_not_change_the_outcome(
        max_step in 1i64..=4,
        targets in proptest::collection::vec(-12i64..=12, 2..=9),
    ) {
        let problem = FitProblem::new(max_step, targets);
        let plain = FitEngine::new(problem.clone()).run();
        let mut audited = FitEngine::new(problem);
        audited.set_audit(true);
        prop_assert_eq!(audited.run(), plain);
    }
}
