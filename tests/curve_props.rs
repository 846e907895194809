use proptest::prelude::*;
use slope_fit::CostCurve;

const WALL: i64 = 1_000;
const WIDTH: i64 = 8;

/// Replay one generated edit, folding the free-form key into the valid
/// range for its axis.
fn apply(curve: &mut CostCurve, kind: u8, seed: u64, amount: i64) {
    match kind {
        0 => curve.tilt((seed % 7) as i64 - 3),
        1 => {
            let key = (seed % curve.total_width() as u64) as i64;
            curve.add_slope(key, amount);
        }
        _ => {
            let key = 1 + (seed % curve.total_slope() as u64) as i64;
            curve.add_width(key, amount);
        }
    }
}

/// Evaluate the curve at every breakpoint and take the smallest value.
/// The profile is convex, so its minimum always sits on a breakpoint.
fn scan_minimum(curve: &CostCurve) -> i128 {
    let mut slope = curve.left_slope();
    let mut value = curve.base();
    let mut best = value;
    for (delta_slope, delta_width) in curve.segments() {
        slope += delta_slope;
        value += i128::from(delta_width) * i128::from(slope);
        best = best.min(value);
    }
    best
}

proptest! {
    #[test]
    fn minimum_matches_a_full_breakpoint_scan(
        ops in proptest::collection::vec((0u8..3, any::<u64>(), 1i64..=9), 0..40),
        lift in 0i128..1_000,
    ) {
        let mut curve = CostCurve::open(WALL, WIDTH);
        curve.lift(lift);
        for &(kind, seed, amount) in &ops {
            apply(&mut curve, kind, seed, amount);
        }
        curve.audit();
        prop_assert_eq!(curve.minimum_value(), scan_minimum(&curve));
    }

    #[test]
    fn audited_replay_matches_the_plain_curve(
        ops in proptest::collection::vec((0u8..3, any::<u64>(), 1i64..=9), 0..40),
    ) {
        let mut plain = CostCurve::open(WALL, WIDTH);
        let mut audited = CostCurve::open(WALL, WIDTH);
        audited.set_audit(true);
        for &(kind, seed, amount) in &ops {
            apply(&mut plain, kind, seed, amount);
            apply(&mut audited, kind, seed, amount);
        }
        prop_assert_eq!(plain.segments(), audited.segments());
        prop_assert_eq!(plain.minimum_value(), audited.minimum_value());
        prop_assert_eq!(plain.left_slope(), audited.left_slope());
    }

    #[test]
    fn segments_stay_positive_and_sum_to_the_totals(
        ops in proptest::collection::vec((0u8..3, any::<u64>(), 1i64..=9), 0..60),
    ) {
        let mut curve = CostCurve::open(WALL, WIDTH);
        for &(kind, seed, amount) in &ops {
            apply(&mut curve, kind, seed, amount);
        }
        let segments = curve.segments();
        prop_assert!(segments.iter().all(|&(ds, dx)| ds > 0 && dx > 0));
        let slope_sum: i64 = segments.iter().map(|&(ds, _)| ds).sum();
        let width_sum: i64 = segments.iter().map(|&(_, dx)| dx).sum();
        prop_assert_eq!(slope_sum, curve.total_slope());
        prop_assert_eq!(width_sum, curve.total_width());
    }
}
