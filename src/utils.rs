//! Assorted utilities and helpers.
//!
//! These are intentionally minimal; you can extend or replace them as needed.

/// Default wall slope for an instance with `positions` values.
///
/// This is the slope [`crate::solver::FitEngine::new`] fences the working
/// window with. Each interior target contributes at most one unit of
/// slope in either direction, so any wall strictly above `positions`
/// dominates the profile the targets can build.
#[inline]
pub fn wall_slope(positions: usize) -> i64 {
    positions as i64 + 1
}

#[cfg(test)]
mod tests {
    use super::wall_slope;

    #[test]
    fn small_instances() {
        assert_eq!(wall_slope(2), 3);
        assert_eq!(wall_slope(3), 4);
        assert_eq!(wall_slope(10), 11);
    }

    #[test]
    fn dominates_the_interior_slope_budget() {
        // an instance with n positions has n - 2 interior targets
        for n in 2..500usize {
            assert!(wall_slope(n) > n as i64 - 2, "wall too weak at n={n}");
        }
    }

    #[test]
    fn monotonic_non_decreasing() {
        let mut prev = 0;
        for n in 0..500 {
            let w = wall_slope(n);
            assert!(w >= prev, "wall slope decreased at n={n}: {w} < {prev}");
            prev = w;
        }
    }
}
