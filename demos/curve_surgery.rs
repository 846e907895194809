//! Example: hand-driving the convex cost curve.
//!
//! Run with:
//! `cargo run --example curve_surgery`
//!
//! Applies the edits the solver performs internally and prints the piece
//! profile after each one.

use slope_fit::CostCurve;

fn main() {
    let mut curve = CostCurve::open(10, 8);
    report("fresh", &curve);

    // fold in |x - 3|: lift to the window-start value, tilt down, kink up
    curve.lift(3);
    curve.tilt(-1);
    curve.add_slope(3, 2);
    report("deviation", &curve);

    // box relaxation: widen the flat minimum region at the zero crossing
    curve.add_width(-curve.left_slope(), 4);
    report("relaxed", &curve);
}

fn report(label: &str, curve: &CostCurve) {
    println!(
        "{label:>9}: pieces {:?}, minimum {}",
        curve.segments(),
        curve.minimum_value()
    );
}
