//! Example: fitting a spiky target profile under several step bounds.
//!
//! Run with:
//! `cargo run --example fit_spike`
//!
//! The tighter the drift bound, the less of the spike the fitted sequence
//! can chase, so the cost falls as the bound grows.

use slope_fit::{FitEngine, FitOutcome, FitProblem};

fn main() {
    // Flat targets with one tall spike, ends pinned at zero.
    let targets = vec![0, 0, 0, 40, 0, 0, 0];
    println!("targets: {targets:?}");

    for step in [1i64, 5, 10, 40] {
        let problem = FitProblem::new(step, targets.clone());
        let engine = FitEngine::new(problem);
        match engine.run() {
            FitOutcome::Cost(cost) => println!("step bound {step:>2}: cost {cost}"),
            FitOutcome::Infeasible => println!("step bound {step:>2}: impossible"),
        }
    }
}
