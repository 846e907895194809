//! Batch solver for drift-bounded fitting cases.
//!
//! Reads `T` cases from stdin, each a line `N D` followed by `N` targets,
//! and writes one line per case: the minimum cost, or `impossible` when
//! the pinned far end is out of reach.

use std::io::{self, Read, Write};

use slope_fit::{FitEngine, FitOutcome, FitProblem};

fn main() -> io::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let mut tokens = input.split_ascii_whitespace();
    let mut next = move || -> i64 {
        tokens
            .next()
            .expect("truncated input")
            .parse()
            .expect("malformed integer")
    };

    let stdout = io::stdout();
    let mut output = io::BufWriter::new(stdout.lock());

    let cases = next();
    for _ in 0..cases {
        let n = next() as usize;
        let step = next();
        let targets: Vec<i64> = (0..n).map(|_| next()).collect();
        match FitEngine::new(FitProblem::new(step, targets)).run() {
            FitOutcome::Cost(cost) => writeln!(output, "{cost}")?,
            FitOutcome::Infeasible => writeln!(output, "impossible")?,
        }
    }
    output.flush()
}
