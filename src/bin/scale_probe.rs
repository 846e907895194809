use std::env;
use std::time::Instant;

use slope_fit::{FitEngine, FitOutcome, FitProblem};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("scale_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    // Print header explaining the test suite
    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Slope-Fit Scaling Probe: Performance and Correctness Testing");
    eprintln!("{}", "=".repeat(80));
    eprintln!();
    eprintln!("This script tests the splay-backed fitting engine across target");
    eprintln!("profiles and instance sizes to verify:");
    eprintln!("  • Correctness: Results match a full value-range DP baseline (up to size {})", options.verify_limit);
    eprintln!("  • Performance: Wall-clock time and memory usage scale appropriately");
    eprintln!("  • Scalability: Engine handles large instances (up to 65536 positions)");
    eprintln!();
    eprintln!("Metrics explained:");
    eprintln!("  • wall_s: Wall-clock time in seconds (lower is better)");
    eprintln!("  • rss_delta_kib: Memory delta in KiB (measures memory efficiency)");
    eprintln!("  • status: 'passed' = matches expectation, 'not_checked' = too large to verify");
    eprintln!();
    eprintln!("{}", "=".repeat(80));
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/5] Testing reachable ramps...");
    eprintln!("      Targets climb exactly one step per position; the optimal cost is zero.");
    measurements.extend(run_ramp(&mut sys));
    eprintln!();

    eprintln!("[2/5] Testing bounded drift walks...");
    eprintln!("      Pseudo-random targets confined to a band, solved under step bound 3.");
    measurements.extend(run_drift_walk(&options, &mut sys));
    eprintln!();

    eprintln!("[3/5] Testing spike storms...");
    eprintln!("      Mostly flat targets with tall outliers that the step bound cannot follow.");
    measurements.extend(run_spike_storm(&options, &mut sys));
    eprintln!();

    eprintln!("[4/5] Testing sawtooth profiles...");
    eprintln!("      Periodic jumps larger than the step bound force steady deviations.");
    measurements.extend(run_sawtooth(&options, &mut sys));
    eprintln!();

    eprintln!("[5/5] Testing unreachable far ends...");
    eprintln!("      The pinned last target sits beyond the total drift; every case is infeasible.");
    measurements.extend(run_out_of_reach(&mut sys));
    eprintln!();

    // Print detailed summary
    print_summary(&measurements, &options);

    // Write structured output
    if let Err(err) = options.format.write(&measurements) {
        eprintln!("scale_probe output error: {err}");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 512usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = value
                    .parse::<usize>()
                    .map_err(|_| "verify limit must be a positive integer".to_string())?;
            } else if arg == "--verify-limit" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --verify-limit".to_string())?
                    .into();
                verify_limit = value
                    .parse::<usize>()
                    .map_err(|_| "verify limit must be a positive integer".to_string())?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self {
            format,
            verify_limit,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --features probe --bin scale_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Maximum instance size to verify via the DP baseline (default: 512)
  -h, --help                    Print this help message

Examples:
  cargo run --features probe --bin scale_probe
  cargo run --features probe --bin scale_probe -- --format table --verify-limit 256
"
        );
    }
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

#[derive(Clone)]
struct Measurement {
    scenario: &'static str,
    size_desc: String,
    wall_s: f64,
    rss_delta_kib: u64,
    verification_status: VerificationStatus,
    verification_detail: Option<String>,
}

#[derive(Clone, Copy)]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }
}

const SIZES: &[usize] = &[256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536];

fn status_icon(status: VerificationStatus) -> &'static str {
    match status {
        VerificationStatus::Passed => "✓",
        VerificationStatus::Failed => "✗",
        VerificationStatus::NotChecked => "○",
    }
}

fn outcome_label(outcome: FitOutcome) -> String {
    match outcome {
        FitOutcome::Cost(cost) => cost.to_string(),
        FitOutcome::Infeasible => "impossible".to_string(),
    }
}

fn run_ramp(sys: &mut System) -> Vec<Measurement> {
    let total = SIZES.len();
    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] Testing size {}... ", idx + 1, total, len);
            let mut shown = String::new();
            let m = measure("ramp", format!("n={len}"), sys, || {
                let targets = ramp_targets(len);
                let outcome = FitEngine::new(FitProblem::new(1, targets)).run();
                shown = outcome_label(outcome);

                // a one-per-step ramp is followable exactly at any size
                if outcome == FitOutcome::Cost(0) {
                    (VerificationStatus::Passed, None)
                } else {
                    (
                        VerificationStatus::Failed,
                        Some(format!("expected 0, got {}", outcome_label(outcome))),
                    )
                }
            });
            eprintln!(
                "{} cost={}, time={:.3}s, status={}",
                status_icon(m.verification_status),
                shown,
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn run_drift_walk(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const STEP: i64 = 3;
    const BAND: i64 = 50;
    let total = SIZES.len();
    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] Testing size {}... ", idx + 1, total, len);
            let mut shown = String::new();
            let m = measure("drift_walk", format!("n={len}"), sys, || {
                let targets = walk_targets(len, 0x5eed_0001 + len as u64, BAND);
                let outcome = FitEngine::new(FitProblem::new(STEP, targets.clone())).run();
                shown = outcome_label(outcome);

                if len <= options.verify_limit {
                    let baseline = reference_min_cost(STEP, &targets);
                    if baseline == outcome.cost() {
                        (VerificationStatus::Passed, None)
                    } else {
                        (
                            VerificationStatus::Failed,
                            Some(format!("baseline={baseline:?}, got={:?}", outcome.cost())),
                        )
                    }
                } else {
                    (VerificationStatus::NotChecked, None)
                }
            });
            eprintln!(
                "{} cost={}, time={:.3}s, status={}",
                status_icon(m.verification_status),
                shown,
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn run_spike_storm(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const STEP: i64 = 2;
    let total = SIZES.len();
    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] Testing size {}... ", idx + 1, total, len);
            let mut shown = String::new();
            let m = measure("spike_storm", format!("n={len}"), sys, || {
                let targets = spike_targets(len);
                let outcome = FitEngine::new(FitProblem::new(STEP, targets.clone())).run();
                shown = outcome_label(outcome);

                if len <= options.verify_limit {
                    let baseline = reference_min_cost(STEP, &targets);
                    if baseline == outcome.cost() {
                        (VerificationStatus::Passed, None)
                    } else {
                        (
                            VerificationStatus::Failed,
                            Some(format!("baseline={baseline:?}, got={:?}", outcome.cost())),
                        )
                    }
                } else {
                    (VerificationStatus::NotChecked, None)
                }
            });
            eprintln!(
                "{} cost={}, time={:.3}s, status={}",
                status_icon(m.verification_status),
                shown,
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn run_sawtooth(options: &Options, sys: &mut System) -> Vec<Measurement> {
    const STEP: i64 = 2;
    let total = SIZES.len();
    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] Testing size {}... ", idx + 1, total, len);
            let mut shown = String::new();
            let m = measure("sawtooth", format!("n={len}"), sys, || {
                let targets = sawtooth_targets(len);
                let outcome = FitEngine::new(FitProblem::new(STEP, targets.clone())).run();
                shown = outcome_label(outcome);

                if len <= options.verify_limit {
                    let baseline = reference_min_cost(STEP, &targets);
                    if baseline == outcome.cost() {
                        (VerificationStatus::Passed, None)
                    } else {
                        (
                            VerificationStatus::Failed,
                            Some(format!("baseline={baseline:?}, got={:?}", outcome.cost())),
                        )
                    }
                } else {
                    (VerificationStatus::NotChecked, None)
                }
            });
            eprintln!(
                "{} cost={}, time={:.3}s, status={}",
                status_icon(m.verification_status),
                shown,
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn run_out_of_reach(sys: &mut System) -> Vec<Measurement> {
    let total = SIZES.len();
    SIZES
        .iter()
        .enumerate()
        .map(|(idx, &len)| {
            eprint!("      [{}/{}] Testing size {}... ", idx + 1, total, len);
            let mut shown = String::new();
            let m = measure("out_of_reach", format!("n={len}"), sys, || {
                let targets = out_of_reach_targets(len);
                let outcome = FitEngine::new(FitProblem::new(1, targets)).run();
                shown = outcome_label(outcome);

                // the far end sits past the total drift at every size
                if outcome == FitOutcome::Infeasible {
                    (VerificationStatus::Passed, None)
                } else {
                    (
                        VerificationStatus::Failed,
                        Some(format!("expected impossible, got {}", outcome_label(outcome))),
                    )
                }
            });
            eprintln!(
                "{} cost={}, time={:.3}s, status={}",
                status_icon(m.verification_status),
                shown,
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn print_summary(measurements: &[Measurement], options: &Options) {
    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Test Summary");
    eprintln!("{}", "=".repeat(80));
    eprintln!();

    // Count verification statuses
    let mut passed = 0;
    let mut failed = 0;
    let mut not_checked = 0;
    for m in measurements {
        match m.verification_status {
            VerificationStatus::Passed => passed += 1,
            VerificationStatus::Failed => failed += 1,
            VerificationStatus::NotChecked => not_checked += 1,
        }
    }

    let total = measurements.len();
    eprintln!("Verification Results:");
    eprintln!("  Total tests: {}", total);
    eprintln!("  ✓ Passed: {} ({:.1}%)", passed, 100.0 * passed as f64 / total as f64);
    eprintln!("  ✗ Failed: {} ({:.1}%)", failed, 100.0 * failed as f64 / total as f64);
    eprintln!("  ○ Not checked (size > {}): {} ({:.1}%)", options.verify_limit, not_checked, 100.0 * not_checked as f64 / total as f64);
    eprintln!();

    // Show failures if any
    if failed > 0 {
        eprintln!("Failed Tests:");
        for m in measurements {
            if matches!(m.verification_status, VerificationStatus::Failed) {
                eprintln!("  ✗ {} ({})", m.scenario, m.size_desc);
                if let Some(ref detail) = m.verification_detail {
                    eprintln!("     Error: {}", detail);
                }
            }
        }
        eprintln!();
    }

    // Performance statistics by scenario
    eprintln!("Performance Statistics by Scenario:");
    eprintln!();

    use std::collections::HashMap;
    let mut by_scenario: HashMap<&str, Vec<&Measurement>> = HashMap::new();
    for m in measurements {
        by_scenario.entry(m.scenario).or_insert_with(Vec::new).push(m);
    }

    for (scenario, ms) in by_scenario.iter() {
        let times: Vec<f64> = ms.iter().map(|m| m.wall_s).collect();
        let min_time = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_time = times.iter().copied().fold(0.0, f64::max);
        let avg_time = times.iter().sum::<f64>() / times.len() as f64;

        let mems: Vec<u64> = ms.iter().map(|m| m.rss_delta_kib).collect();
        let max_mem = mems.iter().copied().max().unwrap_or(0);
        let avg_mem = mems.iter().sum::<u64>() as f64 / mems.len() as f64;

        eprintln!("  {}:", scenario);
        eprintln!("    Tests: {}", ms.len());
        eprintln!("    Time: min={:.3}s, max={:.3}s, avg={:.3}s", min_time, max_time, avg_time);
        eprintln!("    Memory: max_delta={} KiB, avg_delta={:.1} KiB", max_mem, avg_mem);

        // Show scaling behavior
        if ms.len() >= 2 {
            let first = ms.first().unwrap();
            let last = ms.last().unwrap();
            let size_ratio = if first.wall_s > 0.0 {
                last.wall_s / first.wall_s
            } else {
                0.0
            };
            eprintln!("    Scaling: {}x slower from smallest to largest", size_ratio);
        }
        eprintln!();
    }

    // Overall assessment
    eprintln!("{}", "=".repeat(80));
    if failed == 0 {
        eprintln!("✓ All verified tests passed! The fitting engine is working correctly.");
    } else {
        eprintln!("✗ {} test(s) failed. Please review the errors above.", failed);
    }
    eprintln!();
    eprintln!("Interpretation:");
    eprintln!("  • 'passed' tests match the full value-range DP baseline or an analytic expectation");
    eprintln!("  • 'not_checked' tests are too large for baseline verification but ran successfully");
    eprintln!("  • Time scaling should be near-linearithmic in the number of positions");
    eprintln!("  • Memory usage should stay linear in the number of curve pieces");
    eprintln!("{}", "=".repeat(80));
    eprintln!();
}

fn measure<F>(
    scenario: &'static str,
    size_desc: String,
    sys: &mut System,
    compute: F,
) -> Measurement
where
    F: FnOnce() -> (VerificationStatus, Option<String>),
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (status, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        scenario,
        size_desc,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        verification_status: status,
        verification_detail: detail,
    }
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,size_desc,wall_s,rss_delta_kib,verification_status,verification_detail");
    for m in measurements {
        let detail = m
            .verification_detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let mut col1 = "scenario".len();
    let mut col2 = "size".len();
    for m in measurements {
        col1 = col1.max(m.scenario.len());
        col2 = col2.max(m.size_desc.len());
    }

    println!(
        "{:<col1$}  {:<col2$}  {:>12}  {:>14}  {:>12}  {}",
        "scenario",
        "size",
        "wall_s",
        "rss_delta_kib",
        "status",
        "detail",
        col1 = col1,
        col2 = col2
    );
    println!(
        "{:-<col1$}  {:-<col2$}  {:-<12}  {:-<14}  {:-<12}  {:-<12}",
        "",
        "",
        "",
        "",
        "",
        "",
        col1 = col1,
        col2 = col2
    );
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>12.3}  {:>14}  {:>12}  {}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            m.verification_detail
                .as_ref()
                .map(|s| s.as_str())
                .unwrap_or(""),
            col1 = col1,
            col2 = col2
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    println!("[");
    for (idx, m) in measurements.iter().enumerate() {
        let detail = m.verification_detail.as_ref().map(|s| s.replace('"', "'"));
        println!(
            "  {{\"scenario\":\"{}\",\"size\":\"{}\",\"wall_s\":{:.3},\"rss_delta_kib\":{},\"verification\":{{\"status\":\"{}\",\"detail\":{}}}}}{}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            match detail {
                Some(ref d) => format!("\"{d}\""),
                None => "null".to_string(),
            },
            if idx + 1 == measurements.len() { "" } else { "," }
        );
    }
    println!("]");
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory()
    } else {
        0
    }
}

fn ramp_targets(len: usize) -> Vec<i64> {
    (0..len).map(|i| i as i64).collect()
}

fn walk_targets(len: usize, seed: u64, band: i64) -> Vec<i64> {
    let mut state = seed | 1;
    let mut level = 0i64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let delta = (state % 5) as i64 - 2;
            level = (level + delta).clamp(-band, band);
            level
        })
        .collect()
}

fn spike_targets(len: usize) -> Vec<i64> {
    (0..len)
        .map(|i| match i % 16 {
            7 => ((i % 5) as i64 + 1) * 20,
            12 => -30,
            _ => 0,
        })
        .collect()
}

fn sawtooth_targets(len: usize) -> Vec<i64> {
    (0..len).map(|i| ((i % 9) as i64 - 4) * 8).collect()
}

fn out_of_reach_targets(len: usize) -> Vec<i64> {
    let mut targets = vec![0i64; len];
    targets[len - 1] = len as i64 + 10;
    targets
}

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
