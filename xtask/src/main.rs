use std::path::Path;
use std::process::{exit, Command};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ride-pooling QUBO workspace",
    long_about = "A unified CLI for running parameter sweeps, benchmarks,\n\
                  and CI checks in the ride-pooling QUBO workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep fleet sizes and QUBO weights, then export CSV/JSON results
    Sweep,
    /// Benchmark QUBO building, both solvers and decoding
    Bench,
    /// Benchmark the stashed tree as a baseline, then compare the working tree
    BenchCompare,
    /// Run CI checks for pool_core and pool_experiments
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Test pool_core with the HTTP annealing backend compiled in
    TestRemote,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Run the pooling sweep example in release mode
    Examples,
    /// Run the pool_core benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n[xtask] {label}");
}

/// Run `program` with `args`, exiting with its status code on failure.
fn run(program: &str, args: &[&str]) {
    eprintln!("+ {program} {}", args.join(" "));
    let status = match Command::new(program).args(args).status() {
        Ok(status) => status,
        Err(err) => {
            eprintln!("failed to start {program}: {err}");
            exit(1);
        }
    };
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_cargo(args: &[&str]) {
    run("cargo", args);
}

fn run_git(args: &[&str]) {
    run("git", args);
}

fn run_bench(extra: &[&str]) {
    let mut args = vec!["bench", "--package", "pool_core", "--bench", "performance"];
    if !extra.is_empty() {
        args.push("--");
        args.extend_from_slice(extra);
    }
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test pool_core");
    run_cargo(&["test", "-p", "pool_core"]);

    step("Test pool_experiments");
    run_cargo(&["test", "-p", "pool_experiments"]);
}

fn ci_examples() {
    step("Run parameter_sweep");
    run_cargo(&[
        "run",
        "-p",
        "pool_experiments",
        "--example",
        "parameter_sweep",
        "--release",
    ]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_bench(&[]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep => {
            run_cargo(&[
                "run",
                "-p",
                "pool_experiments",
                "--example",
                "parameter_sweep",
            ]);
        }
        Commands::Bench => run_bench(&[]),
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                std::fs::remove_dir_all(baseline_dir).expect("failed to remove target/criterion");
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_bench(&["--save-baseline", "main"]);

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_bench(&["--baseline", "main"]);

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::TestRemote => {
            run_cargo(&["test", "-p", "pool_core", "--features", "remote"]);
        }
    }
}
