//! Example: pooling parameter sweep.
//!
//! Runs a grid over fleet size, pooling bonus and solver backend, compares
//! every pooled result against the greedy baseline, and exports the results.
//!
//! Set `RUST_LOG=pool_core=debug` to see per-batch build and solve logs.

use pool_core::solver::SolverBackend;
use pool_experiments::{
    export_to_csv, export_to_json, find_best_parameters, find_best_result_index,
    run_parallel_experiments, summarize, ParameterSpace,
};
use tracing_subscriber::EnvFilter;

fn enable_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    enable_tracing();
    println!("Starting pooling parameter sweep...");

    let space = ParameterSpace::grid()
        .num_requests(vec![6, 10])
        .num_vehicles(vec![2, 3, 4])
        .pooling_bonus(vec![0.5, 1.0, 2.0])
        .backend(vec![SolverBackend::SimulatedAnnealing])
        .runs(2);

    let parameter_sets = space.generate();
    println!("Generated {} parameter sets", parameter_sets.len());

    let results = run_parallel_experiments(parameter_sets.clone(), None);
    let summary = summarize(&results);
    println!(
        "Completed {}/{} runs ({} feasible), median solve {:.1} ms",
        summary.completed, summary.runs, summary.feasible, summary.median_solve_time_ms
    );
    println!(
        "Mean pooling rate {:.1}%, mean km saved vs greedy {:.1}%",
        summary.mean_pooling_rate * 100.0,
        summary.mean_km_saved_ratio * 100.0
    );

    if let Some(best_idx) = find_best_result_index(&results) {
        let best = &results[best_idx];
        println!("\n=== Best Run ===");
        println!("Experiment: {} (run {})", best.experiment_id, best.run_id);
        println!("Status: {}", best.status.label());
        println!("Vehicle km: {:.2} (greedy {:.2})", best.metrics.vehicle_km, best.baseline.vehicle_km);
        println!("Pooling rate: {:.1}%", best.metrics.pooling_rate * 100.0);
    }

    if let Some(best_params) = find_best_parameters(&results, &parameter_sets) {
        println!("\n=== Best Parameters ===");
        println!("Requests: {}", best_params.scenario.num_requests);
        println!("Vehicles: {}", best_params.scenario.num_vehicles);
        println!("Pooling bonus: {}", best_params.batch.builder.pooling_bonus);
    }

    export_to_csv(&results, &parameter_sets, "pooling_sweep_results.csv")?;
    export_to_json(&results, "pooling_sweep_results.json")?;
    println!("\nResults exported to pooling_sweep_results.csv and pooling_sweep_results.json");

    Ok(())
}
