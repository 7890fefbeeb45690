//! Parallel batch execution using rayon.
//!
//! Each parameter set generates its own synthetic batch and runs it through
//! the pooling pipeline; runs share no state.

use indicatif::{ProgressBar, ProgressStyle};
use pool_core::pipeline::run_batch;
use pool_core::scenario::generate_batch;
use rayon::prelude::*;

use crate::baseline::greedy_baseline;
use crate::metrics::ExperimentResult;
use crate::parameters::ParameterSet;

/// Run one parameter set: generate the batch, solve it and compare against
/// the greedy baseline.
pub fn run_single_experiment(param_set: &ParameterSet) -> ExperimentResult {
    let (requests, vehicles) = generate_batch(&param_set.scenario);
    let outcome = run_batch(&requests, &vehicles, &param_set.batch);
    let baseline = greedy_baseline(
        &requests,
        &vehicles,
        param_set.batch.builder.detour_model,
    );

    tracing::debug!(
        experiment = %param_set.experiment_id,
        run = param_set.run_id,
        status = outcome.status.label(),
        pooled_km = outcome.metrics.vehicle_km,
        baseline_km = baseline.vehicle_km,
        "experiment finished"
    );

    ExperimentResult::new(
        param_set.experiment_id.clone(),
        param_set.run_id,
        outcome.status,
        outcome.metrics,
        baseline,
    )
}

/// Run multiple experiments in parallel.
///
/// Results come back in the same order as `parameter_sets`. `num_threads`
/// defaults to rayon's choice.
pub fn run_parallel_experiments(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
) -> Vec<ExperimentResult> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple experiments in parallel with optional progress bar.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Vec<ExperimentResult> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Some(bar)
    } else {
        None
    };

    let run_all = || -> Vec<ExperimentResult> {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_single_experiment(param_set);
                if let Some(ref progress_bar) = pb {
                    progress_bar.inc(1);
                }
                result
            })
            .collect()
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let results = match builder.build() {
        Ok(pool) => pool.install(run_all),
        Err(err) => {
            tracing::warn!(error = %err, "failed to create thread pool, using the global pool");
            run_all()
        }
    };

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}
