//! Per-run experiment results and sweep-level summaries.

use pool_core::pipeline::{BatchMetrics, BatchStatus};
use serde::{Deserialize, Serialize};

use crate::baseline::BaselineResult;

/// Result of running one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub experiment_id: String,
    pub run_id: usize,
    pub status: BatchStatus,
    pub metrics: BatchMetrics,
    pub baseline: BaselineResult,
    /// `1 - pooled_km / baseline_km`; positive when pooling drove less.
    pub km_saved_ratio: f64,
}

impl ExperimentResult {
    pub fn new(
        experiment_id: String,
        run_id: usize,
        status: BatchStatus,
        metrics: BatchMetrics,
        baseline: BaselineResult,
    ) -> Self {
        let km_saved_ratio = if status.is_completed() && baseline.vehicle_km > 0.0 {
            1.0 - metrics.vehicle_km / baseline.vehicle_km
        } else {
            0.0
        };
        Self {
            experiment_id,
            run_id,
            status,
            metrics,
            baseline,
            km_saved_ratio,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.status == BatchStatus::Completed
    }
}

/// Aggregate view over a whole sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub runs: usize,
    pub completed: usize,
    pub feasible: usize,
    pub failed: usize,
    pub avg_solve_time_ms: f64,
    pub median_solve_time_ms: f64,
    pub p90_solve_time_ms: f64,
    pub mean_pooling_rate: f64,
    pub mean_km_saved_ratio: f64,
}

/// Average, median and P90 of a set of values.
fn calculate_stats(values: &[u64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
    } else {
        sorted[sorted.len() / 2] as f64
    };
    let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
    let p90 = sorted[p90_idx.min(sorted.len() - 1)] as f64;

    (avg, median, p90)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Summarise completed and failed runs. Rates are averaged over completed
/// runs only.
pub fn summarize(results: &[ExperimentResult]) -> SweepSummary {
    let completed: Vec<&ExperimentResult> =
        results.iter().filter(|r| r.status.is_completed()).collect();
    let solve_times: Vec<u64> = completed.iter().map(|r| r.metrics.solve_time_ms).collect();
    let (avg_solve_time_ms, median_solve_time_ms, p90_solve_time_ms) = calculate_stats(&solve_times);

    SweepSummary {
        runs: results.len(),
        completed: completed.len(),
        feasible: results.iter().filter(|r| r.is_feasible()).count(),
        failed: results.len() - completed.len(),
        avg_solve_time_ms,
        median_solve_time_ms,
        p90_solve_time_ms,
        mean_pooling_rate: mean(completed.iter().map(|r| r.metrics.pooling_rate)),
        mean_km_saved_ratio: mean(completed.iter().map(|r| r.km_saved_ratio)),
    }
}
