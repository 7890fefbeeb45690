//! Per-batch metrics record consumed by dashboards and experiment exports.

use serde::{Deserialize, Serialize};

use crate::decode::Candidate;

/// Aggregated metrics from a single batch run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchMetrics {
    /// Wall-clock time spent in the solver, summed over attempts.
    pub solve_time_ms: u64,
    /// Solve attempts made (0 when the build failed).
    pub attempts: u32,
    /// Label of the backend that produced the samples.
    pub backend: Option<String>,
    pub num_requests: usize,
    pub num_vehicles: usize,
    pub num_variables: usize,
    pub num_terms: usize,
    pub best_energy: Option<f64>,
    /// Share of reads (weighted by occurrences) that decoded feasible.
    pub feasibility_rate: f64,
    /// Share of assigned requests in the best assignment that are pooled.
    pub pooling_rate: f64,
    pub assigned: usize,
    pub unassigned: usize,
    /// Requests removed before building because no vehicle could serve them.
    pub dropped: usize,
    pub penalty_ratio: Option<f64>,
    /// Planned vehicle-km of the best assignment.
    pub vehicle_km: f64,
    pub total_detour_km: f64,
}

/// Occurrence-weighted share of feasible candidates.
pub fn feasibility_rate(candidates: &[Candidate]) -> f64 {
    let total: u64 = candidates
        .iter()
        .map(|c| u64::from(c.sample.num_occurrences))
        .sum();
    if total == 0 {
        return 0.0;
    }
    let feasible: u64 = candidates
        .iter()
        .filter(|c| c.is_feasible())
        .map(|c| u64::from(c.sample.num_occurrences))
        .sum();
    feasible as f64 / total as f64
}
