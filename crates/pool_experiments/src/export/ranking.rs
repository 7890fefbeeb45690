use std::cmp::Ordering;

use crate::metrics::ExperimentResult;
use crate::parameters::ParameterSet;

/// Feasible before infeasible, then fewer vehicle-km, then lower energy.
fn compare(a: &ExperimentResult, b: &ExperimentResult) -> Ordering {
    b.is_feasible()
        .cmp(&a.is_feasible())
        .then_with(|| a.metrics.vehicle_km.total_cmp(&b.metrics.vehicle_km))
        .then_with(|| {
            let ea = a.metrics.best_energy.unwrap_or(f64::INFINITY);
            let eb = b.metrics.best_energy.unwrap_or(f64::INFINITY);
            ea.total_cmp(&eb)
        })
}

pub(crate) fn find_best_index(results: &[ExperimentResult]) -> Option<usize> {
    results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.status.is_completed())
        .min_by(|(_, a), (_, b)| compare(a, b))
        .map(|(idx, _)| idx)
}

pub(crate) fn find_best_parameters_impl<'a>(
    results: &'a [ExperimentResult],
    parameter_sets: &'a [ParameterSet],
) -> Option<&'a ParameterSet> {
    if results.is_empty() || results.len() != parameter_sets.len() {
        return None;
    }

    let best_idx = find_best_index(results)?;
    parameter_sets.get(best_idx)
}
