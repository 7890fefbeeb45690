//! Result export and analysis utilities.
//!
//! Exports experiment results to JSON and CSV, and picks the best run:
//! feasible runs first, then the fewest vehicle-km.

use std::path::Path;

use crate::metrics::ExperimentResult;
use crate::parameters::ParameterSet;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/ranking.rs"]
mod ranking;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// Export experiment results to a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json(
    results: &[ExperimentResult],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(results, file)
}

/// Export experiment results with their parameters to CSV, one row per run.
///
/// `results[i]` must correspond to `parameter_sets[i]`.
///
/// # Errors
///
/// Returns an error if there is nothing to export, the lengths differ, or
/// writing fails.
pub fn export_to_csv(
    results: &[ExperimentResult],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_results(results)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(results, parameter_sets, file)
}

/// Index of the best result, or `None` if there are no completed runs.
pub fn find_best_result_index(results: &[ExperimentResult]) -> Option<usize> {
    ranking::find_best_index(results)
}

/// Parameter set of the best result, or `None` if inputs are empty or
/// mismatched.
pub fn find_best_parameters<'a>(
    results: &'a [ExperimentResult],
    parameter_sets: &'a [ParameterSet],
) -> Option<&'a ParameterSet> {
    ranking::find_best_parameters_impl(results, parameter_sets)
}
